//! Avatar rig module
//!
//! Facial controls, blinking, bone poses and clip playback, tied together by
//! [`AvatarController`].

pub mod assets;
pub mod blender;
pub mod blink;
pub mod clip;
pub mod controller;
pub mod expression;
pub mod mixer;
pub mod pose;
pub mod skeleton;
pub mod state;

pub use assets::{AssetManager, ModelManifest};
pub use clip::AnimationClip;
pub use controller::{AvatarCommand, AvatarController, CommandOutcome};
pub use expression::{ExpressionLibrary, ExpressionPreset};
pub use pose::{BodyPosePreset, PoseLibrary};
pub use state::{AvatarFrame, BoneFrame};
