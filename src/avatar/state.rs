//! Per-frame avatar snapshot published to renderers

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transform of one bone as the renderer should draw it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoneFrame {
    /// Local rotation as [x, y, z, w]
    pub quaternion: [f32; 4],
    /// The same rotation as XYZ Euler angles in degrees
    pub degrees: [f32; 3],
    /// Translation offset from clip tracks
    #[serde(default)]
    pub translation: [f32; 3],
}

impl BoneFrame {
    pub fn new(rotation: Quat, translation: Vec3) -> Self {
        let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
        Self {
            quaternion: rotation.to_array(),
            degrees: [x.to_degrees(), y.to_degrees(), z.to_degrees()],
            translation: translation.to_array(),
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_array(self.quaternion)
    }
}

/// Full avatar snapshot at one controller tick
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AvatarFrame {
    /// Controller clock (ms)
    pub time_ms: f64,
    pub model_ready: bool,
    pub clips_ready: bool,
    /// Facial control values in [0, 1]
    pub controls: BTreeMap<String, f32>,
    /// Controllable bones after clip blending
    pub bones: BTreeMap<String, BoneFrame>,
    /// Other skeleton bones driven by the current clips
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub animated_bones: BTreeMap<String, BoneFrame>,
    pub current_clip: Option<String>,
    pub blinking: bool,
    /// Last expression preset applied
    pub expression: Option<String>,
    /// Last body pose preset applied
    pub pose: Option<String>,
}

impl AvatarFrame {
    pub fn control(&self, name: &str) -> Option<f32> {
        self.controls.get(name).copied()
    }

    pub fn bone(&self, name: &str) -> Option<&BoneFrame> {
        self.bones.get(name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
