//! Avatar controller.
//!
//! Owns everything that changes while the avatar is live: facial control
//! values, the blink driver, controllable bones and clip playback. Commands
//! mutate it through `&mut self`; one `advance` call per frame moves it forward.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::assets::ModelManifest;
use super::blender::ExpressionBlender;
use super::blink::BlinkDriver;
use super::clip::AnimationClip;
use super::expression::ExpressionLibrary;
use super::mixer::{BoneSample, ClipMixer, LoopMode};
use super::pose::PoseLibrary;
use super::skeleton::BoneTable;
use super::state::{AvatarFrame, BoneFrame};
use crate::config::AvatarConfig;
use crate::error::AvatarError;

/// A request issued by a UI surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AvatarCommand {
    SetControl { name: String, value: f32 },
    ApplyExpression { preset: String },
    SetBoneRotation { bone: String, degrees: [f32; 3] },
    ApplyBodyPose { preset: String },
    PlayAnimation { clip: String },
}

impl std::fmt::Display for AvatarCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AvatarCommand::SetControl { name, value } => write!(f, "set_control({name}, {value})"),
            AvatarCommand::ApplyExpression { preset } => write!(f, "apply_expression({preset})"),
            AvatarCommand::SetBoneRotation { bone, degrees } => {
                write!(f, "set_bone_rotation({bone}, {degrees:?})")
            }
            AvatarCommand::ApplyBodyPose { preset } => write!(f, "apply_body_pose({preset})"),
            AvatarCommand::PlayAnimation { clip } => write!(f, "play_animation({clip})"),
        }
    }
}

/// Result of executing a command. Failures are reported, never raised.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Applied,
    Ignored(AvatarError),
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }
}

#[derive(Debug, Clone)]
pub struct AvatarController {
    config: AvatarConfig,
    expressions: ExpressionLibrary,
    poses: PoseLibrary,

    clock_ms: f64,
    model_ready: bool,

    blender: ExpressionBlender,
    blink: BlinkDriver,
    bones: BoneTable,
    /// Every bone the model reported, controllable or not
    skeleton: BTreeSet<String>,
    /// Non-controllable skeleton bones written by clips this frame
    animated: BTreeMap<String, (Quat, Vec3)>,

    mixer: ClipMixer,
    clips: BTreeMap<String, Arc<AnimationClip>>,
    expected_clips: BTreeSet<String>,
    reported_clips: BTreeSet<String>,

    last_expression: Option<String>,
    last_pose: Option<String>,
}

impl AvatarController {
    /// Create an unloaded controller. Every clip named in the config is
    /// expected to report through [`Self::on_clip_loaded`].
    pub fn new(config: &AvatarConfig) -> Self {
        Self {
            config: config.clone(),
            expressions: ExpressionLibrary::with_overrides(&config.expressions),
            poses: PoseLibrary::with_overrides(&config.poses),
            clock_ms: 0.0,
            model_ready: false,
            blender: ExpressionBlender::default(),
            blink: BlinkDriver::inert(&config.blink),
            bones: BoneTable::default(),
            skeleton: BTreeSet::new(),
            animated: BTreeMap::new(),
            mixer: ClipMixer::new(config.transitions.clip_fade_secs),
            clips: BTreeMap::new(),
            expected_clips: config.clips.keys().cloned().collect(),
            reported_clips: BTreeSet::new(),
            last_expression: None,
            last_pose: None,
        }
    }

    /// Register the model's controls and bones
    pub fn on_model_loaded(&mut self, manifest: &ModelManifest) {
        self.blender = ExpressionBlender::new(manifest.morph_targets.iter().cloned());
        self.bones = BoneTable::from_discovered(
            manifest.bones.iter().map(String::as_str),
            &self.config.controllable_bones,
        );
        self.skeleton = manifest.bones.iter().cloned().collect();
        self.animated.clear();

        let blink = &self.config.blink;
        let left = self.blender.index_of(&blink.left_control);
        let right = self.blender.index_of(&blink.right_control);
        self.blink = BlinkDriver::new(left, right, blink);
        if !self.blink.is_active() {
            tracing::warn!(
                "Blink controls {} / {} not found, blinking disabled",
                blink.left_control,
                blink.right_control
            );
        }

        self.model_ready = true;
        tracing::info!(
            "Model loaded: {} controls, {} controllable bones ({} total)",
            self.blender.len(),
            self.bones.len(),
            self.skeleton.len()
        );

        self.maybe_start_idle();
    }

    /// Record one clip load completion, successful or not
    pub fn on_clip_loaded(&mut self, name: &str, result: Result<AnimationClip, AvatarError>) {
        if !self.expected_clips.contains(name) {
            tracing::warn!("Ignoring unexpected clip report: {}", name);
            return;
        }
        if !self.reported_clips.insert(name.to_string()) {
            tracing::warn!("Ignoring duplicate clip report: {}", name);
            return;
        }

        match result {
            Ok(mut clip) => {
                clip.name = name.to_string();
                tracing::debug!(
                    "Clip loaded: {} ({:.2}s, {} tracks)",
                    name,
                    clip.duration,
                    clip.tracks.len()
                );
                self.clips.insert(name.to_string(), Arc::new(clip));
            }
            Err(e) => tracing::warn!("Clip {} failed to load: {}", name, e),
        }

        if self.clips_ready() {
            tracing::info!(
                "Clips ready: {} of {} loaded",
                self.clips.len(),
                self.expected_clips.len()
            );
        }

        self.maybe_start_idle();
    }

    pub fn model_ready(&self) -> bool {
        self.model_ready
    }

    /// True once every expected clip has reported
    pub fn clips_ready(&self) -> bool {
        self.reported_clips.len() == self.expected_clips.len()
    }

    fn maybe_start_idle(&mut self) {
        if !self.config.auto_play_idle || !self.model_ready || self.mixer.current().is_some() {
            return;
        }
        if let Some(idle) = self.clips.get(&self.config.idle_clip) {
            tracing::info!("Starting idle clip: {}", idle.name);
            let mode = self.loop_mode(&idle.name);
            self.mixer.play(Arc::clone(idle), mode);
        }
    }

    fn loop_mode(&self, clip: &str) -> LoopMode {
        if self.config.looping_clips.iter().any(|c| c == clip) {
            LoopMode::Repeat
        } else {
            LoopMode::Once
        }
    }

    fn require_model(&self) -> Result<(), AvatarError> {
        if self.model_ready {
            Ok(())
        } else {
            Err(AvatarError::NotReady("model"))
        }
    }

    /// Ease one control toward `value` over the control transition time
    pub fn set_control(&mut self, name: &str, value: f32) -> Result<(), AvatarError> {
        self.require_model()?;
        let duration = self.config.transitions.control_ms;
        self.blender.set_control(name, value, self.clock_ms, duration)
    }

    /// Ease every control toward the named preset. Returns the number of
    /// controls scheduled.
    pub fn apply_preset(&mut self, name: &str) -> Result<usize, AvatarError> {
        self.require_model()?;
        let preset = self
            .expressions
            .get(name)
            .ok_or_else(|| AvatarError::UnknownPreset(name.to_string()))?;
        let scheduled =
            self.blender
                .apply_preset(preset, self.clock_ms, self.config.transitions.preset_ms);
        self.last_expression = Some(name.to_string());
        Ok(scheduled)
    }

    /// Set a bone's rotation in degrees, immediately
    pub fn set_bone_rotation(&mut self, bone: &str, degrees: [f32; 3]) -> Result<Quat, AvatarError> {
        self.require_model()?;
        self.bones.set_rotation(bone, degrees)
    }

    /// Apply a body pose preset. Bones the preset does not name, or the model
    /// does not have, keep their rotation. Returns the number of bones set.
    pub fn apply_body_pose(&mut self, name: &str) -> Result<usize, AvatarError> {
        self.require_model()?;
        let preset = self
            .poses
            .get(name)
            .ok_or_else(|| AvatarError::UnknownPose(name.to_string()))?;

        let mut applied = 0;
        for (bone, degrees) in &preset.rotations {
            match self.bones.set_rotation(bone, *degrees) {
                Ok(_) => applied += 1,
                Err(e) => tracing::debug!("Pose '{}': {}", name, e),
            }
        }
        self.last_pose = Some(name.to_string());
        Ok(applied)
    }

    /// Cross-fade to the named clip
    pub fn play_animation(&mut self, name: &str) -> Result<(), AvatarError> {
        self.require_model()?;
        if !self.clips_ready() {
            return Err(AvatarError::NotReady("clips"));
        }
        let clip = self
            .clips
            .get(name)
            .ok_or_else(|| AvatarError::UnknownClip(name.to_string()))?;

        let mode = self.loop_mode(name);
        self.mixer.play(Arc::clone(clip), mode);
        tracing::debug!("Playing clip {} ({:?})", name, mode);
        Ok(())
    }

    /// Execute a command, logging and reporting it if it was ignored
    pub fn execute(&mut self, command: &AvatarCommand) -> CommandOutcome {
        let result = match command {
            AvatarCommand::SetControl { name, value } => self.set_control(name, *value),
            AvatarCommand::ApplyExpression { preset } => self.apply_preset(preset).map(|_| ()),
            AvatarCommand::SetBoneRotation { bone, degrees } => {
                self.set_bone_rotation(bone, *degrees).map(|_| ())
            }
            AvatarCommand::ApplyBodyPose { preset } => self.apply_body_pose(preset).map(|_| ()),
            AvatarCommand::PlayAnimation { clip } => self.play_animation(clip),
        };

        match result {
            Ok(()) => CommandOutcome::Applied,
            Err(e) => {
                tracing::warn!("Ignored {}: {}", command, e);
                CommandOutcome::Ignored(e)
            }
        }
    }

    /// Move the avatar forward by `dt_secs`.
    ///
    /// Order matters: the blender writes control values, the mixer poses the
    /// bones, and the blink driver runs last so it owns the blink controls.
    pub fn advance(&mut self, dt_secs: f32) {
        let dt = if dt_secs.is_finite() { dt_secs.max(0.0) } else { 0.0 };

        self.clock_ms += f64::from(dt) * 1000.0;
        self.blender.advance(self.clock_ms);
        self.mixer.update(dt);
        self.apply_clips();
        self.blink.advance(self.clock_ms, self.blender.values_mut());
    }

    fn apply_clips(&mut self) {
        let mut samples = self.mixer.sample();

        for (name, bone) in self.bones.iter_mut() {
            let sample = samples.remove(name).unwrap_or_default();
            bone.rotation = match sample.rotation {
                Some((clip, weight)) if weight >= 1.0 => clip,
                Some((clip, weight)) => bone.pose_rotation.slerp(clip, weight),
                None => bone.pose_rotation,
            };
            bone.translation = blend_translation(&sample);
        }

        self.animated.clear();
        for (name, sample) in samples {
            if !self.skeleton.contains(&name) {
                continue;
            }
            let rotation = match sample.rotation {
                Some((clip, weight)) => Quat::IDENTITY.slerp(clip, weight.min(1.0)),
                None => Quat::IDENTITY,
            };
            self.animated.insert(name, (rotation, blend_translation(&sample)));
        }
    }

    /// Drop the model and every loaded clip, as on unload
    pub fn unload(&mut self) {
        tracing::info!("Unloading avatar");
        *self = Self::new(&self.config);
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn control_value(&self, name: &str) -> Option<f32> {
        self.blender.value(name)
    }

    pub fn control_values(&self) -> BTreeMap<String, f32> {
        self.blender
            .names()
            .iter()
            .cloned()
            .zip(self.blender.values().iter().copied())
            .collect()
    }

    pub fn bone_rotation(&self, name: &str) -> Option<Quat> {
        self.bones.get(name).map(|b| b.rotation)
    }

    pub fn bone_rotations(&self) -> BTreeMap<String, Quat> {
        self.bones
            .iter()
            .map(|(name, bone)| (name.to_string(), bone.rotation))
            .collect()
    }

    pub fn current_clip(&self) -> Option<&str> {
        self.mixer.current()
    }

    pub fn mixer(&self) -> &ClipMixer {
        &self.mixer
    }

    pub fn blink(&self) -> &BlinkDriver {
        &self.blink
    }

    pub fn expression_names(&self) -> Vec<String> {
        self.expressions.names().map(str::to_string).collect()
    }

    pub fn pose_names(&self) -> Vec<String> {
        self.poses.names().map(str::to_string).collect()
    }

    pub fn control_names(&self) -> Vec<String> {
        self.blender.names().to_vec()
    }

    pub fn bone_names(&self) -> Vec<String> {
        self.bones.names().map(str::to_string).collect()
    }

    /// Names of clips that loaded successfully
    pub fn clip_names(&self) -> Vec<String> {
        self.clips.keys().cloned().collect()
    }

    pub fn frame(&self) -> AvatarFrame {
        AvatarFrame {
            time_ms: self.clock_ms,
            model_ready: self.model_ready,
            clips_ready: self.clips_ready(),
            controls: self.control_values(),
            bones: self
                .bones
                .iter()
                .map(|(name, bone)| (name.to_string(), BoneFrame::new(bone.rotation, bone.translation)))
                .collect(),
            animated_bones: self
                .animated
                .iter()
                .map(|(name, (rotation, translation))| {
                    (name.clone(), BoneFrame::new(*rotation, *translation))
                })
                .collect(),
            current_clip: self.mixer.current().map(str::to_string),
            blinking: self.blink.is_blinking(),
            expression: self.last_expression.clone(),
            pose: self.last_pose.clone(),
        }
    }
}

fn blend_translation(sample: &BoneSample) -> Vec3 {
    match sample.translation {
        Some((clip, weight)) => Vec3::ZERO.lerp(clip, weight.min(1.0)),
        None => Vec3::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avatar::clip::{Interpolation, KeyframeTrack, Track, TrackData};
    use crate::avatar::skeleton::euler_degrees_to_quat;
    use crate::config::BlinkConfig;

    const DT: f32 = 1.0 / 60.0;

    fn config() -> AvatarConfig {
        AvatarConfig {
            blink: BlinkConfig {
                seed: Some(7),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn manifest() -> ModelManifest {
        ModelManifest {
            morph_targets: ["Eye_Blink_L", "Eye_Blink_R", "Mouth_Open", "Mouth_Smile", "Cheek_L"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            bones: [
                "CC_Base_Head",
                "CC_Base_L_Upperarm",
                "CC_Base_R_Upperarm",
                "CC_Base_Spine02",
                "CC_Base_L_Thigh",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }

    fn clip(name: &str, bone: &str, degrees: [f32; 3]) -> AnimationClip {
        let track = Track {
            bone: bone.to_string(),
            data: TrackData::Rotation(
                KeyframeTrack::new(
                    vec![0.0, 1.0],
                    vec![euler_degrees_to_quat(degrees); 2],
                    Interpolation::Linear,
                )
                .unwrap(),
            ),
        };
        AnimationClip::new(name, vec![track])
    }

    fn loaded() -> AvatarController {
        let mut c = AvatarController::new(&config());
        c.on_model_loaded(&manifest());
        c
    }

    fn loaded_with_clips() -> AvatarController {
        let mut c = loaded();
        c.on_clip_loaded("idle", Ok(clip("idle", "CC_Base_Spine02", [0.0, 10.0, 0.0])));
        c.on_clip_loaded("talk", Ok(clip("talk", "CC_Base_L_Thigh", [20.0, 0.0, 0.0])));
        c
    }

    fn run(c: &mut AvatarController, secs: f32) {
        let frames = (secs / DT).ceil() as usize;
        for _ in 0..frames {
            c.advance(DT);
        }
    }

    #[test]
    fn test_commands_before_load_are_ignored() {
        let mut c = AvatarController::new(&config());
        let outcome = c.execute(&AvatarCommand::SetControl {
            name: "Mouth_Open".to_string(),
            value: 1.0,
        });
        assert_eq!(outcome, CommandOutcome::Ignored(AvatarError::NotReady("model")));
        c.advance(DT);
        assert!(c.control_values().is_empty());
    }

    #[test]
    fn test_set_control_converges() {
        let mut c = loaded();
        assert!(c
            .execute(&AvatarCommand::SetControl {
                name: "Mouth_Open".to_string(),
                value: 0.6,
            })
            .is_applied());

        let mut prev = 0.0;
        for _ in 0..15 {
            c.advance(DT);
            let v = c.control_value("Mouth_Open").unwrap();
            assert!(v >= prev && v <= 0.6);
            prev = v;
        }
        assert_eq!(c.control_value("Mouth_Open"), Some(0.6));
    }

    #[test]
    fn test_unknown_lookups_are_ignored() {
        let mut c = loaded();
        let before = c.frame();

        let commands = [
            AvatarCommand::SetControl { name: "Tail".to_string(), value: 1.0 },
            AvatarCommand::ApplyExpression { preset: "Smug".to_string() },
            AvatarCommand::SetBoneRotation { bone: "CC_Base_Tail".to_string(), degrees: [1.0, 0.0, 0.0] },
            AvatarCommand::ApplyBodyPose { preset: "Dab".to_string() },
        ];
        for command in &commands {
            assert!(matches!(c.execute(command), CommandOutcome::Ignored(_)));
        }
        assert_eq!(c.frame(), before);
    }

    #[test]
    fn test_preset_resets_other_controls() {
        let mut c = loaded();
        c.set_control("Cheek_L", 0.9).unwrap();
        run(&mut c, 0.3);

        c.apply_preset("Talk").unwrap();
        run(&mut c, 0.6);

        assert_eq!(c.control_value("Cheek_L"), Some(0.0));
        assert!(c.control_value("Mouth_Open").unwrap() > 0.0);
        assert_eq!(c.frame().expression.as_deref(), Some("Talk"));
    }

    #[test]
    fn test_blink_is_last_writer() {
        let mut c = loaded();
        c.set_control("Eye_Blink_L", 0.0).unwrap();

        // The first blink starts on the first frame and is fully closed at 75ms
        let mut peak: f32 = 0.0;
        for _ in 0..6 {
            c.advance(DT);
            peak = peak.max(c.control_value("Eye_Blink_L").unwrap());
        }
        assert!(peak > 0.9);
        assert_eq!(c.control_value("Eye_Blink_L"), c.control_value("Eye_Blink_R"));
    }

    #[test]
    fn test_bone_rotation_and_pose() {
        let mut config = config();
        let mut nod = BTreeMap::new();
        nod.insert("CC_Base_Head".to_string(), [15.0, 0.0, 0.0]);
        nod.insert("CC_Base_Tail".to_string(), [15.0, 0.0, 0.0]);
        config.poses.insert("Nod".to_string(), nod);

        let mut c = AvatarController::new(&config);
        c.on_model_loaded(&manifest());

        let q = c.set_bone_rotation("CC_Base_Head", [10.0, 20.0, 30.0]).unwrap();
        assert!(q.angle_between(euler_degrees_to_quat([10.0, 20.0, 30.0])) < 1e-5);

        c.set_bone_rotation("CC_Base_Spine02", [5.0, 0.0, 0.0]).unwrap();
        assert_eq!(c.apply_body_pose("Nod").unwrap(), 1);

        c.advance(DT);
        let head = c.bone_rotation("CC_Base_Head").unwrap();
        assert!(head.angle_between(euler_degrees_to_quat([15.0, 0.0, 0.0])) < 1e-5);
        // Nod does not name the spine
        let spine = c.bone_rotation("CC_Base_Spine02").unwrap();
        assert!(spine.angle_between(euler_degrees_to_quat([5.0, 0.0, 0.0])) < 1e-5);
        assert_eq!(c.frame().pose.as_deref(), Some("Nod"));
    }

    #[test]
    fn test_unregistered_bone_is_noop() {
        let mut c = loaded();
        assert!(c.set_bone_rotation("CC_Base_L_Thigh", [0.0, 45.0, 0.0]).is_err());
        assert!(c.bone_rotation("CC_Base_L_Thigh").is_none());
    }

    #[test]
    fn test_clip_readiness_counts_each_clip_once() {
        let mut c = loaded();
        assert!(!c.clips_ready());
        assert_eq!(
            c.play_animation("idle").unwrap_err(),
            AvatarError::NotReady("clips")
        );

        c.on_clip_loaded("idle", Ok(clip("idle", "CC_Base_Spine02", [0.0, 10.0, 0.0])));
        c.on_clip_loaded("idle", Ok(clip("idle", "CC_Base_Spine02", [0.0, 10.0, 0.0])));
        c.on_clip_loaded("dance", Ok(clip("dance", "CC_Base_Head", [0.0, 10.0, 0.0])));
        assert!(!c.clips_ready());

        c.on_clip_loaded(
            "talk",
            Err(AvatarError::AssetNotFound("animations/talk.json".to_string())),
        );
        assert!(c.clips_ready());
        assert_eq!(c.clip_names(), vec!["idle".to_string()]);
        assert_eq!(
            c.play_animation("talk").unwrap_err(),
            AvatarError::UnknownClip("talk".to_string())
        );
    }

    #[test]
    fn test_idle_starts_automatically() {
        let mut c = loaded_with_clips();
        assert_eq!(c.current_clip(), Some("idle"));
        run(&mut c, 0.5);

        let spine = c.bone_rotation("CC_Base_Spine02").unwrap();
        assert!(spine.angle_between(euler_degrees_to_quat([0.0, 10.0, 0.0])) < 1e-4);
    }

    #[test]
    fn test_clip_before_model_waits_for_model() {
        let mut c = AvatarController::new(&config());
        c.on_clip_loaded("idle", Ok(clip("idle", "CC_Base_Spine02", [0.0, 10.0, 0.0])));
        assert_eq!(c.current_clip(), None);
        c.on_model_loaded(&manifest());
        assert_eq!(c.current_clip(), Some("idle"));
    }

    #[test]
    fn test_replaying_idle_keeps_one_action() {
        let mut c = loaded_with_clips();
        run(&mut c, 0.5);
        c.play_animation("idle").unwrap();
        c.play_animation("idle").unwrap();
        assert_eq!(c.mixer().action_count(), 1);
        assert_eq!(c.current_clip(), Some("idle"));
    }

    #[test]
    fn test_talk_cross_fades_and_animates_other_bones() {
        let mut c = loaded_with_clips();
        run(&mut c, 0.5);
        c.play_animation("talk").unwrap();
        run(&mut c, 0.5);

        assert_eq!(c.current_clip(), Some("talk"));
        assert!(!c.mixer().action("idle").unwrap().enabled);

        let frame = c.frame();
        let thigh = frame.animated_bones["CC_Base_L_Thigh"].rotation();
        assert!(thigh.angle_between(euler_degrees_to_quat([20.0, 0.0, 0.0])) < 1e-4);

        // Idle faded out, so the spine is back on its manual pose
        let spine = c.bone_rotation("CC_Base_Spine02").unwrap();
        assert!(spine.angle_between(Quat::IDENTITY) < 1e-4);
    }

    #[test]
    fn test_partial_clip_weight_mixes_with_manual_pose() {
        let mut c = loaded();
        c.set_bone_rotation("CC_Base_Spine02", [0.0, 0.0, 0.0]).unwrap();
        c.on_clip_loaded("idle", Ok(clip("idle", "CC_Base_Spine02", [0.0, 20.0, 0.0])));
        c.on_clip_loaded("talk", Err(AvatarError::AssetNotFound("talk".to_string())));

        // Half way through the 0.3s fade in
        c.advance(0.15);
        let spine = c.bone_rotation("CC_Base_Spine02").unwrap();
        assert!(spine.angle_between(euler_degrees_to_quat([0.0, 10.0, 0.0])) < 1e-3);
    }

    #[test]
    fn test_unload_drops_everything() {
        let mut c = loaded_with_clips();
        c.unload();
        assert!(!c.model_ready());
        assert!(!c.clips_ready());
        assert_eq!(c.current_clip(), None);
        assert!(c.control_values().is_empty());
    }

    #[test]
    fn test_command_deserializes() {
        let command: AvatarCommand =
            serde_json::from_str(r#"{"command":"play_animation","clip":"idle"}"#).unwrap();
        assert_eq!(command, AvatarCommand::PlayAnimation { clip: "idle".to_string() });
    }
}
