//! Body pose presets

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named mapping from bone names to Euler rotations in degrees.
///
/// Applying a pose only touches the bones it names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyPosePreset {
    pub name: String,
    pub rotations: BTreeMap<String, [f32; 3]>,
}

impl BodyPosePreset {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rotations: BTreeMap::new(),
        }
    }

    pub fn with(mut self, bone: &str, degrees: [f32; 3]) -> Self {
        self.rotations.insert(bone.to_string(), degrees);
        self
    }
}

/// Read-only collection of body pose presets
#[derive(Debug, Clone, Default)]
pub struct PoseLibrary {
    presets: BTreeMap<String, BodyPosePreset>,
}

impl PoseLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library with the built-in poses plus configured overrides
    pub fn with_overrides(overrides: &BTreeMap<String, BTreeMap<String, [f32; 3]>>) -> Self {
        let mut library = Self::builtin();
        for (name, rotations) in overrides {
            library.add(BodyPosePreset {
                name: name.clone(),
                rotations: rotations.clone(),
            });
        }
        library
    }

    pub fn builtin() -> Self {
        let mut library = Self::new();

        library.add(
            BodyPosePreset::new("Reset")
                .with("CC_Base_Head", [0.0, 0.0, 0.0])
                .with("CC_Base_L_Upperarm", [0.0, 0.0, 0.0])
                .with("CC_Base_R_Upperarm", [0.0, 0.0, 0.0])
                .with("CC_Base_Spine02", [0.0, 0.0, 0.0]),
        );
        // Slight head tilt, arms relaxed down and back, slight lean
        library.add(
            BodyPosePreset::new("Idle")
                .with("CC_Base_Head", [0.0, -3.0, -2.0])
                .with("CC_Base_L_Upperarm", [-5.0, 0.0, -10.0])
                .with("CC_Base_R_Upperarm", [-5.0, 0.0, -10.0])
                .with("CC_Base_Spine02", [0.0, 0.0, -1.0]),
        );
        library.add(
            BodyPosePreset::new("Talking")
                .with("CC_Base_Head", [0.0, 5.0, 0.0])
                .with("CC_Base_L_Upperarm", [0.0, 0.0, 0.0])
                .with("CC_Base_R_Upperarm", [0.0, 0.0, 0.0])
                .with("CC_Base_Spine02", [0.0, 3.0, 0.0]),
        );

        library
    }

    pub fn add(&mut self, preset: BodyPosePreset) {
        self.presets.insert(preset.name.clone(), preset);
    }

    pub fn get(&self, name: &str) -> Option<&BodyPosePreset> {
        self.presets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(|s| s.as_str())
    }
}
