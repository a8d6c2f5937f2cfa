//! Expression presets

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named mapping from facial control names to target influences.
///
/// Controls not named in the preset are targeted to 0 when it is applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpressionPreset {
    /// Unique name for this preset
    pub name: String,
    /// Control name to target value (0.0 - 1.0)
    pub targets: BTreeMap<String, f32>,
}

impl ExpressionPreset {
    /// Create an empty preset
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            targets: BTreeMap::new(),
        }
    }

    /// Add a control target, clamped to [0, 1]
    pub fn with(mut self, control: &str, value: f32) -> Self {
        self.targets.insert(control.to_string(), value.clamp(0.0, 1.0));
        self
    }

    /// Target for a control, 0 when the preset does not name it
    pub fn target_for(&self, control: &str) -> f32 {
        self.targets.get(control).copied().unwrap_or(0.0)
    }
}

/// Read-only collection of expression presets
#[derive(Debug, Clone, Default)]
pub struct ExpressionLibrary {
    presets: BTreeMap<String, ExpressionPreset>,
}

impl ExpressionLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Library with the built-in presets plus configured overrides
    pub fn with_overrides(overrides: &BTreeMap<String, BTreeMap<String, f32>>) -> Self {
        let mut library = Self::builtin();
        for (name, targets) in overrides {
            let preset = targets
                .iter()
                .fold(ExpressionPreset::new(name), |p, (control, value)| {
                    p.with(control, *value)
                });
            library.add(preset);
        }
        library
    }

    /// Built-in presets for CC-rigged characters
    pub fn builtin() -> Self {
        let mut library = Self::new();

        library.add(ExpressionPreset::new("Neutral"));
        library.add(
            ExpressionPreset::new("Happy")
                .with("Mouth_Smile", 1.0)
                .with("Cheek_L", 0.5)
                .with("Cheek_R", 0.5)
                .with("Eye_Squeeze_L", 0.3)
                .with("Eye_Squeeze_R", 0.3)
                .with("Nose_Wrinkle", 0.1)
                .with("Eyebrow_Up_L", 0.4)
                .with("Eyebrow_Up_R", 0.4),
        );
        library.add(
            ExpressionPreset::new("Sad")
                .with("Mouth_Sad", 0.8)
                .with("Eyebrow_Sad_L", 0.7)
                .with("Eyebrow_Sad_R", 0.7)
                .with("Eye_Sad_L", 0.5)
                .with("Eye_Sad_R", 0.5)
                .with("Eye_Down_L", 0.3)
                .with("Eye_Down_R", 0.3)
                .with("Mouth_Down", 0.4),
        );
        library.add(
            ExpressionPreset::new("Angry")
                .with("Mouth_Angry", 0.8)
                .with("Eyebrow_Angry_L", 0.9)
                .with("Eyebrow_Angry_R", 0.9)
                .with("Eye_Squint_L", 0.6)
                .with("Eye_Squint_R", 0.6)
                .with("Nose_Scrunch", 0.7)
                .with("Mouth_Narrow", 0.5)
                .with("Jaw_Clench", 0.6),
        );
        library.add(
            ExpressionPreset::new("Surprised")
                .with("Mouth_Open", 0.8)
                .with("Eyebrow_Up_L", 1.0)
                .with("Eyebrow_Up_R", 1.0)
                .with("Eye_Wide_L", 0.9)
                .with("Eye_Wide_R", 0.9)
                .with("Jaw_Drop", 0.7)
                .with("Eye_Widen_L", 0.7)
                .with("Eye_Widen_R", 0.7),
        );
        library.add(
            ExpressionPreset::new("Talk")
                .with("Mouth_Open", 0.5)
                .with("Jaw_L", 0.2)
                .with("Jaw_R", 0.2)
                .with("Mouth_Lips_Part", 0.6)
                .with("Jaw_Forward", 0.2)
                .with("Jaw_Open", 0.6)
                .with("Mouth_Lips_Jaw_Adjust", 0.4),
        );
        library.add(
            ExpressionPreset::new("Excited")
                .with("Mouth_Open", 0.7)
                .with("Mouth_Smile", 1.0)
                .with("Eyebrow_Up_L", 0.8)
                .with("Eyebrow_Up_R", 0.8)
                .with("Eye_Wide_L", 0.6)
                .with("Eye_Wide_R", 0.6)
                .with("Jaw_Drop", 0.5),
        );
        library.add(
            ExpressionPreset::new("Wink")
                .with("Eye_Blink_L", 1.0)
                .with("Mouth_Smile", 0.3)
                .with("Cheek_L", 0.5),
        );
        library.add(
            ExpressionPreset::new("Confused")
                .with("Eyebrow_Up_L", 0.8)
                .with("Eyebrow_Down_R", 0.6)
                .with("Mouth_Pout", 0.4)
                .with("Eye_Squint_L", 0.3)
                .with("Head_Tilt", 0.5),
        );

        library
    }

    /// Add or replace a preset
    pub fn add(&mut self, preset: ExpressionPreset) {
        self.presets.insert(preset.name.clone(), preset);
    }

    /// Get a preset by name
    pub fn get(&self, name: &str) -> Option<&ExpressionPreset> {
        self.presets.get(name)
    }

    /// All preset names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(|s| s.as_str())
    }
}
