//! Expression blender.
//!
//! Owns the live value of every facial control and the table of in-flight
//! interpolation tasks. At most one task exists per control: scheduling a new
//! target for a control replaces whatever task was animating it.

use std::collections::{BTreeMap, HashMap};

use super::expression::ExpressionPreset;
use crate::error::AvatarError;

/// Cubic ease-in-out on `t` in [0, 1]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// An in-flight interpolation of one control
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTask {
    /// Slot in the live value array
    pub slot: usize,
    pub start_value: f32,
    pub target_value: f32,
    /// Controller clock at creation (ms)
    pub start_ms: f64,
    pub duration_ms: f64,
}

impl AnimationTask {
    /// Linear progress in [0, 1] at `now_ms`
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        let elapsed = (now_ms - self.start_ms).max(0.0);
        (elapsed / self.duration_ms).min(1.0) as f32
    }

    /// Eased value at `now_ms`
    pub fn value_at(&self, now_ms: f64) -> f32 {
        let progress = self.progress(now_ms);
        if progress >= 1.0 {
            return self.target_value;
        }
        let eased = ease_in_out_cubic(progress);
        self.start_value + (self.target_value - self.start_value) * eased
    }
}

/// Live facial control values plus their pending interpolations
#[derive(Debug, Clone, Default)]
pub struct ExpressionBlender {
    names: Vec<String>,
    index: HashMap<String, usize>,
    values: Vec<f32>,
    tasks: BTreeMap<usize, AnimationTask>,
}

impl ExpressionBlender {
    /// Register discovered controls, all starting at 0. Duplicates are ignored.
    pub fn new<I, S>(controls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut blender = Self::default();
        for name in controls {
            let name = name.into();
            if blender.index.contains_key(&name) {
                continue;
            }
            blender.index.insert(name.clone(), blender.names.len());
            blender.names.push(name);
            blender.values.push(0.0);
        }
        blender
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn value(&self, name: &str) -> Option<f32> {
        self.index_of(name).map(|slot| self.values[slot])
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Direct access to the live slots, used by the blink driver
    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn task(&self, name: &str) -> Option<&AnimationTask> {
        self.index_of(name).and_then(|slot| self.tasks.get(&slot))
    }

    pub fn active_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Schedule `name` toward `target` (clamped to [0, 1])
    pub fn set_control(
        &mut self,
        name: &str,
        target: f32,
        now_ms: f64,
        duration_ms: f64,
    ) -> Result<(), AvatarError> {
        if !target.is_finite() {
            return Err(AvatarError::InvalidValue {
                name: name.to_string(),
                value: target,
            });
        }
        let slot = self
            .index_of(name)
            .ok_or_else(|| AvatarError::UnknownControl(name.to_string()))?;
        self.schedule(slot, target.clamp(0.0, 1.0), now_ms, duration_ms);
        Ok(())
    }

    /// Schedule every known control toward the preset's target, 0 when unnamed.
    ///
    /// Returns the number of tasks scheduled.
    pub fn apply_preset(
        &mut self,
        preset: &ExpressionPreset,
        now_ms: f64,
        duration_ms: f64,
    ) -> usize {
        for control in preset.targets.keys() {
            if !self.index.contains_key(control) {
                tracing::debug!(
                    "Preset '{}' names control '{}' which the model does not have",
                    preset.name,
                    control
                );
            }
        }

        for slot in 0..self.values.len() {
            let target = preset.target_for(&self.names[slot]);
            self.schedule(slot, target, now_ms, duration_ms);
        }
        self.values.len()
    }

    fn schedule(&mut self, slot: usize, target: f32, now_ms: f64, duration_ms: f64) {
        self.tasks.insert(
            slot,
            AnimationTask {
                slot,
                start_value: self.values[slot],
                target_value: target,
                start_ms: now_ms,
                duration_ms,
            },
        );
    }

    /// Advance every task to `now_ms`, writing live values and dropping
    /// finished tasks
    pub fn advance(&mut self, now_ms: f64) {
        let values = &mut self.values;
        self.tasks.retain(|_, task| {
            values[task.slot] = task.value_at(now_ms);
            task.progress(now_ms) < 1.0
        });
    }

    /// Drop all tasks and zero every control
    pub fn reset(&mut self) {
        self.tasks.clear();
        self.values.iter_mut().for_each(|v| *v = 0.0);
    }
}
