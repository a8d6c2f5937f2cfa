//! Clip mixer: playback state, cross-fades and weighted sampling.

use glam::{Quat, Vec3};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::clip::{AnimationClip, TrackData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Wrap back to the start forever
    Repeat,
    /// Play once and hold the final pose
    Once,
}

/// Linear weight ramp
#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
}

impl Fade {
    fn weight(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = (self.elapsed / self.duration).min(1.0);
        self.from + (self.to - self.from) * t
    }

    fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Playback state of one clip
#[derive(Debug, Clone)]
pub struct ClipAction {
    clip: Arc<AnimationClip>,
    pub time: f32,
    pub loop_mode: LoopMode,
    pub weight: f32,
    pub paused: bool,
    pub enabled: bool,
    fade: Option<Fade>,
}

impl ClipAction {
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        Self {
            clip,
            time: 0.0,
            loop_mode: LoopMode::Repeat,
            weight: 1.0,
            paused: false,
            enabled: true,
            fade: None,
        }
    }

    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    /// Rewind to the start and resume playback
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.paused = false;
        self.enabled = true;
    }

    pub fn fade_in(&mut self, duration: f32) {
        self.schedule_fade(0.0, 1.0, duration);
    }

    pub fn fade_out(&mut self, duration: f32) {
        self.schedule_fade(self.weight, 0.0, duration);
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// A play-once action that reached its last frame
    pub fn is_finished(&self) -> bool {
        self.loop_mode == LoopMode::Once && self.paused && self.time >= self.clip.duration
    }

    fn schedule_fade(&mut self, from: f32, to: f32, duration: f32) {
        let fade = Fade {
            from,
            to,
            duration,
            elapsed: 0.0,
        };
        self.weight = fade.weight();
        self.fade = Some(fade);
    }

    /// Advance play-head and weight by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        if !self.enabled {
            return;
        }

        if let Some(fade) = self.fade.as_mut() {
            fade.elapsed += dt;
            self.weight = fade.weight();
            if fade.finished() {
                let faded_out = fade.to == 0.0;
                self.fade = None;
                if faded_out {
                    self.enabled = false;
                }
            }
        }

        let duration = self.clip.duration;
        if self.paused || duration <= 0.0 {
            return;
        }

        self.time += dt;
        match self.loop_mode {
            LoopMode::Once => {
                if self.time >= duration {
                    self.time = duration;
                    self.paused = true;
                }
            }
            LoopMode::Repeat => {
                if self.time >= duration {
                    self.time %= duration;
                }
            }
        }
    }
}

/// Blended clip output for one bone
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoneSample {
    pub rotation: Option<(Quat, f32)>,
    pub translation: Option<(Vec3, f32)>,
}

/// Accumulate `value` with `weight` into a running weighted blend
fn accumulate<T, F>(slot: &mut Option<(T, f32)>, value: T, weight: f32, mix: F)
where
    T: Copy,
    F: Fn(T, T, f32) -> T,
{
    *slot = Some(match *slot {
        None => (value, weight),
        Some((acc, acc_weight)) => {
            let total = acc_weight + weight;
            (mix(acc, value, weight / total), total)
        }
    });
}

/// Owns clip actions; at most one is current at a time
#[derive(Debug, Clone)]
pub struct ClipMixer {
    actions: BTreeMap<String, ClipAction>,
    current: Option<String>,
    fade_secs: f32,
}

impl ClipMixer {
    pub fn new(fade_secs: f32) -> Self {
        Self {
            actions: BTreeMap::new(),
            current: None,
            fade_secs,
        }
    }

    /// Cross-fade to `clip`.
    ///
    /// The current action fades out while the clip's action (created on first
    /// use, reused afterwards) is rewound and fades in. Replaying the current
    /// clip restarts its single action instead of stacking a second one.
    pub fn play(&mut self, clip: Arc<AnimationClip>, loop_mode: LoopMode) {
        let name = clip.name.clone();

        if let Some(current) = self.current.as_deref() {
            if current != name {
                if let Some(action) = self.actions.get_mut(current) {
                    action.fade_out(self.fade_secs);
                }
            }
        }

        let action = self
            .actions
            .entry(name.clone())
            .or_insert_with(|| ClipAction::new(clip));
        action.loop_mode = loop_mode;
        action.reset();
        action.fade_in(self.fade_secs);

        self.current = Some(name);
    }

    pub fn update(&mut self, dt: f32) {
        for action in self.actions.values_mut() {
            action.update(dt);
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn action(&self, name: &str) -> Option<&ClipAction> {
        self.actions.get(name)
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Actions currently contributing to the pose
    pub fn active_count(&self) -> usize {
        self.actions
            .values()
            .filter(|a| a.enabled && a.weight > 0.0)
            .count()
    }

    /// Sample every contributing action and blend per bone by weight
    pub fn sample(&self) -> BTreeMap<String, BoneSample> {
        let mut out: BTreeMap<String, BoneSample> = BTreeMap::new();

        for action in self.actions.values() {
            if !action.enabled || action.weight <= 0.0 {
                continue;
            }
            for track in &action.clip.tracks {
                let sample = out.entry(track.bone.clone()).or_default();
                match &track.data {
                    TrackData::Rotation(t) => accumulate(
                        &mut sample.rotation,
                        t.sample(action.time),
                        action.weight,
                        |a, b, w| a.slerp(b, w),
                    ),
                    TrackData::Translation(t) => accumulate(
                        &mut sample.translation,
                        t.sample(action.time),
                        action.weight,
                        |a, b, w| a.lerp(b, w),
                    ),
                }
            }
        }

        out
    }
}
