//! Skeletal animation clips.
//!
//! Clips arrive from the external loader as JSON: one entry per track, named
//! `<bone>.<property>` with keyframe times in seconds. Supported properties
//! are `quaternion` (rotation) and `position` (translation).

use glam::{Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::config::RemapConfig;
use crate::error::AvatarError;

/// Values that can be interpolated between keyframes
pub trait Interpolatable: Copy {
    fn interpolate_linear(a: Self, b: Self, t: f32) -> Self;
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(a: Self, b: Self, t: f32) -> Self {
        a.lerp(b, t)
    }
}

impl Interpolatable for Quat {
    fn interpolate_linear(a: Self, b: Self, t: f32) -> Self {
        a.slerp(b, t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: Interpolation,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Build a track; times and values must be non-empty and the same length
    pub fn new(
        times: Vec<f32>,
        values: Vec<T>,
        interpolation: Interpolation,
    ) -> Result<Self, String> {
        if times.is_empty() {
            return Err("track has no keyframes".to_string());
        }
        if times.len() != values.len() {
            return Err(format!(
                "{} keyframe times but {} values",
                times.len(),
                values.len()
            ));
        }
        if times.windows(2).any(|w| w[1] < w[0]) {
            return Err("keyframe times are not sorted".to_string());
        }
        Ok(Self {
            times,
            values,
            interpolation,
        })
    }

    pub fn duration(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Sample the track at `time` seconds, clamping outside the keyed range
    pub fn sample(&self, time: f32) -> T {
        let len = self.times.len();
        // First index whose time is after `time`
        let next = self.times.partition_point(|&t| t <= time);
        if next == 0 {
            return self.values[0];
        }
        if next >= len {
            return self.values[len - 1];
        }

        let index = next - 1;
        match self.interpolation {
            Interpolation::Step => self.values[index],
            Interpolation::Linear => {
                let t0 = self.times[index];
                let t1 = self.times[next];
                let dt = t1 - t0;
                let t = if dt > 1e-6 { ((time - t0) / dt).clamp(0.0, 1.0) } else { 0.0 };
                T::interpolate_linear(self.values[index], self.values[next], t)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackData {
    Rotation(KeyframeTrack<Quat>),
    Translation(KeyframeTrack<Vec3>),
}

impl TrackData {
    pub fn duration(&self) -> f32 {
        match self {
            TrackData::Rotation(t) => t.duration(),
            TrackData::Translation(t) => t.duration(),
        }
    }
}

/// A track bound to one bone
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub bone: String,
    pub data: TrackData,
}

impl Track {
    /// The `<bone>.<property>` name used in clip files
    pub fn target_name(&self) -> String {
        let property = match self.data {
            TrackData::Rotation(_) => "quaternion",
            TrackData::Translation(_) => "position",
        };
        format!("{}.{}", self.bone, property)
    }
}

/// A named, read-only skeletal clip
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    pub fn new(name: &str, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .map(|t| t.data.duration())
            .fold(0.0_f32, f32::max);

        Self {
            name: name.to_string(),
            duration,
            tracks,
        }
    }

    /// Build a clip from its file representation, renaming it to `name`
    pub fn from_file(name: &str, file: ClipFile) -> Result<Self, AvatarError> {
        let mut tracks = Vec::with_capacity(file.tracks.len());

        for track in file.tracks {
            let Some((bone, property)) = track.name.split_once('.') else {
                return Err(parse_error(name, &format!("bad track name '{}'", track.name)));
            };

            let data = match property {
                "quaternion" => {
                    let values = track
                        .values
                        .iter()
                        .map(|v| match v.as_slice() {
                            [x, y, z, w] => Vec4::new(*x, *y, *z, *w)
                                .try_normalize()
                                .map(Quat::from_vec4)
                                .ok_or_else(|| format!("{}: zero-length quaternion", track.name)),
                            _ => Err(format!("{}: expected 4 components", track.name)),
                        })
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|e| parse_error(name, &e))?;
                    TrackData::Rotation(
                        KeyframeTrack::new(track.times, values, track.interpolation)
                            .map_err(|e| parse_error(name, &format!("{}: {}", track.name, e)))?,
                    )
                }
                "position" => {
                    let values = track
                        .values
                        .iter()
                        .map(|v| match v.as_slice() {
                            [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
                            _ => Err(format!("{}: expected 3 components", track.name)),
                        })
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|e| parse_error(name, &e))?;
                    TrackData::Translation(
                        KeyframeTrack::new(track.times, values, track.interpolation)
                            .map_err(|e| parse_error(name, &format!("{}: {}", track.name, e)))?,
                    )
                }
                other => {
                    tracing::debug!("Clip '{}': ignoring '{}' track on {}", name, other, bone);
                    continue;
                }
            };

            tracks.push(Track {
                bone: bone.to_string(),
                data,
            });
        }

        Ok(Self::new(name, tracks))
    }
}

fn parse_error(clip: &str, message: &str) -> AvatarError {
    AvatarError::AssetParse {
        path: clip.to_string(),
        message: message.to_string(),
    }
}

/// On-disk clip representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipFile {
    #[serde(default)]
    pub name: Option<String>,
    pub tracks: Vec<TrackFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackFile {
    /// `<bone>.<property>`
    pub name: String,
    pub times: Vec<f32>,
    pub values: Vec<Vec<f32>>,
    #[serde(default)]
    pub interpolation: Interpolation,
}

/// Retarget a clip authored with bare bone names onto the rig's naming.
///
/// Tracks for skipped bones are dropped; other bones get the rig prefix unless
/// they already carry it or are the rig root.
pub fn remap_clip_tracks(clip: AnimationClip, remap: &RemapConfig) -> AnimationClip {
    let tracks = clip
        .tracks
        .into_iter()
        .filter_map(|mut track| {
            if remap.skip_bones.iter().any(|b| *b == track.bone) {
                tracing::debug!("Skipping track for bone: {}", track.bone);
                return None;
            }
            if !track.bone.starts_with(&remap.bone_prefix) && track.bone != remap.root_bone {
                let target = format!("{}{}", remap.bone_prefix, track.bone);
                tracing::debug!("Remapping track: {} -> {}", track.bone, target);
                track.bone = target;
            }
            Some(track)
        })
        .collect();

    AnimationClip::new(&clip.name, tracks)
}
