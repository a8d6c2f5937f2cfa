//! Controllable bone table.
//!
//! Holds the bones that can be posed by name. Rotations written here are the
//! "manual" pose; the clip mixer blends its output on top of them each frame.

use glam::{EulerRot, Quat, Vec3};
use std::collections::BTreeMap;

use crate::error::AvatarError;

/// Local transform of one controllable bone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bone {
    /// Rotation set by poses and direct edits
    pub pose_rotation: Quat,
    /// Euler angles of `pose_rotation` in degrees, as last requested
    pub pose_degrees: [f32; 3],
    /// Rotation after clip blending (what the renderer draws)
    pub rotation: Quat,
    /// Translation offset written by clip tracks
    pub translation: Vec3,
}

impl Default for Bone {
    fn default() -> Self {
        Self {
            pose_rotation: Quat::IDENTITY,
            pose_degrees: [0.0; 3],
            rotation: Quat::IDENTITY,
            translation: Vec3::ZERO,
        }
    }
}

/// Convert [x, y, z] degrees to a quaternion using intrinsic XYZ order
pub fn euler_degrees_to_quat(degrees: [f32; 3]) -> Quat {
    Quat::from_euler(
        EulerRot::XYZ,
        degrees[0].to_radians(),
        degrees[1].to_radians(),
        degrees[2].to_radians(),
    )
}

/// Name to bone lookup, populated once at model load
#[derive(Debug, Clone, Default)]
pub struct BoneTable {
    bones: BTreeMap<String, Bone>,
}

impl BoneTable {
    /// Register every discovered bone that is on the allow-list
    pub fn from_discovered<'a>(
        discovered: impl IntoIterator<Item = &'a str>,
        allow_list: &[String],
    ) -> Self {
        let mut bones = BTreeMap::new();
        for name in discovered {
            if allow_list.iter().any(|allowed| allowed == name) {
                tracing::debug!("Registered controllable bone: {}", name);
                bones.insert(name.to_string(), Bone::default());
            }
        }
        Self { bones }
    }

    /// Set a bone's local rotation immediately, no interpolation
    pub fn set_rotation(&mut self, name: &str, degrees: [f32; 3]) -> Result<Quat, AvatarError> {
        if let Some(&value) = degrees.iter().find(|d| !d.is_finite()) {
            return Err(AvatarError::InvalidValue {
                name: name.to_string(),
                value,
            });
        }
        let bone = self
            .bones
            .get_mut(name)
            .ok_or_else(|| AvatarError::UnknownBone(name.to_string()))?;

        let rotation = euler_degrees_to_quat(degrees);
        bone.pose_rotation = rotation;
        bone.pose_degrees = degrees;
        bone.rotation = rotation;
        Ok(rotation)
    }

    pub fn get(&self, name: &str) -> Option<&Bone> {
        self.bones.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Bone> {
        self.bones.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bones.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bones.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bone)> {
        self.bones.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Bone)> {
        self.bones.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}
