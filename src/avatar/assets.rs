//! Model and clip asset loading

use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use super::clip::{remap_clip_tracks, AnimationClip, ClipFile};
use super::controller::AvatarController;
use crate::config::{AvatarConfig, RemapConfig};
use crate::error::AvatarError;

/// What the external model loader discovered in the rigged character
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    /// Facial morph target names
    #[serde(default)]
    pub morph_targets: Vec<String>,
    /// Skeleton bone names
    #[serde(default)]
    pub bones: Vec<String>,
}

/// Resolves and loads the model manifest and clip files
#[derive(Debug, Clone)]
pub struct AssetManager {
    manifest: PathBuf,
    clips: BTreeMap<String, PathBuf>,
    remap: RemapConfig,
}

impl AssetManager {
    pub fn new(config: &AvatarConfig) -> Self {
        let base_dir = if config.assets_dir.is_absolute() {
            config.assets_dir.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&config.assets_dir)
        };

        if !base_dir.exists() {
            tracing::warn!("Assets directory does not exist: {}", base_dir.display());
        }

        Self {
            manifest: base_dir.join(&config.manifest),
            clips: config
                .clips
                .iter()
                .map(|(name, path)| (name.clone(), base_dir.join(path)))
                .collect(),
            remap: config.remap.clone(),
        }
    }

    pub fn clip_path(&self, name: &str) -> Option<&Path> {
        self.clips.get(name).map(|p| p.as_path())
    }

    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.clips.keys().map(|s| s.as_str())
    }

    pub async fn load_manifest(&self) -> Result<ModelManifest, AvatarError> {
        let text = read_asset(&self.manifest).await?;
        serde_json::from_str(&text).map_err(|e| AvatarError::AssetParse {
            path: self.manifest.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load one clip and retarget it onto the rig
    pub async fn load_clip(&self, name: &str) -> Result<AnimationClip, AvatarError> {
        let path = self
            .clip_path(name)
            .ok_or_else(|| AvatarError::UnknownClip(name.to_string()))?;

        let text = read_asset(path).await?;
        let file: ClipFile = serde_json::from_str(&text).map_err(|e| AvatarError::AssetParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let clip = AnimationClip::from_file(name, file)?;
        Ok(remap_clip_tracks(clip, &self.remap))
    }

    /// Load the model, then every clip concurrently, reporting each clip to
    /// the controller as soon as its own load finishes.
    ///
    /// A missing or broken manifest aborts before any clip is loaded.
    pub async fn load_into(&self, controller: &RwLock<AvatarController>) -> Result<(), AvatarError> {
        let manifest = self.load_manifest().await?;
        controller.write().await.on_model_loaded(&manifest);

        let mut pending: FuturesUnordered<_> = self
            .clip_names()
            .map(|name| async move { (name, self.load_clip(name).await) })
            .collect();

        while let Some((name, result)) = pending.next().await {
            controller.write().await.on_clip_loaded(name, result);
        }
        Ok(())
    }
}

async fn read_asset(path: &Path) -> Result<String, AvatarError> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AvatarError::AssetNotFound(path.display().to_string())
        } else {
            AvatarError::AssetParse {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
        "morph_targets": ["Eye_Blink_L", "Eye_Blink_R", "Mouth_Open"],
        "bones": ["CC_Base_Head", "CC_Base_Spine02", "CC_Base_Hip"]
    }"#;

    const IDLE: &str = r#"{
        "name": "mixamo.com",
        "tracks": [
            { "name": "Spine02.quaternion", "times": [0.0, 2.0],
              "values": [[0, 0, 0, 1], [0, 0.0871557, 0, 0.9961947]] },
            { "name": "Hip.position", "times": [0.0], "values": [[0, 1, 0]] },
            { "name": "Head.quaternion", "times": [0.0, 1.0],
              "values": [[0, 0, 0, 1], [0, 0, 0, 1]] }
        ]
    }"#;

    fn create_test_assets(with_talk: bool) -> (TempDir, AvatarConfig) {
        let dir = TempDir::new().unwrap();

        std::fs::write(dir.path().join("model.json"), MANIFEST).unwrap();
        let anim_dir = dir.path().join("animations");
        std::fs::create_dir(&anim_dir).unwrap();
        std::fs::write(anim_dir.join("idle.json"), IDLE).unwrap();
        if with_talk {
            std::fs::write(anim_dir.join("talk.json"), "{ not json").unwrap();
        }

        let mut config = AvatarConfig::default();
        config.assets_dir = dir.path().to_path_buf();
        config.blink.seed = Some(1);

        (dir, config)
    }

    #[tokio::test]
    async fn test_load_manifest() {
        let (_dir, config) = create_test_assets(false);
        let manager = AssetManager::new(&config);

        let manifest = manager.load_manifest().await.unwrap();
        assert_eq!(manifest.morph_targets.len(), 3);
        assert_eq!(manifest.bones[0], "CC_Base_Head");
    }

    #[tokio::test]
    async fn test_load_clip_is_remapped() {
        let (_dir, config) = create_test_assets(false);
        let manager = AssetManager::new(&config);

        let clip = manager.load_clip("idle").await.unwrap();
        assert_eq!(clip.name, "idle");
        let bones: Vec<_> = clip.tracks.iter().map(|t| t.bone.as_str()).collect();
        // Spine02 and Hip are skipped by the default remap
        assert_eq!(bones, vec!["CC_Base_Head"]);
    }

    #[tokio::test]
    async fn test_load_errors() {
        let (_dir, config) = create_test_assets(true);
        let manager = AssetManager::new(&config);

        assert!(matches!(
            manager.load_clip("talk").await,
            Err(AvatarError::AssetParse { .. })
        ));
        assert!(matches!(
            manager.load_clip("wave").await,
            Err(AvatarError::UnknownClip(_))
        ));
    }

    #[tokio::test]
    async fn test_load_into_reports_every_clip() {
        let (_dir, config) = create_test_assets(false);
        let manager = AssetManager::new(&config);
        let controller = RwLock::new(AvatarController::new(&config));

        manager.load_into(&controller).await.unwrap();

        let controller = controller.read().await;
        assert!(controller.model_ready());
        // talk.json is missing but still counts as reported
        assert!(controller.clips_ready());
        assert_eq!(controller.clip_names(), vec!["idle".to_string()]);
        assert_eq!(controller.current_clip(), Some("idle"));
    }

    #[tokio::test]
    async fn test_load_into_reports_failed_clip_once() {
        let (_dir, mut config) = create_test_assets(true);
        config.clips.insert("wave".to_string(), "animations/wave.json".into());
        let manager = AssetManager::new(&config);
        let controller = RwLock::new(AvatarController::new(&config));

        manager.load_into(&controller).await.unwrap();

        let mut controller = controller.write().await;
        assert!(controller.clips_ready());
        assert_eq!(controller.clip_names(), vec!["idle".to_string()]);
        // A late duplicate report changes nothing
        controller.on_clip_loaded("talk", Err(AvatarError::UnknownClip("talk".to_string())));
        assert!(controller.clips_ready());
        assert_eq!(controller.clip_names(), vec!["idle".to_string()]);
    }

    #[tokio::test]
    async fn test_bundled_assets_load() {
        let mut config = AvatarConfig::default();
        config.assets_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/default");
        config.blink.seed = Some(5);

        let controller = RwLock::new(AvatarController::new(&config));
        AssetManager::new(&config).load_into(&controller).await.unwrap();

        let mut controller = controller.write().await;
        assert!(controller.clips_ready());
        assert_eq!(controller.clip_names().len(), 2);
        assert_eq!(controller.bone_names().len(), 4);
        assert!(controller.play_animation("talk").is_ok());
        controller.advance(0.5);
        assert!(controller.frame().animated_bones.contains_key("CC_Base_R_Forearm"));
    }

    #[tokio::test]
    async fn test_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let mut config = AvatarConfig::default();
        config.assets_dir = dir.path().to_path_buf();

        let manager = AssetManager::new(&config);
        let controller = RwLock::new(AvatarController::new(&config));
        assert!(matches!(
            manager.load_into(&controller).await,
            Err(AvatarError::AssetNotFound(_))
        ));
        assert!(!controller.read().await.model_ready());
    }
}
