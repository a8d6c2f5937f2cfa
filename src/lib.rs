//! Mimic3D - Headless Avatar Rig Service
//!
//! Drives a rigged 3D character for an external renderer:
//! - Eased facial expression blending with presets
//! - Involuntary blinking
//! - Bone poses and cross-faded skeletal clips
//! - Per-frame snapshots over HTTP/SSE
//! - Text-to-speech proxy with word timings

pub mod avatar;
pub mod config;
pub mod error;
pub mod output;
pub mod tts;
pub mod web;

pub use config::Config;
pub use error::{Mimic3dError, Result};

use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use avatar::{AvatarCommand, AvatarController, AvatarFrame, CommandOutcome};
use tts::TtsProxy;

/// Application state shared across all components
#[derive(Debug)]
pub struct AppState {
    /// Current configuration
    pub config: RwLock<Config>,
    /// The live avatar; every command and frame takes the write lock
    pub controller: RwLock<AvatarController>,
    /// Channel for per-frame snapshots
    pub frame_tx: broadcast::Sender<AvatarFrame>,
    /// Shutdown signal
    pub shutdown_tx: broadcast::Sender<()>,
    /// Text-to-speech proxy, absent when disabled
    pub tts: Option<TtsProxy>,
}

impl AppState {
    /// Create a new application state with the given configuration
    pub fn new(config: Config) -> Result<Arc<Self>> {
        let tts = if config.tts.enabled {
            Some(TtsProxy::new(&config.tts)?)
        } else {
            None
        };
        Ok(Self::with_tts(config, tts))
    }

    /// Create a state with an explicit TTS proxy
    pub fn with_tts(config: Config, tts: Option<TtsProxy>) -> Arc<Self> {
        let (frame_tx, _) = broadcast::channel(64);
        let (shutdown_tx, _) = broadcast::channel(1);
        let controller = AvatarController::new(&config.avatar);

        Arc::new(Self {
            config: RwLock::new(config),
            controller: RwLock::new(controller),
            frame_tx,
            shutdown_tx,
            tts,
        })
    }

    /// Run one command against the avatar
    pub async fn execute(&self, command: AvatarCommand) -> CommandOutcome {
        self.controller.write().await.execute(&command)
    }

    /// Advance the avatar by `dt_secs` and broadcast the resulting frame
    pub async fn tick(&self, dt_secs: f32) -> AvatarFrame {
        let frame = {
            let mut controller = self.controller.write().await;
            controller.advance(dt_secs);
            controller.frame()
        };
        let _ = self.frame_tx.send(frame.clone());
        frame
    }

    /// Snapshot of the avatar without advancing it
    pub async fn current_frame(&self) -> AvatarFrame {
        self.controller.read().await.frame()
    }

    /// Subscribe to per-frame snapshots
    pub fn subscribe_frames(&self) -> broadcast::Receiver<AvatarFrame> {
        self.frame_tx.subscribe()
    }

    /// Subscribe to shutdown signal
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avatar::ModelManifest;

    #[tokio::test]
    async fn test_tick_broadcasts_frame() {
        let state = AppState::with_tts(Config::default(), None);
        state.controller.write().await.on_model_loaded(&ModelManifest {
            morph_targets: vec!["Mouth_Open".to_string()],
            bones: vec!["CC_Base_Head".to_string()],
        });

        let mut rx = state.subscribe_frames();
        let outcome = state
            .execute(AvatarCommand::SetControl {
                name: "Mouth_Open".to_string(),
                value: 1.0,
            })
            .await;
        assert!(outcome.is_applied());

        let frame = state.tick(0.25).await;
        assert_eq!(frame.control("Mouth_Open"), Some(1.0));

        let received = rx.recv().await.unwrap();
        assert_eq!(received, frame);
        assert_eq!(state.current_frame().await, frame);
    }

    #[tokio::test]
    async fn test_tts_disabled() {
        let mut config = Config::default();
        config.tts.enabled = false;
        let state = AppState::new(config).unwrap();
        assert!(state.tts.is_none());
    }
}
