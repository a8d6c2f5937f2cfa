//! Error types for Mimic3D

use thiserror::Error;

/// Main error type for Mimic3D
#[derive(Error, Debug)]
pub enum Mimic3dError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Avatar error: {0}")]
    Avatar(#[from] AvatarError),

    #[error("TTS error: {0}")]
    Tts(#[from] TtsError),

    #[error("Web server error: {0}")]
    Web(#[from] WebError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration value: {field} - {message}")]
    InvalidValue { field: String, message: String },
}

/// Avatar rig errors.
///
/// Lookup and readiness failures are never fatal: the controller logs them
/// and reports the command as ignored.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AvatarError {
    #[error("Unknown control: {0}")]
    UnknownControl(String),

    #[error("Unknown expression preset: {0}")]
    UnknownPreset(String),

    #[error("Unknown bone: {0}")]
    UnknownBone(String),

    #[error("Unknown body pose preset: {0}")]
    UnknownPose(String),

    #[error("Unknown animation clip: {0}")]
    UnknownClip(String),

    #[error("Not ready: {0}")]
    NotReady(&'static str),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: f32 },

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Failed to parse asset {path}: {message}")]
    AssetParse { path: String, message: String },
}

/// Text-to-speech proxy errors
#[derive(Error, Debug)]
pub enum TtsError {
    #[error("TTS API key is not configured")]
    MissingApiKey,

    #[error("Text is required")]
    EmptyText,

    #[error("TTS provider error: {message}")]
    Upstream { status: u16, message: String },

    #[error("TTS request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Alignment failed: {0}")]
    Alignment(String),
}

impl TtsError {
    /// HTTP status to report to the caller for this error
    pub fn status_code(&self) -> u16 {
        match self {
            TtsError::MissingApiKey => 500,
            TtsError::EmptyText => 400,
            TtsError::Upstream { status, .. } => *status,
            TtsError::Request(_) | TtsError::Alignment(_) => 500,
        }
    }

    /// Message exposed to API clients
    pub fn client_message(&self) -> String {
        match self {
            TtsError::Request(_) | TtsError::Alignment(_) => {
                "Failed to generate speech".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Web server errors
#[derive(Error, Debug)]
pub enum WebError {
    #[error("Failed to bind to address: {0}")]
    Bind(String),

    #[error("Server startup failed: {0}")]
    Startup(String),
}

/// Result type alias for Mimic3D operations
pub type Result<T> = std::result::Result<T, Mimic3dError>;
