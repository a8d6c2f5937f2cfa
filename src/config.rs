//! Configuration parsing and management for Mimic3D

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Mimic3dError};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub avatar: AvatarConfig,
    pub tts: TtsConfig,
    pub http: HttpConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Mimic3dError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::ReadFile(format!("{}: {}", path.as_ref().display(), e))
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, Mimic3dError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()).into())
    }

    /// Load configuration from default paths
    pub fn load() -> Result<Self, Mimic3dError> {
        let paths = [
            PathBuf::from("config.toml"),
            PathBuf::from("config/default.toml"),
            dirs_path().join("config.toml"),
        ];

        for path in &paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Mimic3dError> {
        if self.avatar.frame_rate == 0 {
            return Err(invalid("avatar.frame_rate", "Frame rate must be greater than 0"));
        }

        let blink = &self.avatar.blink;
        if blink.close_ms <= 0.0 || blink.open_ms <= 0.0 {
            return Err(invalid(
                "avatar.blink",
                "Close and open durations must be greater than 0",
            ));
        }
        if blink.min_delay_ms <= 0.0 || blink.min_delay_ms > blink.max_delay_ms {
            return Err(invalid(
                "avatar.blink",
                "min_delay_ms must be positive and not exceed max_delay_ms",
            ));
        }
        if blink.min_delay_ms < blink.close_ms + blink.open_ms {
            tracing::warn!(
                "Blink delay ({} ms) is shorter than a blink ({} ms); blinks will run back to back",
                blink.min_delay_ms,
                blink.close_ms + blink.open_ms
            );
        }

        let transitions = &self.avatar.transitions;
        if transitions.control_ms < 0.0 || transitions.preset_ms < 0.0 {
            return Err(invalid(
                "avatar.transitions",
                "Transition durations must not be negative",
            ));
        }
        if transitions.clip_fade_secs < 0.0 {
            return Err(invalid(
                "avatar.transitions.clip_fade_secs",
                "Fade duration must not be negative",
            ));
        }

        for (name, preset) in &self.avatar.expressions {
            if let Some((control, value)) =
                preset.iter().find(|(_, v)| !(0.0..=1.0).contains(*v))
            {
                return Err(invalid(
                    &format!("avatar.expressions.{}.{}", name, control),
                    &format!("Value {} must be between 0.0 and 1.0", value),
                ));
            }
        }

        if !(0.0..=1.0).contains(&self.tts.stability) {
            return Err(invalid("tts.stability", "Stability must be between 0.0 and 1.0"));
        }
        if !(0.0..=1.0).contains(&self.tts.similarity_boost) {
            return Err(invalid(
                "tts.similarity_boost",
                "Similarity boost must be between 0.0 and 1.0",
            ));
        }
        if self.tts.word_duration_ms == 0 {
            return Err(invalid(
                "tts.word_duration_ms",
                "Word duration must be greater than 0",
            ));
        }

        if self.http.port == 0 {
            return Err(invalid("http.port", "Port must be greater than 0"));
        }

        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> Mimic3dError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
    .into()
}

/// Avatar rig configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    /// Directory containing the model manifest and clip files
    pub assets_dir: PathBuf,
    /// Model manifest path (relative to assets dir)
    pub manifest: PathBuf,
    /// Clip name to clip file path (relative to assets dir)
    pub clips: BTreeMap<String, PathBuf>,
    /// Frames per second for the controller loop
    pub frame_rate: u32,
    /// Bones that may be posed directly
    pub controllable_bones: Vec<String>,
    /// Clips that loop; every other clip plays once and holds
    pub looping_clips: Vec<String>,
    /// Clip started automatically once the model and clips are ready
    pub idle_clip: String,
    /// Start the idle clip automatically
    pub auto_play_idle: bool,
    /// Involuntary blink timing
    pub blink: BlinkConfig,
    /// Interpolation and fade timings
    pub transitions: TransitionConfig,
    /// Clip track remapping applied at load time
    pub remap: RemapConfig,
    /// Extra or overriding expression presets
    pub expressions: BTreeMap<String, BTreeMap<String, f32>>,
    /// Extra or overriding body pose presets (degrees)
    pub poses: BTreeMap<String, BTreeMap<String, [f32; 3]>>,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        let mut clips = BTreeMap::new();
        clips.insert("idle".to_string(), PathBuf::from("animations/idle.json"));
        clips.insert("talk".to_string(), PathBuf::from("animations/talk.json"));

        Self {
            assets_dir: PathBuf::from("assets/default"),
            manifest: PathBuf::from("model.json"),
            clips,
            frame_rate: 60,
            controllable_bones: vec![
                "CC_Base_Head".to_string(),
                "CC_Base_L_Upperarm".to_string(),
                "CC_Base_R_Upperarm".to_string(),
                "CC_Base_Spine02".to_string(),
            ],
            looping_clips: vec!["idle".to_string()],
            idle_clip: "idle".to_string(),
            auto_play_idle: true,
            blink: BlinkConfig::default(),
            transitions: TransitionConfig::default(),
            remap: RemapConfig::default(),
            expressions: BTreeMap::new(),
            poses: BTreeMap::new(),
        }
    }
}

/// Involuntary blink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// Left eye blink control name
    pub left_control: String,
    /// Right eye blink control name
    pub right_control: String,
    /// Closing phase duration in milliseconds
    pub close_ms: f64,
    /// Opening phase duration in milliseconds
    pub open_ms: f64,
    /// Minimum delay between blink starts in milliseconds
    pub min_delay_ms: f64,
    /// Maximum delay between blink starts in milliseconds
    pub max_delay_ms: f64,
    /// Fixed RNG seed (random when unset)
    pub seed: Option<u64>,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            left_control: "Eye_Blink_L".to_string(),
            right_control: "Eye_Blink_R".to_string(),
            close_ms: 75.0,
            open_ms: 125.0,
            min_delay_ms: 2000.0,
            max_delay_ms: 6000.0,
            seed: None,
        }
    }
}

/// Transition timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Interpolation time for a single control edit (ms)
    pub control_ms: f64,
    /// Interpolation time for an expression preset (ms)
    pub preset_ms: f64,
    /// Cross-fade time between clips (seconds)
    pub clip_fade_secs: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            control_ms: 200.0,
            preset_ms: 500.0,
            clip_fade_secs: 0.3,
        }
    }
}

/// Track remapping for clips authored against a differently named skeleton
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemapConfig {
    /// Prefix added to bare bone names
    pub bone_prefix: String,
    /// Root bone name that is never prefixed
    pub root_bone: String,
    /// Source bones whose tracks are dropped
    pub skip_bones: Vec<String>,
}

impl Default for RemapConfig {
    fn default() -> Self {
        Self {
            bone_prefix: "CC_Base_".to_string(),
            root_bone: "RL_BoneRoot".to_string(),
            skip_bones: [
                "BoneRoot",
                "Hip",
                "Pelvis",
                "Waist",
                "Spine01",
                "Spine02",
                "L_Eye",
                "R_Eye",
                "L_Breast",
                "R_Breast",
                "L_RibsTwist",
                "R_RibsTwist",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Text-to-speech proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Enable the /api/tts endpoint
    pub enabled: bool,
    /// Environment variable holding the provider API key
    pub api_key_env: String,
    /// Provider API base URL
    pub base_url: String,
    /// Voice identifier
    pub voice_id: String,
    /// Synthesis model identifier
    pub model_id: String,
    /// Voice stability (0.0 - 1.0)
    pub stability: f32,
    /// Voice similarity boost (0.0 - 1.0)
    pub similarity_boost: f32,
    /// Upstream request timeout in seconds
    pub timeout_secs: u64,
    /// Per-word duration used for estimated timings (ms)
    pub word_duration_ms: u32,
    /// Experimental lip-sync alignment provider
    pub alignment: AlignmentConfig,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: "ELEVENLABS_API_KEY".to_string(),
            base_url: "https://api.elevenlabs.io/v1".to_string(),
            voice_id: "TxGEqnHWrfWFTfGW9XjX".to_string(),
            model_id: "eleven_monolingual_v1".to_string(),
            stability: 0.5,
            similarity_boost: 0.75,
            timeout_secs: 30,
            word_duration_ms: 300,
            alignment: AlignmentConfig::default(),
        }
    }
}

/// Lip-sync alignment provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Call the alignment provider after synthesis
    pub enabled: bool,
    /// Alignment endpoint URL
    pub endpoint: String,
    /// Environment variable holding the alignment API key
    pub api_key_env: String,
    /// Alignment model identifier
    pub model: String,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://api.sync.so/v2/generate".to_string(),
            api_key_env: "SYNC_API_KEY".to_string(),
            model: "lipsync-1.9.0-beta".to_string(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Enable HTTP server
    pub enabled: bool,
    /// HTTP server host
    pub host: String,
    /// HTTP server port
    pub port: u16,
    /// Enable CORS
    pub cors_enabled: bool,
    /// Directory served under /static
    pub static_dir: PathBuf,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_enabled: true,
            static_dir: PathBuf::from("static"),
        }
    }
}

fn dirs_path() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        if let Some(config_dir) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(config_dir).join("mimic3d");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config/mimic3d");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join("Library/Application Support/mimic3d");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("mimic3d");
        }
    }

    PathBuf::from(".")
}
