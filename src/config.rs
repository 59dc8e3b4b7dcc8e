use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
#[cfg(feature = "cli")]
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub audio: AudioConfig,
}

/// Session loop configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Tick interval in milliseconds.
    pub tick_ms: u64,
    /// Default practice speed multiplier.
    pub speed_multiplier: f64,
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub muted: bool,
    /// Base speech rate; phase rates multiply this.
    pub speech_rate: f32,
    /// Platform voice identifier, if the backend supports selection.
    pub voice: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_ms: defaults::TICK_INTERVAL_MS,
            speed_multiplier: defaults::MIN_SPEED_MULTIPLIER,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            muted: false,
            speech_rate: 1.0,
            voice: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Self::default()
                } else {
                    panic!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - CLAQUE_SPEED → session.speed_multiplier
    /// - CLAQUE_MUTED → audio.muted
    /// - CLAQUE_VOICE → audio.voice
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(speed) = std::env::var("CLAQUE_SPEED")
            && let Ok(value) = speed.parse::<f64>()
        {
            self.session.speed_multiplier = value;
        }

        if let Ok(muted) = std::env::var("CLAQUE_MUTED")
            && !muted.is_empty()
        {
            self.audio.muted = muted == "1" || muted.eq_ignore_ascii_case("true");
        }

        if let Ok(voice) = std::env::var("CLAQUE_VOICE")
            && !voice.is_empty()
        {
            self.audio.voice = Some(voice);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/claque/config.toml on Linux
    #[cfg(feature = "cli")]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("claque")
            .join("config.toml")
    }
}
