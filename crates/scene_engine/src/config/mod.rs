//! Configuration system
//!
//! Configuration files are TOML or RON, picked by file extension. The
//! runtime settings that drive the scene scheduler live here as
//! [`RuntimeConfig`].

pub use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => {
                toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            ConfigFormat::Ron => {
                ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
            }
        }
    }

    /// Load configuration from file, falling back to defaults when the file is missing
    fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            log::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

#[derive(Debug, Clone, Copy)]
enum ConfigFormat {
    Toml,
    Ron,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Whether the scheduler is hosted by the editor or by a standalone player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RuntimeMode {
    /// Editor build: systems not opted into edit mode only run while playing
    #[default]
    Editor,
    /// Shipped player: every enabled system always runs
    Standalone,
}

/// Scene scheduler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Editor or standalone hosting
    pub mode: RuntimeMode,

    /// Length of one fixed update step in seconds
    pub fixed_timestep: f32,

    /// Upper bound on fixed update steps per rendered frame
    pub max_fixed_steps_per_frame: u32,

    /// Enter play mode as soon as the first scene is loaded
    pub start_in_play_mode: bool,

    /// Default log filter used by host binaries
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mode: RuntimeMode::Editor,
            fixed_timestep: 1.0 / 60.0,
            max_fixed_steps_per_frame: 5,
            start_in_play_mode: false,
            log_level: "info".to_string(),
        }
    }
}

impl Config for RuntimeConfig {}

impl RuntimeConfig {
    /// Settings for a standalone player, which is always in play mode
    pub fn standalone() -> Self {
        Self {
            mode: RuntimeMode::Standalone,
            start_in_play_mode: true,
            ..Self::default()
        }
    }

    /// Builder pattern: set the fixed update step
    pub fn with_fixed_timestep(mut self, seconds: f32) -> Self {
        self.fixed_timestep = seconds;
        self
    }

    /// Builder pattern: set the per-frame fixed step cap
    pub fn with_max_fixed_steps(mut self, steps: u32) -> Self {
        self.max_fixed_steps_per_frame = steps;
        self
    }
}
