use crate::error::{MnemonoError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// TelegramConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: default_api_base(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Process configuration. Loaded from an optional YAML file; the CLI layers
/// environment variables and flags on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "paths::default_state_path")]
    pub state_file: PathBuf,
    #[serde(default = "default_days")]
    pub default_days: u32,
    #[serde(default = "default_min_days")]
    pub min_days: u32,
    #[serde(default = "default_max_days")]
    pub max_days: u32,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

fn default_port() -> u16 {
    8000
}

fn default_days() -> u32 {
    30
}

fn default_min_days() -> u32 {
    7
}

fn default_max_days() -> u32 {
    3650
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            state_file: paths::default_state_path(),
            default_days: default_days(),
            min_days: default_min_days(),
            max_days: default_max_days(),
            telegram: TelegramConfig::default(),
        }
    }
}

impl Config {
    /// Load `path`, falling back to defaults when the file does not exist.
    /// A relative `state_file` is resolved against the config file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let Some(data) = crate::io::read_if_exists(path)? else {
            return Ok(Self::default());
        };
        let mut config: Config = serde_yaml::from_str(&data)?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            config.state_file = paths::resolve(dir, &config.state_file);
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    /// The bot token, or `MissingToken` when none is configured.
    pub fn require_token(&self) -> Result<&str> {
        self.telegram
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(MnemonoError::MissingToken)
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.min_days == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "min_days must be at least 1".to_string(),
            });
        }
        if self.max_days < self.min_days {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "max_days ({}) is below min_days ({})",
                    self.max_days, self.min_days
                ),
            });
        }
        if self.default_days > self.max_days {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "default_days ({}) is above max_days ({}); new cycles will use {}",
                    self.default_days, self.max_days, self.max_days
                ),
            });
        }
        if self.default_days < self.min_days {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "default_days ({}) is below min_days ({}); new cycles will use {}",
                    self.default_days, self.min_days, self.min_days
                ),
            });
        }
        if self.telegram.poll_timeout_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "telegram.poll_timeout_secs is 0; polling will busy-loop".to_string(),
            });
        }
        if self.require_token().is_err() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "no bot token configured; `serve` will refuse to start".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
