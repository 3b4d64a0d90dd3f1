//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use lifequest_engine::EngineConfig;
use lifequest_gatekeeper::ValidationConfig;
use lifequest_domain::XpRules;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI configuration.
///
/// Every table is optional; a missing file yields the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file; defaults to `lifequest.db` next to the config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// XP tables and level curve
    #[serde(default)]
    pub xp: XpRules,

    /// Achievement engine behavior
    #[serde(default)]
    pub engine: EngineConfig,

    /// Authoring-time checks for new achievements
    #[serde(default)]
    pub validation: ValidationPreset,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Log filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// How long a write waits for another writer, in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

/// Named gatekeeper presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPreset {
    /// Reference checks on, unknown kinds and legacy keys refused
    #[default]
    Default,
    /// Parameter checks only
    Permissive,
    /// Default plus a required description
    Strict,
}

impl ValidationPreset {
    /// Expand the preset into a full validation config.
    pub fn to_config(self) -> ValidationConfig {
        match self {
            ValidationPreset::Default => ValidationConfig::default(),
            ValidationPreset::Permissive => ValidationConfig::permissive(),
            ValidationPreset::Strict => ValidationConfig::strict(),
        }
    }
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".lifequest").join("config.toml"))
    }

    /// Load configuration from `path` (or the default path).
    ///
    /// A missing file yields defaults. Invalid XP rules are rejected here so
    /// that no command runs against a broken table.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        let config = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            toml::from_str::<Config>(&contents)?
        } else {
            Self::default()
        };

        config
            .xp
            .validate()
            .map_err(|e| CliError::Config(format!("Invalid [xp] table: {}", e)))?;

        Ok(config.anchored_at(&path))
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Database file to open.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(p) => Ok(p.clone()),
            None => Ok(Self::default_path()?.with_file_name("lifequest.db")),
        }
    }

    /// Busy timeout for store writes.
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.settings.busy_timeout_ms)
    }

    // Relative database paths are taken relative to the config file.
    fn anchored_at(mut self, config_path: &Path) -> Self {
        let base = config_path.parent().map(Path::to_path_buf);
        match (self.database_path.take(), base) {
            (Some(db), Some(base)) if db.is_relative() => {
                self.database_path = Some(base.join(db));
            }
            (Some(db), _) => self.database_path = Some(db),
            (None, Some(base)) => self.database_path = Some(base.join("lifequest.db")),
            (None, None) => {}
        }
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            log_level: default_log_level(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5000
}
