//! Configuration for the achievement engine

use serde::{Deserialize, Serialize};

/// Configuration for the achievement engine
///
/// # Examples
///
/// ```
/// use lifequest_engine::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert!(!config.dry_run);
/// assert!(config.resync_on_edit);
///
/// let config = EngineConfig::preview();
/// assert!(config.dry_run);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Evaluate and report without writing progress rows
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,

    /// Reopen and re-evaluate progress when a definition's condition is edited
    /// Default: true
    #[serde(default = "default_resync_on_edit")]
    pub resync_on_edit: bool,
}

fn default_resync_on_edit() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            resync_on_edit: default_resync_on_edit(),
        }
    }
}

impl EngineConfig {
    /// Read-only configuration: sweeps report what would unlock
    pub fn preview() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }
}
