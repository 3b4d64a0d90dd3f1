//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Store(#[from] lifequest_store::StoreError),

    /// XP rules rejected the inputs
    #[error(transparent)]
    Xp(#[from] lifequest_domain::XpError),

    /// Achievement engine error
    #[error("Achievement engine error: {0}")]
    Engine(#[from] lifequest_engine::EngineError),

    /// Achievement definition rejected at authoring time
    #[error(transparent)]
    Gatekeeper(#[from] lifequest_gatekeeper::GatekeeperError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
