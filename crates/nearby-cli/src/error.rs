//! Error handling for the nearby CLI

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Nearby error [{code}]: {source}")]
    Nearby {
        code: &'static str,
        #[source]
        source: nearby_core::NearbyError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),
}

impl CliError {
    /// Attach the rejection code of the command that failed
    pub fn command(kind: nearby_core::CommandKind, source: nearby_core::NearbyError) -> Self {
        CliError::Nearby {
            code: kind.error_code(),
            source,
        }
    }
}

impl From<nearby_core::NearbyError> for CliError {
    fn from(source: nearby_core::NearbyError) -> Self {
        CliError::Nearby {
            code: "NEARBY_MESSAGES_ERROR",
            source,
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
