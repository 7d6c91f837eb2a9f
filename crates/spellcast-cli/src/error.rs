// CLI error types

use spellcast_hotkey::{ConfigError, EngineError, ParseError};
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Spellbook has {errors} error(s)")]
    ValidationFailed { errors: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::InvalidArgument { message } => {
                format!(
                    "Invalid argument: {}\n\nRun 'spellcast --help' for usage information.",
                    message
                )
            }
            CliError::Io(e) => format!("File operation failed: {}", e),
            CliError::Config(e) => {
                format!(
                    "Configuration error: {}\n\nRun 'spellcast check' to validate your spellbook.",
                    e
                )
            }
            CliError::Parse(e) => {
                format!("{}\n\nRun 'spellcast keys' to list valid key and modifier names.", e)
            }
            CliError::Engine(e) => format!("Hotkey engine error: {}", e),
            CliError::ValidationFailed { errors } => {
                format!("Spellbook check failed with {} error(s).", errors)
            }
            CliError::Internal(msg) => {
                format!("Internal error: {}\n\nPlease report this issue.", msg)
            }
        }
    }

    /// Get technical details for verbose mode
    pub fn technical_details(&self) -> String {
        format!("{:?}", self)
    }
}

pub type CliResult<T> = Result<T, CliError>;
