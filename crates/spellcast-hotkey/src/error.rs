//! Error types for hotkey operations

use thiserror::Error;

/// A descriptor string could not be turned into a key sequence
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse key sequence '{input}': {message}")]
pub struct ParseError {
    pub input: String,
    pub message: String,
}

impl ParseError {
    pub fn new(input: impl Into<String>, message: impl Into<String>) -> Self {
        ParseError {
            input: input.into(),
            message: message.into(),
        }
    }
}

/// A parsed sequence was rejected by the registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid key sequence '{sequence}': {message}")]
pub struct ValidationError {
    pub sequence: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(sequence: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            sequence: sequence.into(),
            message: message.into(),
        }
    }
}

/// Errors that can occur in the sequence registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors that can occur in the recognition engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("hotkey manager already running")]
    AlreadyRunning,

    #[error("hotkey manager not running")]
    NotRunning,

    #[error("no tokio runtime available to run the recognition loop")]
    NoRuntime,

    #[error("failed to parse prefix key: {0}")]
    Prefix(#[source] ParseError),

    #[error("prefix key must be a single key combination, got '{0}'")]
    MultiStepPrefix(String),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Errors that can occur while loading or applying configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("No configuration directory available on this platform")]
    NoConfigDir,

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Spell '{descriptor}' rejected: {source}")]
    Spell {
        descriptor: String,
        #[source]
        source: RegistryError,
    },
}
