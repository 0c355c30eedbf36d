//! Error types for configuration.

use thiserror::Error;

/// Problems with the process configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is not set or empty.
    #[error("{0} not set. Add it to the environment or .env file.")]
    Missing(&'static str),

    /// A variable is set but unusable.
    #[error("Invalid {var}='{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Result type for configuration.
pub type Result<T> = std::result::Result<T, ConfigError>;
