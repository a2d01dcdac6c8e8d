use thiserror::Error;

/// Errors raised while loading or interpreting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file or an env override could not be parsed.
    #[error("Configuration error: {0}")]
    Invalid(String),
}
