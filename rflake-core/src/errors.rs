use thiserror::Error;

/// Error type for invalid lake model inputs.
///
/// Physical bound violations discovered while stepping are never surfaced
/// here; they are clamped and recorded in [`crate::constraints::Diagnostics`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlakeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid forcing: {0}")]
    InvalidForcing(String),
    #[error("Unable to parse configuration: {0}")]
    ConfigParse(String),
}

/// Convenience type for `Result<T, FlakeError>`.
pub type FlakeResult<T> = Result<T, FlakeError>;
