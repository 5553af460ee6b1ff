//! Error types for ambra.

use thiserror::Error;

/// Core error type. Configuration paths return these; the realtime process
/// path never does.
#[derive(Error, Debug)]
pub enum AmbraError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed precondition: {0}")]
    FailedPrecondition(String),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("asset error: {0}")]
    Asset(String),

    #[error("malformed WAV data: {0}")]
    Wav(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias.
pub type AmbraResult<T> = Result<T, AmbraError>;
