//! Error types for api-cli

use thiserror::Error;

/// Result type alias using the api-cli Error
pub type Result<T> = std::result::Result<T, Error>;

/// api-cli error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(
        "no checkpoint specified - use --checkpoint or set one with 'api-cli session set-checkpoint CHECKPOINT_ID'"
    )]
    NoCheckpoint,

    #[error("invalid position '{0}': expected a non-negative integer")]
    InvalidPosition(String),

    #[error("failed to save session state: {0}")]
    SessionPersistFailed(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NoCheckpoint | Error::InvalidPosition(_) | Error::InvalidArgument(_) => {
                exit_code::VALIDATION
            }
            Error::InvalidConfig(_) => exit_code::USAGE,
            Error::Api { status, .. } => match status {
                404 => exit_code::NOT_FOUND,
                401 => exit_code::UNAUTHORIZED,
                429 => exit_code::RATE_LIMITED,
                400 => exit_code::VALIDATION,
                _ => exit_code::API,
            },
            // Step commands report this as a warning instead of failing.
            Error::SessionPersistFailed(_)
            | Error::Io(_)
            | Error::Serialization(_)
            | Error::Yaml(_) => exit_code::GENERAL,
        }
    }
}

/// Exit codes shared by every command.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const API: i32 = 3;
    pub const TIMEOUT: i32 = 4;
    pub const NOT_FOUND: i32 = 6;
    pub const UNAUTHORIZED: i32 = 7;
    pub const RATE_LIMITED: i32 = 8;
    pub const VALIDATION: i32 = 9;
}
