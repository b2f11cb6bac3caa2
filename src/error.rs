/*!
 * Error types for Hydrate
 */

use hydrate_connect::ConnectError;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HydrateError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_UNAVAILABLE: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

#[derive(Error, Debug)]
pub enum HydrateError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Connection lifecycle error
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Membership source could not be read
    #[error("Membership error: {0}")]
    Membership(String),

    /// Output could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl HydrateError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            HydrateError::Config(_) | HydrateError::Serialization(_) => EXIT_FATAL,
            HydrateError::Connect(e) if !e.is_retryable() => EXIT_FATAL,
            HydrateError::Connect(_) | HydrateError::Membership(_) | HydrateError::Io(_) => {
                EXIT_UNAVAILABLE
            }
        }
    }
}

impl From<serde_json::Error> for HydrateError {
    fn from(err: serde_json::Error) -> Self {
        HydrateError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(HydrateError::Config("bad".into()).exit_code(), EXIT_FATAL);

        let unavailable = HydrateError::from(ConnectError::NoActiveServers {
            application: "orders".to_string(),
        });
        assert_eq!(unavailable.exit_code(), EXIT_UNAVAILABLE);

        let closed = HydrateError::from(ConnectError::Closed {
            application: "orders".to_string(),
            database: "shop".to_string(),
        });
        assert_eq!(closed.exit_code(), EXIT_FATAL);
    }

    #[test]
    fn test_connect_error_is_transparent() {
        let err = HydrateError::from(ConnectError::NoActiveServers {
            application: "orders".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "No active servers registered for application 'orders'"
        );
    }
}
