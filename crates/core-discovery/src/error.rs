//! Error types for discovery operations

use std::num::ParseIntError;
use thiserror::Error;

/// Why a single endpoint string could not be turned into a `ServerAddress`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressErrorCause {
    #[error("endpoint is empty")]
    Empty,

    #[error("endpoint has no host")]
    MissingHost,

    #[error("invalid port '{value}': {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("port 0 is not a usable server port")]
    ZeroPort,

    #[error("IPv6 host is missing its closing ']'")]
    UnterminatedBracket,

    #[error("unexpected characters '{0}' after IPv6 host")]
    TrailingCharacters(String),
}

/// An endpoint string could not be converted to a usable address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid endpoint '{endpoint}': {cause}")]
pub struct AddressParseError {
    /// The raw endpoint string as delivered by the membership service
    pub endpoint: String,

    /// The underlying parse failure
    #[source]
    pub cause: AddressErrorCause,
}

impl AddressParseError {
    pub(crate) fn new(endpoint: &str, cause: AddressErrorCause) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            cause,
        }
    }
}

/// Membership lookup failed or returned malformed data
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("Membership service unavailable for application '{application}': {source}")]
    Unavailable {
        application: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Membership service returned malformed data for application '{application}': {reason}")]
    Malformed { application: String, reason: String },
}

impl ResolutionError {
    /// Application name the failed lookup was made for
    pub fn application(&self) -> &str {
        match self {
            ResolutionError::Unavailable { application, .. }
            | ResolutionError::Malformed { application, .. } => application,
        }
    }
}
