//! Error types for the hydrate-connect crate

use hydrate_core_discovery::{AddressParseError, EndpointSet, ResolutionError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("No active servers registered for application '{application}'")]
    NoActiveServers { application: String },

    #[error(transparent)]
    AddressParse(#[from] AddressParseError),

    #[error("Failed to connect application '{application}' to {endpoints}: {source}")]
    ConnectionBuild {
        application: String,
        endpoints: EndpointSet,
        #[source]
        source: anyhow::Error,
    },

    #[error("Connection manager for '{application}/{database}' has been shut down")]
    Closed {
        application: String,
        database: String,
    },
}

impl ConnectError {
    /// Whether a caller may reasonably retry the same call later
    ///
    /// The manager itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            ConnectError::Resolution(_) => true,
            ConnectError::NoActiveServers { .. } => true,
            ConnectError::ConnectionBuild { .. } => true,
            ConnectError::AddressParse(_) => false,
            ConnectError::Closed { .. } => false,
        }
    }
}
