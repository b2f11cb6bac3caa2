//! Hydrate Core Discovery: Pure-logic service discovery primitives
//!
//! # Overview
//!
//! This crate turns the answer of an external membership service into
//! something a connection manager can act on:
//!
//! - **EndpointSet**: Order-independent set of member endpoints
//! - **ServerAddress**: Host and port parsed out of a raw endpoint string
//! - **MembershipResolver**: The collaborator trait a membership service implements
//! - **EndpointResolver**: Adapter that validates resolver output into an `EndpointSet`
//! - **StaticMembership**: In-memory resolver for tests and fixed deployments
//!
//! # Key Principles
//!
//! This crate has zero knowledge of:
//! - How connections to the member servers are built
//! - Which transport the membership service speaks
//! - Retry or backoff policy (callers decide)
//!
//! # Usage Example
//!
//! ```no_run
//! use hydrate_core_discovery::{EndpointResolver, StaticMembership};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), hydrate_core_discovery::ResolutionError> {
//! let membership = Arc::new(StaticMembership::new());
//! membership.set_members("orders", ["db1:27017", "db2:27017"]).await;
//!
//! let resolver = EndpointResolver::new(membership);
//! let endpoints = resolver.resolve("orders").await?;
//! assert_eq!(endpoints.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod endpoint;
pub mod error;
pub mod resolver;

pub use address::{parse_endpoints, ServerAddress, DEFAULT_PORT};
pub use endpoint::EndpointSet;
pub use error::{AddressErrorCause, AddressParseError, ResolutionError};
pub use resolver::{EndpointResolver, MembershipResolver, StaticMembership};

/// Prelude module for convenient imports
pub mod prelude {
    pub use super::address::{parse_endpoints, ServerAddress};
    pub use super::endpoint::EndpointSet;
    pub use super::error::{AddressParseError, ResolutionError};
    pub use super::resolver::{EndpointResolver, MembershipResolver, StaticMembership};
}
