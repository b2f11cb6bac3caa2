//! Hydrate Connect: Connection lifecycle management over a discovered server set
//!
//! This crate keeps a live connection to a backend store whose member
//! servers are discovered through an external membership service rather
//! than configured statically.
//!
//! # Architecture
//!
//! - **LifecycleManager**: Resolves members on every request and swaps to a new
//!   connection when they change, keeping the previous connection open for one
//!   more swap so in-flight requests can finish
//! - **Connection / ConnectionFactory**: Traits a store driver implements
//! - **ConnectionPolicy**: Read preference and write concern for new connections
//!
//! ```text
//!  get_resource(name)
//!        │
//!        ▼
//!  EndpointResolver ──► EndpointSet ── empty? ──► NoActiveServers
//!        │
//!        ▼  (swap lock)
//!  same as last seen? ── yes ──► active connection
//!        │ no
//!        ▼
//!  parse addresses ─► close stale ─► build new ─► stale := active, active := new
//! ```

pub mod connection;
pub mod error;
pub mod manager;
pub mod policy;

pub use connection::{Connection, ConnectionFactory};
pub use error::ConnectError;
pub use manager::{LifecycleManager, ManagerSnapshot, Warmup};
pub use policy::{ConnectionPolicy, ReadPreference, WriteConcern};
