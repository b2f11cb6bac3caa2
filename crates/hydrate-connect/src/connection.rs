//! Collaborator traits implemented by a store driver

use crate::policy::ConnectionPolicy;
use hydrate_core_discovery::ServerAddress;

/// A live connection to the backend store
///
/// Connections are shared behind an `Arc` while active or stale, so every
/// method takes `&self`.
#[async_trait::async_trait]
pub trait Connection: Send + Sync + 'static {
    /// Handle to a named resource (collection, table) of a database
    type Resource: Send;

    /// Obtain a handle to `name` inside `database`
    fn resource(&self, database: &str, name: &str) -> Self::Resource;

    /// Release the connection's resources
    ///
    /// Operations already dispatched through the connection are unaffected.
    /// The lifecycle manager calls this at most once per connection.
    async fn close(&self);
}

/// Factory trait for building connections from resolved servers
#[async_trait::async_trait]
pub trait ConnectionFactory<C: Connection>: Send + Sync {
    /// Build a connection to the given servers using `policy`
    async fn connect(
        &self,
        servers: &[ServerAddress],
        policy: &ConnectionPolicy,
    ) -> anyhow::Result<C>;
}
