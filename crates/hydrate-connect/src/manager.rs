//! LifecycleManager: Keeps one live connection in step with a discovered server set
//!
//! Every resource request re-resolves the application's members. When the
//! member set changed since the active connection was built, the manager
//! swaps in a new connection while the previous one stays open as the
//! "stale" connection, giving requests already issued against it a full
//! swap cycle to finish. The connection that was stale before a swap is the
//! one closed by it, so at most two connections are ever open.

use crate::connection::{Connection, ConnectionFactory};
use crate::error::ConnectError;
use crate::policy::{ConnectionPolicy, ReadPreference, WriteConcern};
use hydrate_core_discovery::{parse_endpoints, EndpointResolver, EndpointSet};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Outcome of a best-effort `initialize()` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warmup {
    /// A new active connection was built
    Built,
    /// The active connection already matches the resolved members
    AlreadyCurrent,
    /// Another caller held the swap lock; nothing was done
    Contended,
}

/// Point-in-time view of a manager, for status reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagerSnapshot {
    pub application: String,
    pub database: String,
    /// Endpoint set the active connection was built from
    pub endpoints: EndpointSet,
    /// Number of successful swaps so far
    pub generation: u64,
    pub has_active: bool,
    pub has_stale: bool,
    pub closed: bool,
}

/// Everything the swap lock protects
struct SwapState<C> {
    /// Always the set `active` was built from
    last_seen: EndpointSet,
    active: Option<Arc<C>>,
    stale: Option<Arc<C>>,
    generation: u64,
    closed: bool,
}

impl<C> SwapState<C> {
    fn new() -> Self {
        Self {
            last_seen: EndpointSet::new(),
            active: None,
            stale: None,
            generation: 0,
            closed: false,
        }
    }
}

/// Connection lifecycle manager for one (application, database) pair
///
/// Create one per pair and share it (typically behind an `Arc`) with every
/// caller that needs resources from that database.
///
/// # Example
///
/// ```rust,no_run
/// use hydrate_connect::{Connection, ConnectionFactory, ConnectionPolicy, LifecycleManager};
/// use hydrate_core_discovery::{EndpointResolver, ServerAddress, StaticMembership};
/// use std::sync::Arc;
///
/// struct Client;
///
/// #[async_trait::async_trait]
/// impl Connection for Client {
///     type Resource = String;
///
///     fn resource(&self, database: &str, name: &str) -> String {
///         format!("{}.{}", database, name)
///     }
///
///     async fn close(&self) {}
/// }
///
/// struct Driver;
///
/// #[async_trait::async_trait]
/// impl ConnectionFactory<Client> for Driver {
///     async fn connect(
///         &self,
///         _servers: &[ServerAddress],
///         _policy: &ConnectionPolicy,
///     ) -> anyhow::Result<Client> {
///         Ok(Client)
///     }
/// }
///
/// # async fn example() -> Result<(), hydrate_connect::ConnectError> {
/// let membership = Arc::new(StaticMembership::with_members("orders", ["db1:27017"]));
/// let manager = LifecycleManager::new(
///     "orders",
///     "shop",
///     EndpointResolver::new(membership),
///     Arc::new(Driver),
/// );
///
/// let collection = manager.get_collection("invoices").await?;
/// assert_eq!(collection, "shop.invoices");
/// # Ok(())
/// # }
/// ```
pub struct LifecycleManager<C: Connection> {
    application: String,
    database: String,
    resolver: EndpointResolver,
    factory: Arc<dyn ConnectionFactory<C>>,

    /// Applied to connections built from now on, never to existing ones
    policy: RwLock<ConnectionPolicy>,

    /// Swap lock around last-seen endpoints and the active/stale pair
    state: Mutex<SwapState<C>>,
}

impl<C: Connection> LifecycleManager<C> {
    /// Create a manager; no connection is built until first use or `initialize()`
    pub fn new(
        application: impl Into<String>,
        database: impl Into<String>,
        resolver: EndpointResolver,
        factory: Arc<dyn ConnectionFactory<C>>,
    ) -> Self {
        Self {
            application: application.into(),
            database: database.into(),
            resolver,
            factory,
            policy: RwLock::new(ConnectionPolicy::default()),
            state: Mutex::new(SwapState::new()),
        }
    }

    /// Create a manager with a non-default connection policy
    pub fn with_policy(
        application: impl Into<String>,
        database: impl Into<String>,
        resolver: EndpointResolver,
        factory: Arc<dyn ConnectionFactory<C>>,
        policy: ConnectionPolicy,
    ) -> Self {
        let manager = Self::new(application, database, resolver, factory);
        Self {
            policy: RwLock::new(policy),
            ..manager
        }
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Get a handle to the named resource
    ///
    /// This will:
    /// 1. Resolve the application's current members
    /// 2. Swap to a new connection if they differ from the last-seen set
    /// 3. Return the resource from the (possibly new) active connection
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Membership resolution fails (`Resolution`)
    /// - The membership service lists no servers (`NoActiveServers`)
    /// - A member endpoint is malformed (`AddressParse`)
    /// - The new connection cannot be built (`ConnectionBuild`)
    /// - The manager was shut down (`Closed`)
    ///
    /// A failed swap leaves the active connection and last-seen endpoints
    /// untouched, so the next call retries the whole swap.
    pub async fn get_resource(&self, name: &str) -> Result<C::Resource, ConnectError> {
        let endpoints = self.resolve_members().await?;

        let connection = {
            let mut state = self.state.lock().await;
            self.ensure_open(&state)?;

            let current = match &state.active {
                Some(active) if state.last_seen == endpoints => Some(Arc::clone(active)),
                _ => None,
            };

            match current {
                Some(active) => {
                    debug!(
                        "Reusing connection generation {} for {}",
                        state.generation, self.application
                    );
                    active
                }
                None => self.swap(&mut state, endpoints).await?,
            }
        };

        Ok(connection.resource(&self.database, name))
    }

    /// Alias of `get_resource` for document stores
    pub async fn get_collection(&self, name: &str) -> Result<C::Resource, ConnectError> {
        self.get_resource(name).await
    }

    /// Pre-warm the connection without waiting on a swap in progress
    ///
    /// Runs the same resolve-and-swap sequence as `get_resource`, but only if
    /// the swap lock is free. Under contention it returns `Warmup::Contended`
    /// immediately and does not retry.
    pub async fn initialize(&self) -> Result<Warmup, ConnectError> {
        let endpoints = self.resolve_members().await?;

        let Ok(mut state) = self.state.try_lock() else {
            debug!(
                "Swap already in progress for {}, skipping warm-up",
                self.application
            );
            return Ok(Warmup::Contended);
        };
        self.ensure_open(&state)?;

        if state.active.is_some() && state.last_seen == endpoints {
            return Ok(Warmup::AlreadyCurrent);
        }

        self.swap(&mut state, endpoints).await?;
        Ok(Warmup::Built)
    }

    /// Close the active and stale connections and refuse further requests
    ///
    /// Calling this more than once is a no-op.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        if state.closed {
            return;
        }
        state.closed = true;

        info!(
            "Shutting down connections for {}/{}",
            self.application, self.database
        );

        if let Some(stale) = state.stale.take() {
            stale.close().await;
        }
        if let Some(active) = state.active.take() {
            active.close().await;
        }
    }

    /// Status view taken under the swap lock
    pub async fn snapshot(&self) -> ManagerSnapshot {
        let state = self.state.lock().await;
        ManagerSnapshot {
            application: self.application.clone(),
            database: self.database.clone(),
            endpoints: state.last_seen.clone(),
            generation: state.generation,
            has_active: state.active.is_some(),
            has_stale: state.stale.is_some(),
            closed: state.closed,
        }
    }

    pub async fn read_preference(&self) -> ReadPreference {
        self.policy.read().await.read_preference
    }

    /// Takes effect at the next swap; the active connection keeps its policy
    pub async fn set_read_preference(&self, read_preference: ReadPreference) {
        self.policy.write().await.read_preference = read_preference;
    }

    pub async fn write_concern(&self) -> WriteConcern {
        self.policy.read().await.write_concern
    }

    /// Takes effect at the next swap; the active connection keeps its policy
    pub async fn set_write_concern(&self, write_concern: WriteConcern) {
        self.policy.write().await.write_concern = write_concern;
    }

    pub async fn policy(&self) -> ConnectionPolicy {
        *self.policy.read().await
    }

    async fn resolve_members(&self) -> Result<EndpointSet, ConnectError> {
        let endpoints = self.resolver.resolve(&self.application).await?;

        if endpoints.is_empty() {
            warn!(
                "Membership service lists no servers for {}, keeping current connection",
                self.application
            );
            return Err(ConnectError::NoActiveServers {
                application: self.application.clone(),
            });
        }

        Ok(endpoints)
    }

    fn ensure_open(&self, state: &SwapState<C>) -> Result<(), ConnectError> {
        if state.closed {
            return Err(ConnectError::Closed {
                application: self.application.clone(),
                database: self.database.clone(),
            });
        }
        Ok(())
    }

    /// Replace the active connection; must be called with the swap lock held
    ///
    /// Addresses are parsed before anything is touched, so a malformed
    /// endpoint leaves the state exactly as it was. The connection from two
    /// swaps ago is closed before the new one is built, which bounds the
    /// number of open connections to two.
    async fn swap(
        &self,
        state: &mut SwapState<C>,
        endpoints: EndpointSet,
    ) -> Result<Arc<C>, ConnectError> {
        let servers = parse_endpoints(&endpoints)?;

        info!(
            "Servers for {} changed from {} to {}, building new connection",
            self.application, state.last_seen, endpoints
        );

        if let Some(retired) = state.stale.take() {
            debug!("Closing connection retired two swaps ago for {}", self.application);
            retired.close().await;
        }

        let policy = *self.policy.read().await;
        let connection = match self.factory.connect(&servers, &policy).await {
            Ok(connection) => Arc::new(connection),
            Err(source) => {
                warn!("Connection build failed for {}: {}", self.application, source);
                return Err(ConnectError::ConnectionBuild {
                    application: self.application.clone(),
                    endpoints,
                    source,
                });
            }
        };

        state.stale = state.active.replace(Arc::clone(&connection));
        state.last_seen = endpoints;
        state.generation += 1;

        info!(
            "Connection generation {} active for {} (read preference {}, write concern {})",
            state.generation, self.application, policy.read_preference, policy.write_concern
        );

        Ok(connection)
    }
}
