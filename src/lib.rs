/*!
 * Hydrate - Hydrated database connections
 *
 * Keeps a live connection to a store whose member servers are discovered
 * through a membership service:
 * - Membership re-resolved on every resource request
 * - Connection swapped when the member set changes
 * - Previous connection kept open for one swap so in-flight requests finish
 * - TOML configuration, file-backed membership, TCP reference driver
 */

pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod membership;

use hydrate_connect::LifecycleManager;
use hydrate_core_discovery::EndpointResolver;
use std::sync::Arc;

// Re-export commonly used types
pub use config::{HydrateConfig, LogLevel, MembershipSource};
pub use driver::{CollectionHandle, TcpConnection, TcpDriver};
pub use error::{HydrateError, Result};
pub use membership::{FileMembership, MembershipFile};

/// Manager over the TCP reference driver
pub type HydratedDatabase = LifecycleManager<TcpConnection>;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the lifecycle manager a configuration describes
///
/// No connection is opened here; the first `get_collection` or `initialize`
/// call does that.
pub fn open_database(config: &HydrateConfig) -> Result<HydratedDatabase> {
    config.validate()?;

    let resolver = EndpointResolver::new(membership::resolver_for(
        &config.application,
        &config.membership,
    ));
    let driver = Arc::new(TcpDriver::new(config.connect_timeout()));

    Ok(LifecycleManager::with_policy(
        config.application.clone(),
        config.database.clone(),
        resolver,
        driver,
        config.policy(),
    ))
}
