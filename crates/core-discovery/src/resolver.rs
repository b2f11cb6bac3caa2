//! Membership resolution
//!
//! `MembershipResolver` is what an external membership service implements.
//! `EndpointResolver` sits in front of it and turns its raw answer into a
//! validated `EndpointSet`, surfacing every failure as a `ResolutionError`.

use crate::endpoint::EndpointSet;
use crate::error::ResolutionError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// External membership service: maps an application name to the endpoints of
/// its current member servers
#[async_trait::async_trait]
pub trait MembershipResolver: Send + Sync {
    /// Current member endpoints for `application`, in no particular order
    async fn members(&self, application: &str) -> anyhow::Result<Vec<String>>;
}

/// Adapter over a `MembershipResolver`
///
/// Performs no retries. An empty answer is returned as an empty set; deciding
/// whether that is acceptable is up to the caller.
#[derive(Clone)]
pub struct EndpointResolver {
    inner: Arc<dyn MembershipResolver>,
}

impl EndpointResolver {
    pub fn new(inner: Arc<dyn MembershipResolver>) -> Self {
        Self { inner }
    }

    /// Resolve the current endpoint set for an application
    ///
    /// # Errors
    ///
    /// - `ResolutionError::Unavailable` if the membership service call failed
    /// - `ResolutionError::Malformed` if it listed a blank endpoint
    pub async fn resolve(&self, application: &str) -> Result<EndpointSet, ResolutionError> {
        let members = self
            .inner
            .members(application)
            .await
            .map_err(|source| ResolutionError::Unavailable {
                application: application.to_string(),
                source,
            })?;

        let mut endpoints = Vec::with_capacity(members.len());
        for (position, member) in members.iter().enumerate() {
            let member = member.trim();
            if member.is_empty() {
                return Err(ResolutionError::Malformed {
                    application: application.to_string(),
                    reason: format!("blank endpoint at position {}", position),
                });
            }
            endpoints.push(member.to_string());
        }

        let endpoints: EndpointSet = endpoints.into_iter().collect();
        trace!("Resolved {} for application {}", endpoints, application);
        Ok(endpoints)
    }
}

/// In-memory membership table
///
/// Useful for fixed deployments and for simulating membership changes in
/// tests. Unknown applications have no members.
#[derive(Debug, Default)]
pub struct StaticMembership {
    applications: RwLock<HashMap<String, Vec<String>>>,
}

impl StaticMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table holding a single application
    pub fn with_members<I, S>(application: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut applications = HashMap::new();
        applications.insert(
            application.into(),
            members.into_iter().map(Into::into).collect(),
        );
        Self {
            applications: RwLock::new(applications),
        }
    }

    /// Replace the member list of an application
    pub async fn set_members<I, S>(&self, application: impl Into<String>, members: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let application = application.into();
        let members: Vec<String> = members.into_iter().map(Into::into).collect();
        debug!("Membership of {} set to {:?}", application, members);

        let mut applications = self.applications.write().await;
        applications.insert(application, members);
    }

    /// Forget an application entirely
    pub async fn remove(&self, application: &str) -> bool {
        let mut applications = self.applications.write().await;
        applications.remove(application).is_some()
    }
}

#[async_trait::async_trait]
impl MembershipResolver for StaticMembership {
    async fn members(&self, application: &str) -> anyhow::Result<Vec<String>> {
        let applications = self.applications.read().await;
        Ok(applications.get(application).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UnreachableMembership;

    #[async_trait::async_trait]
    impl MembershipResolver for UnreachableMembership {
        async fn members(&self, _application: &str) -> anyhow::Result<Vec<String>> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn test_resolve_collects_set() {
        let membership = Arc::new(StaticMembership::with_members(
            "orders",
            ["host2:2000", " host1:1000 ", "host2:2000"],
        ));
        let resolver = EndpointResolver::new(membership);

        let endpoints = resolver.resolve("orders").await.unwrap();
        let expected: EndpointSet = ["host1:1000", "host2:2000"].into_iter().collect();
        assert_eq!(endpoints, expected);
    }

    #[tokio::test]
    async fn test_unknown_application_is_empty() {
        let resolver = EndpointResolver::new(Arc::new(StaticMembership::new()));
        let endpoints = resolver.resolve("missing").await.unwrap();
        assert!(endpoints.is_empty());
    }

    #[tokio::test]
    async fn test_resolver_failure_is_surfaced() {
        let resolver = EndpointResolver::new(Arc::new(UnreachableMembership));

        let err = resolver.resolve("orders").await.unwrap_err();
        assert!(matches!(err, ResolutionError::Unavailable { .. }));
        assert_eq!(err.application(), "orders");
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_blank_member_is_malformed() {
        let membership = Arc::new(StaticMembership::with_members("orders", ["host1:1000", "  "]));
        let resolver = EndpointResolver::new(membership);

        let err = resolver.resolve("orders").await.unwrap_err();
        assert!(matches!(err, ResolutionError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_membership_changes_are_visible() {
        let membership = Arc::new(StaticMembership::with_members("orders", ["host1:1000"]));
        let resolver = EndpointResolver::new(membership.clone());

        membership.set_members("orders", ["host2:2000"]).await;
        let endpoints = resolver.resolve("orders").await.unwrap();
        assert!(endpoints.contains("host2:2000"));
        assert!(!endpoints.contains("host1:1000"));

        assert!(membership.remove("orders").await);
        assert!(resolver.resolve("orders").await.unwrap().is_empty());
    }
}
