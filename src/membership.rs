/*!
 * File-backed membership resolution
 *
 * A membership file maps application names to their member endpoints:
 *
 * ```toml
 * [applications]
 * orders = ["mongodb://db1:27017", "db2:27017"]
 * ```
 *
 * The file is re-read on every lookup, so rewriting it is how an operator
 * (or a sidecar syncing from a discovery service) announces new members.
 */

use anyhow::Context;
use hydrate_core_discovery::{MembershipResolver, StaticMembership};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

use crate::config::MembershipSource;

/// On-disk layout of a membership file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipFile {
    #[serde(default)]
    pub applications: HashMap<String, Vec<String>>,
}

impl MembershipFile {
    /// Write the table to `path`, replacing any previous content
    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self).context("encoding membership file")?;
        std::fs::write(path, contents)
            .with_context(|| format!("writing membership file {}", path.display()))?;
        Ok(())
    }
}

/// `MembershipResolver` reading a membership file on each call
#[derive(Debug, Clone)]
pub struct FileMembership {
    path: PathBuf,
}

impl FileMembership {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl MembershipResolver for FileMembership {
    async fn members(&self, application: &str) -> anyhow::Result<Vec<String>> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading membership file {}", self.path.display()))?;
        let file: MembershipFile = toml::from_str(&contents)
            .with_context(|| format!("parsing membership file {}", self.path.display()))?;

        let members = file
            .applications
            .get(application)
            .cloned()
            .unwrap_or_default();
        trace!(
            "{} lists {} member(s) for {}",
            self.path.display(),
            members.len(),
            application
        );
        Ok(members)
    }
}

/// Build the resolver described by a configured membership source
pub fn resolver_for(application: &str, source: &MembershipSource) -> Arc<dyn MembershipResolver> {
    match source {
        MembershipSource::File { path } => Arc::new(FileMembership::new(path.clone())),
        MembershipSource::Static { endpoints } => Arc::new(StaticMembership::with_members(
            application,
            endpoints.iter().cloned(),
        )),
    }
}
