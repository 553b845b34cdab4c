//! Dependency version resolution
//!
//! One resolver, two strategies:
//! - `Pinned`: literal versions from a static table; a missing name is fatal
//! - `Live`: concurrent registry lookups; each name fails on its own

use crate::error::{LookupError, ScaffoldError};
use async_trait::async_trait;
use semver::Version;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Default bound on concurrent registry requests
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

/// Default time limit for one registry lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Static name -> version table
pub type PinnedVersions = BTreeMap<String, String>;

/// Source of the currently published version of a package
#[async_trait]
pub trait RegistryLookup: Send + Sync {
    async fn latest_version(&self, name: &str) -> Result<String, LookupError>;
}

/// How versions are obtained
#[derive(Clone)]
pub enum VersionStrategy {
    Pinned(PinnedVersions),
    Live {
        registry: Arc<dyn RegistryLookup>,
        max_in_flight: usize,
        /// Per-name limit; an elapsed lookup is reported as that name's failure
        lookup_timeout: Duration,
    },
}

impl VersionStrategy {
    pub fn live(registry: Arc<dyn RegistryLookup>) -> Self {
        Self::Live {
            registry,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

/// What to do with names whose live lookup failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FailurePolicy {
    /// Fail the whole run
    Abort,
    /// Fall back to the pinned table for the failed names
    #[default]
    Pinned,
}

/// Outcome of one resolution call.
///
/// Every requested name appears exactly once, either in `resolved` or in
/// `failures`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub resolved: BTreeMap<String, String>,
    pub failures: BTreeMap<String, LookupError>,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_names(&self) -> Vec<String> {
        self.failures.keys().cloned().collect()
    }

    /// Apply a caller policy to the failures and return a complete table
    pub fn settle(
        self,
        policy: FailurePolicy,
        pinned: &PinnedVersions,
    ) -> Result<BTreeMap<String, String>, ScaffoldError> {
        if self.failures.is_empty() {
            return Ok(self.resolved);
        }

        match policy {
            FailurePolicy::Abort => Err(ScaffoldError::UnresolvedDependencies(self.failed_names())),
            FailurePolicy::Pinned => {
                let missing: Vec<String> = self
                    .failures
                    .keys()
                    .filter(|name| !pinned.contains_key(*name))
                    .cloned()
                    .collect();
                if !missing.is_empty() {
                    return Err(ScaffoldError::MissingPinnedVersions(missing));
                }

                let mut versions = self.resolved;
                for name in self.failures.into_keys() {
                    tracing::debug!(dependency = %name, "using pinned version after failed lookup");
                    let version = pinned[&name].clone();
                    versions.insert(name, version);
                }
                Ok(versions)
            }
        }
    }
}

/// Resolves bare package names to version strings. Holds no state across
/// calls; every call re-reads the table or re-queries the registry.
pub struct VersionResolver {
    strategy: VersionStrategy,
}

impl VersionResolver {
    pub fn new(strategy: VersionStrategy) -> Self {
        Self { strategy }
    }

    pub fn pinned(table: PinnedVersions) -> Self {
        Self::new(VersionStrategy::Pinned(table))
    }

    pub fn strategy(&self) -> &VersionStrategy {
        &self.strategy
    }

    /// Resolve every name. Duplicates in the input collapse.
    ///
    /// The pinned strategy fails fast when any name is missing from its
    /// table. The live strategy never fails as a whole; per-name failures are
    /// reported in [`Resolution::failures`].
    pub async fn resolve<I, S>(&self, names: I) -> Result<Resolution, ScaffoldError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();

        match &self.strategy {
            VersionStrategy::Pinned(table) => resolve_pinned(table, names),
            VersionStrategy::Live {
                registry,
                max_in_flight,
                lookup_timeout,
            } => Ok(resolve_live(registry, *max_in_flight, *lookup_timeout, names).await),
        }
    }
}

fn resolve_pinned(table: &PinnedVersions, names: BTreeSet<String>) -> Result<Resolution, ScaffoldError> {
    let missing: Vec<String> = names
        .iter()
        .filter(|name| !table.contains_key(*name))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(ScaffoldError::MissingPinnedVersions(missing));
    }

    let resolved = names
        .into_iter()
        .map(|name| {
            let version = table[&name].clone();
            (name, version)
        })
        .collect();

    Ok(Resolution {
        resolved,
        failures: BTreeMap::new(),
    })
}

async fn resolve_live(
    registry: &Arc<dyn RegistryLookup>,
    max_in_flight: usize,
    lookup_timeout: Duration,
    names: BTreeSet<String>,
) -> Resolution {
    let permits = Arc::new(Semaphore::new(max_in_flight.max(1)));
    tracing::debug!(count = names.len(), max_in_flight, "querying registry");

    let handles: Vec<(String, JoinHandle<Result<String, LookupError>>)> = names
        .into_iter()
        .map(|name| {
            let registry = Arc::clone(registry);
            let permits = Arc::clone(&permits);
            let task_name = name.clone();
            let handle = tokio::spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| LookupError::Task(e.to_string()))?;
                tokio::time::timeout(lookup_timeout, registry.latest_version(&task_name))
                    .await
                    .unwrap_or_else(|_| Err(LookupError::Timeout(lookup_timeout)))
            });
            (name, handle)
        })
        .collect();

    // Every task is already running; awaiting in order just joins them all.
    let mut resolution = Resolution::default();
    for (name, handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome.and_then(|raw| compatible_range(&raw)),
            Err(e) => Err(LookupError::Task(e.to_string())),
        };
        match outcome {
            Ok(version) => {
                tracing::debug!(dependency = %name, %version, "resolved");
                resolution.resolved.insert(name, version);
            }
            Err(e) => {
                tracing::debug!(dependency = %name, error = %e, "version lookup failed");
                resolution.failures.insert(name, e);
            }
        }
    }
    resolution
}

/// Validate a published version and mark it as a compatible range (`^x.y.z`)
fn compatible_range(raw: &str) -> Result<String, LookupError> {
    let version = parse_version(raw)?;
    Ok(format!("^{}", version))
}

/// Parse version string, tolerating a leading `v`
pub fn parse_version(version_str: &str) -> Result<Version, LookupError> {
    let trimmed = version_str.trim();
    let cleaned = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(cleaned).map_err(|_| LookupError::InvalidVersion(version_str.to_string()))
}
