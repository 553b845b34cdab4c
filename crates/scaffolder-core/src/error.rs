//! Error types for the composition engine

use crate::compose::Feature;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration errors. Any of these aborts a generation run before
/// output is produced.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("unknown feature '{0}'")]
    UnknownFeature(String),

    #[error("feature '{0}' has already been applied")]
    AlreadyApplied(Feature),

    #[error("no pinned version declared for: {}", .0.join(", "))]
    MissingPinnedVersions(Vec<String>),

    #[error("version lookup failed for: {}", .0.join(", "))]
    UnresolvedDependencies(Vec<String>),

    #[error("dependency '{0}' has no resolved version")]
    Unversioned(String),

    #[error("failed to read feature catalog {}: {source}", path.display())]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse feature catalog: {0}")]
    CatalogParse(#[from] serde_yaml::Error),

    #[error("malformed fragment for feature '{feature}': {reason}")]
    MalformedFragment { feature: Feature, reason: String },

    #[error("features '{first}' and '{second}' set conflicting values for lint rule '{rule}'")]
    ConflictingRule {
        rule: String,
        first: Feature,
        second: Feature,
    },

    #[error("features '{first}' and '{second}' both set {kind} '{key}'")]
    ConflictingContribution {
        kind: &'static str,
        key: String,
        first: Feature,
        second: Feature,
    },
}

/// Failure of a single registry lookup. Reported per dependency and never
/// aborts sibling lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("registry returned HTTP {0}")]
    Status(u16),

    #[error("malformed registry response: {0}")]
    Malformed(String),

    #[error("'{0}' is not a semantic version")]
    InvalidVersion(String),

    #[error("lookup timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("lookup task failed: {0}")]
    Task(String),
}
