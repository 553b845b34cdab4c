//! Feature composition engine
//!
//! This module provides:
//! - Fragment merging into a per-run manifest accumulator
//! - `~~key~~` marker substitution and cleanup for template text
//! - Alias table rendering for the bundler and the compiler
//! - Dependency version resolution (pinned table or live registry)

pub mod accumulator;
pub mod alias;
pub mod fragment;
pub mod marker;
pub mod ordered_set;
pub mod resolver;

pub use accumulator::{ManifestAccumulator, PackageManifest, TemplateContributions};
pub use alias::{AliasEntry, AliasTable, CompilerPaths};
pub use fragment::{merge_rules, Feature, FeatureFragment, RuleSet, RuleValue};
pub use marker::{cleanup, markers, render, substitute, PlaceholderMap};
pub use ordered_set::OrderedSet;
pub use resolver::{
    FailurePolicy, PinnedVersions, RegistryLookup, Resolution, VersionResolver, VersionStrategy,
};
