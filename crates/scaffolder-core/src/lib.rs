//! Scaffolder Core - Feature composition engine for React + Vite projects
//!
//! This library turns a small set of orthogonal feature choices (TypeScript,
//! Tailwind CSS, MUI) into a ready-to-build project skeleton. It is designed
//! to be driven by a thin CLI binary that supplies a [`ProductConfig`].
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Composition Engine** - Fragment merging, `~~key~~` markers, alias tables, version resolution
//! - **Layer 2: Project Workflow** - Feature catalog, planning, writing, post-setup commands
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use scaffolder_core::{Catalog, VersionResolver, templates};
//!
//! let catalog = Catalog::embedded()?;
//! let resolver = VersionResolver::pinned(catalog.versions.clone());
//! let request = templates::PlanRequest {
//!     name: "my-app".to_string(),
//!     selection: templates::Selection::default(),
//!     failure_policy: Default::default(),
//! };
//! let plan = templates::plan_project(&catalog, &request, &resolver).await?;
//! templates::write_project(&plan, Path::new("my-app")).await?;
//! ```

pub mod catalog;
pub mod compose;
pub mod error;
pub mod product;
pub mod project;
pub mod registry;
pub mod runtime;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use catalog::Catalog;
pub use compose::{
    FailurePolicy, Feature, FeatureFragment, ManifestAccumulator, RegistryLookup, VersionResolver,
    VersionStrategy,
};
pub use error::{LookupError, ScaffoldError};
pub use product::ProductConfig;
pub use project::OverwritePolicy;
pub use registry::NpmRegistry;
pub use runtime::{PackageManager, RuntimeInfo};
pub use templates::{plan_project, write_project, PlanRequest, ProjectPlan, Selection, UiLibrary};

#[cfg(feature = "tui")]
pub use tui::run;
