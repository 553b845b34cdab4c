//! Product configuration trait for CLI binaries
//!
//! This trait defines the interface a scaffolding CLI implements to
//! configure registry access, defaults and post-setup instructions.

use crate::runtime::check::PackageManager;
use std::path::Path;

/// Configuration trait for scaffolding CLI products
///
/// Each product implements this trait to define:
/// - Product identity (name, display name)
/// - Package registry URL
/// - Default project directory
/// - Documentation links
/// - Post-setup instructions
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, env vars)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Default URL of the package registry used for live version lookups
    fn default_registry_url(&self) -> &'static str;

    /// Environment variable name for overriding the registry URL
    fn registry_url_env(&self) -> &'static str;

    /// Directory used when the user does not pick one
    fn default_project_dir(&self) -> &'static str;

    /// URL for product documentation
    fn docs_url(&self) -> &'static str;

    /// Generate the "next steps" instructions after project creation
    fn next_steps(&self, dir: &Path, package_manager: PackageManager) -> Vec<String>;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }
}
