//! Tool detection and post-setup commands
//!
//! This module provides:
//! - Detection of Node.js, npx and git
//! - Package manager detection for the "next steps" instructions
//! - Prettier and `git init` invocations with timeouts

pub mod check;
pub mod tool;

pub use check::{check_git, check_node, check_npx, check_tools, PackageManager, RuntimeInfo};
pub use tool::ExternalCommand;
