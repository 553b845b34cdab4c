//! Writing a planned project to disk

use crate::templates::planner::ProjectPlan;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// Write every file of `plan` below `target_dir`, returning the relative
/// paths written
pub async fn write_project(plan: &ProjectPlan, target_dir: &Path) -> Result<Vec<String>> {
    // Ensure target directory exists
    fs::create_dir_all(target_dir)
        .await
        .context("Failed to create target directory")?;

    let mut written = Vec::with_capacity(plan.files.len());

    for (relative, content) in &plan.files {
        let target_path = target_dir.join(relative);
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::write(&target_path, content)
            .await
            .with_context(|| format!("Failed to write file: {}", target_path.display()))?;

        written.push(relative.clone());
    }

    tracing::debug!(dir = %target_dir.display(), files = written.len(), "wrote project");
    Ok(written)
}
