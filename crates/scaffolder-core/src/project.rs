//! Project naming and target directory handling

use anyhow::{Context, Result};
use std::path::Path;

/// What to do when the target directory already has files in it
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OverwritePolicy {
    /// Remove existing files (except `.git`) and continue
    Remove,
    /// Leave existing files alone and write over them
    Ignore,
    /// Stop without touching anything
    Cancel,
}

impl OverwritePolicy {
    pub fn display_name(&self) -> &'static str {
        match self {
            OverwritePolicy::Remove => "Remove existing files and continue",
            OverwritePolicy::Ignore => "Ignore files and continue",
            OverwritePolicy::Cancel => "Cancel operation",
        }
    }
}

/// Trim whitespace and trailing slashes from a user supplied directory
pub fn format_target_dir(target_dir: &str) -> String {
    target_dir.trim().trim_end_matches('/').to_string()
}

/// Check a package.json `name`: optional `@scope/`, then lowercase URL-safe
/// characters not starting with `.` or `_`
pub fn is_valid_package_name(name: &str) -> bool {
    let (scope, bare) = match name.strip_prefix('@') {
        Some(rest) => match rest.split_once('/') {
            Some((scope, bare)) => (Some(scope), bare),
            None => return false,
        },
        None => (None, name),
    };

    if let Some(scope) = scope {
        if !is_valid_segment(scope, |c| c == '*') {
            return false;
        }
    }
    is_valid_segment(bare, |_| false)
}

fn is_valid_segment(segment: &str, extra: impl Fn(char) -> bool) -> bool {
    let allowed = |c: char| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '~') || extra(c)
    };
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if allowed(first) => chars.all(|c| allowed(c) || matches!(c, '.' | '_')),
        _ => false,
    }
}

/// Best-effort conversion of a directory name into a valid package name
pub fn to_valid_package_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let dashed = lowered.split_whitespace().collect::<Vec<_>>().join("-");
    let stripped = dashed
        .strip_prefix(['.', '_'])
        .unwrap_or(&dashed);

    let mut out = String::with_capacity(stripped.len());
    let mut in_invalid_run = false;
    for c in stripped.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '~') {
            out.push(c);
            in_invalid_run = false;
        } else if !in_invalid_run {
            out.push('-');
            in_invalid_run = true;
        }
    }
    out
}

/// Default package name for a target directory: the directory as typed,
/// or the current directory's own name for `.`. The result may still need
/// [`to_valid_package_name`], e.g. `apps/admin` becomes `apps-admin`.
pub fn project_name_for(target_dir: &str, current_dir: &Path) -> String {
    if target_dir == "." {
        current_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| target_dir.to_string())
    } else {
        target_dir.to_string()
    }
}

/// A directory is empty when it has no entries or only `.git`
pub fn is_empty_dir(path: &Path) -> Result<bool> {
    let entries = std::fs::read_dir(path)
        .with_context(|| format!("Failed to read directory: {}", path.display()))?;
    for entry in entries {
        let entry = entry?;
        if entry.file_name() != ".git" {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Remove everything in `dir` except `.git`. A missing directory is fine.
pub fn empty_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        if entry.file_name() == ".git" {
            continue;
        }
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        }
        .with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Apply the overwrite policy to `dir` before writing. Returns `false`
/// when the run should stop.
pub fn prepare_target_dir(dir: &Path, policy: OverwritePolicy) -> Result<bool> {
    if !dir.exists() || is_empty_dir(dir)? {
        return Ok(true);
    }
    match policy {
        OverwritePolicy::Remove => {
            tracing::debug!(dir = %dir.display(), "emptying target directory");
            empty_dir(dir)?;
            Ok(true)
        }
        OverwritePolicy::Ignore => Ok(true),
        OverwritePolicy::Cancel => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_target_dir() {
        assert_eq!(format_target_dir("  my-app/ "), "my-app");
        assert_eq!(format_target_dir("nested/app//"), "nested/app");
        assert_eq!(format_target_dir("."), ".");
    }

    #[test]
    fn test_is_valid_package_name() {
        assert!(is_valid_package_name("my-app"));
        assert!(is_valid_package_name("app.v2_final"));
        assert!(is_valid_package_name("@acme/ui-kit"));
        assert!(is_valid_package_name("~tilde"));

        assert!(!is_valid_package_name("My-App"));
        assert!(!is_valid_package_name(".hidden"));
        assert!(!is_valid_package_name("_private"));
        assert!(!is_valid_package_name("has space"));
        assert!(!is_valid_package_name("@scope-only"));
        assert!(!is_valid_package_name(""));
    }

    #[test]
    fn test_to_valid_package_name() {
        assert_eq!(to_valid_package_name("  My Cool App "), "my-cool-app");
        assert_eq!(to_valid_package_name(".dotfile"), "dotfile");
        assert_eq!(to_valid_package_name("hello@world!!x"), "hello-world-x");
        assert!(is_valid_package_name(&to_valid_package_name("Some Project")));
    }

    #[test]
    fn test_project_name_for() {
        let cwd = Path::new("/home/dev/shop-front");
        assert_eq!(project_name_for(".", cwd), "shop-front");
        assert_eq!(project_name_for("web", cwd), "web");
        assert_eq!(project_name_for("apps/admin", cwd), "apps/admin");
    }

    #[test]
    fn test_nested_target_dir_becomes_dashed_package_name() {
        let cwd = Path::new("/home/dev");
        let name = project_name_for("apps/admin", cwd);
        assert!(!is_valid_package_name(&name));
        assert_eq!(to_valid_package_name(&name), "apps-admin");
        assert_eq!(to_valid_package_name(&project_name_for("Web App", cwd)), "web-app");
    }

    #[test]
    fn test_is_empty_dir_ignores_git() {
        let temp = tempfile::tempdir().unwrap();
        assert!(is_empty_dir(temp.path()).unwrap());

        std::fs::create_dir(temp.path().join(".git")).unwrap();
        assert!(is_empty_dir(temp.path()).unwrap());

        std::fs::write(temp.path().join("index.html"), "").unwrap();
        assert!(!is_empty_dir(temp.path()).unwrap());
    }

    #[test]
    fn test_empty_dir_keeps_git() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join(".git/objects")).unwrap();
        std::fs::create_dir_all(temp.path().join("src/components")).unwrap();
        std::fs::write(temp.path().join("package.json"), "{}").unwrap();

        empty_dir(temp.path()).unwrap();

        assert!(temp.path().join(".git/objects").is_dir());
        assert!(!temp.path().join("src").exists());
        assert!(!temp.path().join("package.json").exists());
        assert!(empty_dir(&temp.path().join("missing")).is_ok());
    }

    #[test]
    fn test_prepare_target_dir_policies() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("old.txt"), "x").unwrap();

        assert!(!prepare_target_dir(temp.path(), OverwritePolicy::Cancel).unwrap());
        assert!(temp.path().join("old.txt").exists());

        assert!(prepare_target_dir(temp.path(), OverwritePolicy::Ignore).unwrap());
        assert!(temp.path().join("old.txt").exists());

        assert!(prepare_target_dir(temp.path(), OverwritePolicy::Remove).unwrap());
        assert!(!temp.path().join("old.txt").exists());

        assert!(prepare_target_dir(&temp.path().join("fresh"), OverwritePolicy::Cancel).unwrap());
    }
}
