//! Tool detection for Node.js, npx and git, and package manager detection

use std::fmt;
use std::process::Command;

/// Environment variable npm-compatible package managers set for child processes
pub const USER_AGENT_ENV: &str = "npm_config_user_agent";

/// Package manager used in the "next steps" instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

impl PackageManager {
    pub fn name(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun",
        }
    }

    /// Parse a user agent such as `pnpm/9.1.0 npm/? node/v20.11.0 linux x64`.
    /// Unknown or missing agents fall back to npm.
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        let spec = user_agent
            .and_then(|ua| ua.split_whitespace().next())
            .unwrap_or_default();
        match spec.split('/').next().unwrap_or_default() {
            "pnpm" => PackageManager::Pnpm,
            "yarn" => PackageManager::Yarn,
            "bun" => PackageManager::Bun,
            _ => PackageManager::Npm,
        }
    }

    /// Detect the package manager that launched this process
    pub fn detect() -> Self {
        Self::from_user_agent(std::env::var(USER_AGENT_ENV).ok().as_deref())
    }

    pub fn install_command(&self) -> String {
        format!("{} install", self.name())
    }

    /// `yarn dev`, `npm run dev`, ...
    pub fn run_command(&self, script: &str) -> String {
        match self {
            PackageManager::Yarn => format!("yarn {}", script),
            _ => format!("{} run {}", self.name(), script),
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Tool detection result
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    pub name: &'static str,
    pub version: Option<String>,
    pub available: bool,
}

impl RuntimeInfo {
    /// "Node.js (v20.11.0)" or "git (not installed)"
    pub fn describe(&self) -> String {
        if self.available {
            format!("{} ({})", self.name, self.version.as_deref().unwrap_or("unknown"))
        } else {
            format!("{} (not installed)", self.name)
        }
    }
}

fn check_tool(name: &'static str, program: &str) -> RuntimeInfo {
    let output = Command::new(program).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            RuntimeInfo {
                name,
                version: Some(version),
                available: true,
            }
        }
        _ => RuntimeInfo {
            name,
            version: None,
            available: false,
        },
    }
}

/// Check if Node.js is available
pub fn check_node() -> RuntimeInfo {
    check_tool("Node.js", "node")
}

/// Check if npx is available (needed to run Prettier)
pub fn check_npx() -> RuntimeInfo {
    check_tool("npx", "npx")
}

/// Check if git is available
pub fn check_git() -> RuntimeInfo {
    check_tool("git", "git")
}

/// Report every tool post-setup may use. Missing tools are not an error.
pub fn check_tools() -> Vec<RuntimeInfo> {
    vec![check_node(), check_npx(), check_git()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_manager_from_user_agent() {
        assert_eq!(
            PackageManager::from_user_agent(Some("pnpm/9.1.0 npm/? node/v20.11.0 linux x64")),
            PackageManager::Pnpm
        );
        assert_eq!(
            PackageManager::from_user_agent(Some("yarn/1.22.19 npm/? node/v18.0.0 darwin arm64")),
            PackageManager::Yarn
        );
        assert_eq!(
            PackageManager::from_user_agent(Some("bun/1.1.0 npm/? node/v21.6.0 linux x64")),
            PackageManager::Bun
        );
        assert_eq!(
            PackageManager::from_user_agent(Some("npm/10.2.0 node/v20.11.0 linux x64")),
            PackageManager::Npm
        );
        assert_eq!(PackageManager::from_user_agent(Some("")), PackageManager::Npm);
        assert_eq!(PackageManager::from_user_agent(None), PackageManager::Npm);
    }

    #[test]
    fn test_package_manager_commands() {
        assert_eq!(PackageManager::Npm.install_command(), "npm install");
        assert_eq!(PackageManager::Npm.run_command("dev"), "npm run dev");
        assert_eq!(PackageManager::Yarn.run_command("dev"), "yarn dev");
        assert_eq!(PackageManager::Bun.run_command("dev"), "bun run dev");
        assert_eq!(PackageManager::Pnpm.to_string(), "pnpm");
    }

    #[test]
    fn test_missing_tool_is_reported_unavailable() {
        let info = check_tool("ghost", "definitely-not-a-real-binary-xyz");
        assert!(!info.available);
        assert!(info.version.is_none());
        assert_eq!(info.describe(), "ghost (not installed)");
    }
}
