//! Charm-style CLI prompts using cliclack

use crate::catalog::Catalog;
use crate::compose::resolver::{DEFAULT_LOOKUP_TIMEOUT, DEFAULT_MAX_IN_FLIGHT};
use crate::compose::{FailurePolicy, VersionResolver, VersionStrategy};
use crate::product::ProductConfig;
use crate::project::{self, OverwritePolicy};
use crate::registry::NpmRegistry;
use crate::runtime::check::{self, PackageManager};
use crate::runtime::tool::ExternalCommand;
use crate::templates::{plan_project, write_project, PlanRequest, ProjectPlan, Selection, UiLibrary};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where dependency versions come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum VersionMode {
    /// Versions pinned in the feature catalog
    #[default]
    Pinned,
    /// Latest published versions from the npm registry
    Live,
}

/// CLI arguments for the create command
#[derive(Debug, Clone)]
pub struct CreateArgs {
    /// Project directory to create
    pub directory: Option<String>,

    /// package.json name
    pub name: Option<String>,

    pub typescript: Option<bool>,
    pub tailwind: Option<bool>,
    pub ui: Option<UiLibrary>,

    pub versions: VersionMode,

    /// Policy for live lookups that fail
    pub on_failure: FailurePolicy,

    /// What to do with a non-empty target directory
    pub overwrite: Option<OverwritePolicy>,

    /// Alternative feature catalog file
    pub catalog: Option<PathBuf>,

    /// Bound on concurrent registry requests
    pub concurrency: usize,

    pub skip_format: bool,
    pub skip_git: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

impl Default for CreateArgs {
    fn default() -> Self {
        Self {
            directory: None,
            name: None,
            typescript: None,
            tailwind: None,
            ui: None,
            versions: VersionMode::default(),
            on_failure: FailurePolicy::default(),
            overwrite: None,
            catalog: None,
            concurrency: DEFAULT_MAX_IN_FLIGHT,
            skip_format: false,
            skip_git: false,
            yes: false,
        }
    }
}

/// Run the CLI with interactive prompts
pub async fn run<C: ProductConfig>(config: &C, args: CreateArgs) -> Result<()> {
    cliclack::intro(config.display_name())?;

    // Step 1: Load the feature catalog
    let catalog = load_catalog(&args)?;

    // Step 2: Select and prepare the target directory
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let target = select_directory(config, &args)?;
    let project_dir = current_dir.join(&target);
    if !prepare_directory(&project_dir, &target, &args)? {
        cliclack::outro_cancel("Operation cancelled")?;
        return Ok(());
    }

    // Step 3: Package name and features
    let name = select_name(&target, &current_dir, &args)?;
    let selection = select_features(&args)?;
    cliclack::log::success(format!("Stack: {}", selection.describe()))?;

    // Step 4: Plan the project
    let resolver = build_resolver(config, &catalog, &args)?;
    let request = PlanRequest {
        name,
        selection,
        failure_policy: args.on_failure,
    };
    let plan = create_plan(&catalog, &request, &resolver).await?;

    // Step 5: Write files
    let spinner = cliclack::spinner();
    spinner.start("Creating project...");
    let written = write_project(&plan, &project_dir).await?;
    spinner.stop(format!(
        "Created {} files in {}",
        written.len(),
        project_dir.display()
    ));

    // Step 6: Format and initialize git
    post_setup(&project_dir, &args).await?;

    // Step 7: Show next steps
    print_next_steps(config, &project_dir)?;

    Ok(())
}

fn load_catalog(args: &CreateArgs) -> Result<Catalog> {
    match &args.catalog {
        Some(path) => {
            cliclack::log::info(format!("Using feature catalog from {}", path.display()))?;
            Catalog::load(path).with_context(|| format!("Invalid feature catalog: {}", path.display()))
        }
        None => Catalog::embedded().context("Embedded feature catalog is invalid"),
    }
}

fn select_directory<C: ProductConfig>(config: &C, args: &CreateArgs) -> Result<String> {
    let default_dir = config.default_project_dir();

    let raw = if let Some(dir) = &args.directory {
        dir.clone()
    } else if args.yes {
        default_dir.to_string()
    } else {
        cliclack::input("Project directory")
            .placeholder(default_dir)
            .default_input(default_dir)
            .interact()?
    };

    let target = project::format_target_dir(&raw);
    let target = if target.is_empty() {
        default_dir.to_string()
    } else {
        target
    };
    cliclack::log::info(format!("Using directory: {}", target))?;
    Ok(target)
}

/// Returns `false` when the user cancelled
fn prepare_directory(project_dir: &Path, target: &str, args: &CreateArgs) -> Result<bool> {
    if let Some(parent) = project_dir.parent() {
        if !parent.exists() {
            anyhow::bail!("Parent directory does not exist: {}", parent.display());
        }
    }

    if !project_dir.exists() || project::is_empty_dir(project_dir)? {
        return Ok(true);
    }

    let policy = match args.overwrite {
        Some(policy) => policy,
        None if args.yes => OverwritePolicy::Ignore,
        None => {
            let label = if target == "." {
                "Current directory".to_string()
            } else {
                format!("Target directory \"{}\"", target)
            };
            let mut select =
                cliclack::select(format!("{} is not empty. Please choose how to proceed", label));
            for policy in [
                OverwritePolicy::Remove,
                OverwritePolicy::Cancel,
                OverwritePolicy::Ignore,
            ] {
                select = select.item(policy, policy.display_name(), "");
            }
            select.interact()?
        }
    };

    if policy == OverwritePolicy::Remove {
        cliclack::log::warning(format!("Removing existing files in {}", project_dir.display()))?;
    }
    project::prepare_target_dir(project_dir, policy)
}

fn select_name(target: &str, current_dir: &Path, args: &CreateArgs) -> Result<String> {
    let name = args
        .name
        .clone()
        .unwrap_or_else(|| project::project_name_for(target, current_dir));

    if project::is_valid_package_name(&name) {
        return Ok(name);
    }

    let suggested = project::to_valid_package_name(&name);
    if args.yes || args.name.is_some() {
        if !project::is_valid_package_name(&suggested) {
            anyhow::bail!("Invalid package.json name: {}", name);
        }
        cliclack::log::info(format!("Using package name: {}", suggested))?;
        return Ok(suggested);
    }

    let input: String = cliclack::input("Package name")
        .default_input(&suggested)
        .validate(|input: &String| {
            if project::is_valid_package_name(input) {
                Ok(())
            } else {
                Err("Invalid package.json name")
            }
        })
        .interact()?;
    Ok(input)
}

fn select_features(args: &CreateArgs) -> Result<Selection> {
    let defaults = Selection::default();

    let typescript = match args.typescript {
        Some(value) => value,
        None if args.yes => defaults.typescript,
        None => cliclack::confirm("Do you want to use TypeScript?")
            .initial_value(defaults.typescript)
            .interact()?,
    };

    let ui = match args.ui {
        Some(value) => value,
        None if args.yes => defaults.ui,
        None => cliclack::select("Select a UI library")
            .item(UiLibrary::None, UiLibrary::None.display_name(), "")
            .item(UiLibrary::Mui, UiLibrary::Mui.display_name(), "Material UI components")
            .initial_value(defaults.ui)
            .interact()?,
    };

    let tailwind = match args.tailwind {
        Some(value) => value,
        None if args.yes => defaults.tailwind,
        None => cliclack::confirm("Do you want to use Tailwind CSS?")
            .initial_value(defaults.tailwind)
            .interact()?,
    };

    Ok(Selection {
        typescript,
        tailwind,
        ui,
    })
}

fn build_resolver<C: ProductConfig>(
    config: &C,
    catalog: &Catalog,
    args: &CreateArgs,
) -> Result<VersionResolver> {
    let strategy = match args.versions {
        VersionMode::Pinned => VersionStrategy::Pinned(catalog.versions.clone()),
        VersionMode::Live => {
            let registry = NpmRegistry::from_config(config)?;
            cliclack::log::info(format!("Using registry {}", registry.base_url()))?;
            VersionStrategy::Live {
                registry: Arc::new(registry),
                max_in_flight: args.concurrency.max(1),
                lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            }
        }
    };
    Ok(VersionResolver::new(strategy))
}

async fn create_plan(
    catalog: &Catalog,
    request: &PlanRequest,
    resolver: &VersionResolver,
) -> Result<ProjectPlan> {
    let spinner = cliclack::spinner();
    spinner.start("Resolving dependency versions...");

    let plan = match plan_project(catalog, request, resolver).await {
        Ok(plan) => plan,
        Err(e) => {
            spinner.error("Failed to plan project");
            return Err(e);
        }
    };

    spinner.stop(format!(
        "Resolved {} dependencies",
        plan.manifest.dependencies.len() + plan.manifest.dev_dependencies.len()
    ));

    for (name, error) in &plan.lookup_failures {
        cliclack::log::warning(format!("{}: {} (using pinned version)", name, error))?;
    }

    Ok(plan)
}

async fn post_setup(project_dir: &Path, args: &CreateArgs) -> Result<()> {
    if !args.skip_format {
        let npx = check::check_npx();
        if npx.available {
            let cmd = ExternalCommand::prettier(project_dir);
            let spinner = cliclack::spinner();
            spinner.start("Formatting with Prettier...");
            match cmd.run(project_dir).await {
                Ok(()) => spinner.stop("Formatted project files"),
                Err(e) => {
                    spinner.error("Formatting failed");
                    cliclack::log::warning(format!("{}", e))?;
                }
            }
        } else {
            cliclack::log::warning(format!("Skipping formatting: {}", npx.describe()))?;
        }
    }

    if !args.skip_git {
        let git = check::check_git();
        if project_dir.join(".git").exists() {
            cliclack::log::info("Git repository already present")?;
        } else if git.available {
            match ExternalCommand::git_init().run(project_dir).await {
                Ok(()) => cliclack::log::success("Initialized git repository")?,
                Err(e) => cliclack::log::warning(format!("{}", e))?,
            }
        } else {
            cliclack::log::warning(format!("Skipping git init: {}", git.describe()))?;
        }
    }

    Ok(())
}

fn print_next_steps<C: ProductConfig>(config: &C, project_dir: &Path) -> Result<()> {
    let steps = config.next_steps(project_dir, PackageManager::detect());

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    cliclack::outro(format!("Docs: {}", config.docs_url()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_args_default() {
        let args = CreateArgs::default();
        assert_eq!(args.versions, VersionMode::Pinned);
        assert_eq!(args.on_failure, FailurePolicy::Pinned);
        assert_eq!(args.concurrency, DEFAULT_MAX_IN_FLIGHT);
        assert!(args.overwrite.is_none());
        assert!(!args.yes);
    }

    #[test]
    fn test_features_from_flags_skip_prompts() {
        let args = CreateArgs {
            typescript: Some(false),
            tailwind: Some(true),
            ui: Some(UiLibrary::Mui),
            ..CreateArgs::default()
        };
        let selection = select_features(&args).unwrap();
        assert_eq!(
            selection,
            Selection {
                typescript: false,
                tailwind: true,
                ui: UiLibrary::Mui,
            }
        );
    }

    #[test]
    fn test_yes_uses_default_selection() {
        let args = CreateArgs {
            yes: true,
            ..CreateArgs::default()
        };
        assert_eq!(select_features(&args).unwrap(), Selection::default());
    }
}
