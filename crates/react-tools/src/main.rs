//! react-tools CLI - Project scaffolding for React + Vite

use anyhow::Result;
use clap::{Parser, Subcommand};
use scaffolder_core::compose::resolver::DEFAULT_MAX_IN_FLIGHT;
use scaffolder_core::tui::{CreateArgs, VersionMode};
use scaffolder_core::{Catalog, FailurePolicy, OverwritePolicy, PackageManager, ProductConfig, UiLibrary};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// React + Vite product configuration
#[derive(Clone)]
pub struct ReactConfig;

impl ProductConfig for ReactConfig {
    fn name(&self) -> &'static str {
        "react-tools"
    }

    fn display_name(&self) -> &'static str {
        "React + Vite"
    }

    fn default_registry_url(&self) -> &'static str {
        "https://registry.npmjs.org"
    }

    fn registry_url_env(&self) -> &'static str {
        "NPM_REGISTRY_URL"
    }

    fn default_project_dir(&self) -> &'static str {
        "react-project"
    }

    fn docs_url(&self) -> &'static str {
        "https://vite.dev/guide/"
    }

    fn cli_description(&self) -> &'static str {
        "CLI for scaffolding React + Vite projects"
    }

    fn next_steps(&self, dir: &Path, package_manager: PackageManager) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        // Step 1: cd to directory if not current
        if current.as_deref() != Some(dir) {
            let shown = current
                .as_deref()
                .and_then(|cwd| dir.strip_prefix(cwd).ok())
                .unwrap_or(dir);
            steps.push(format!("cd {}", shown.display()));
        }

        steps.push(package_manager.install_command());
        steps.push(package_manager.run_command("dev"));

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "react-tools")]
#[command(about = "CLI for scaffolding React + Vite projects")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub create: CliCreateArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new React + Vite project (default)
    Create(CliCreateArgs),
    /// List the features in the catalog and their pinned dependencies
    Features(FeaturesArgs),
}

#[derive(Parser, Debug)]
pub struct CliCreateArgs {
    /// Project directory to create
    #[arg(value_name = "DIR")]
    pub dir: Option<String>,

    /// Project directory to create
    #[arg(short, long, conflicts_with = "dir")]
    pub directory: Option<String>,

    /// package.json name (defaults to the directory name)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Use TypeScript
    #[arg(long, conflicts_with = "javascript")]
    pub typescript: bool,

    /// Use JavaScript
    #[arg(long)]
    pub javascript: bool,

    /// Add Tailwind CSS (`--tailwind=false` to leave it out)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub tailwind: Option<bool>,

    /// UI component library
    #[arg(long, value_enum)]
    pub ui: Option<UiLibrary>,

    /// Where dependency versions come from
    #[arg(long, value_enum, default_value_t = VersionMode::Pinned)]
    pub versions: VersionMode,

    /// What to do when a live version lookup fails
    #[arg(long = "on-failure", value_enum, default_value_t = FailurePolicy::Pinned)]
    pub on_failure: FailurePolicy,

    /// What to do when the target directory is not empty
    #[arg(long, value_enum)]
    pub overwrite: Option<OverwritePolicy>,

    /// Feature catalog file to use instead of the built-in one
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Maximum concurrent registry requests for live versions
    #[arg(long, default_value_t = DEFAULT_MAX_IN_FLIGHT)]
    pub concurrency: usize,

    /// Skip formatting with Prettier
    #[arg(long = "skip-format")]
    pub skip_format: bool,

    /// Skip `git init`
    #[arg(long = "skip-git")]
    pub skip_git: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliCreateArgs> for CreateArgs {
    fn from(args: CliCreateArgs) -> Self {
        let typescript = match (args.typescript, args.javascript) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        CreateArgs {
            directory: args.dir.or(args.directory),
            name: args.name,
            typescript,
            tailwind: args.tailwind,
            ui: args.ui,
            versions: args.versions,
            on_failure: args.on_failure,
            overwrite: args.overwrite,
            catalog: args.catalog,
            concurrency: args.concurrency,
            skip_format: args.skip_format,
            skip_git: args.skip_git,
            yes: args.yes,
        }
    }
}

#[derive(Parser, Debug)]
pub struct FeaturesArgs {
    /// Feature catalog file to use instead of the built-in one
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

/// Initialize tracing to stderr so stdout stays clean for prompts
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "react_tools=debug,scaffolder_core=debug"
    } else {
        "react_tools=info,scaffolder_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    init_tracing(args.verbose);
    let config = ReactConfig;

    let create_args = match args.command {
        Some(Command::Features(features_args)) => {
            let catalog = match &features_args.catalog {
                Some(path) => Catalog::load(path)?,
                None => Catalog::embedded()?,
            };
            scaffolder_core::catalog::print_features(&config, &catalog);
            return Ok(());
        }
        Some(Command::Create(create_args)) => create_args,
        // No subcommand provided, default to create behavior
        None => args.create,
    };

    tracing::debug!(?create_args, "starting create");
    let result = scaffolder_core::run(&config, create_args.into()).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}
