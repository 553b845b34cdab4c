//! Project planning: compose features into a full set of rendered files
//!
//! Planning is pure apart from registry lookups: it returns every file of the
//! project as text and never touches the filesystem.

use super::texts;
use crate::catalog::Catalog;
use crate::compose::{
    render, FailurePolicy, Feature, ManifestAccumulator, PackageManifest, PlaceholderMap, RuleSet,
    TemplateContributions, VersionResolver,
};
use crate::error::LookupError;
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// UI component library choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum UiLibrary {
    #[default]
    None,
    Mui,
}

impl UiLibrary {
    pub fn display_name(&self) -> &'static str {
        match self {
            UiLibrary::None => "None",
            UiLibrary::Mui => "MUI",
        }
    }
}

/// The user's feature choices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub typescript: bool,
    pub tailwind: bool,
    pub ui: UiLibrary,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            typescript: true,
            tailwind: true,
            ui: UiLibrary::None,
        }
    }
}

impl Selection {
    /// Selected features in canonical order, `common` first
    pub fn features(&self) -> Vec<Feature> {
        let mut features = vec![Feature::Common];
        if self.typescript {
            features.push(Feature::TypeScript);
        }
        if self.ui == UiLibrary::Mui {
            features.push(Feature::Mui);
        }
        if self.tailwind {
            features.push(Feature::Tailwind);
        }
        features
    }

    /// Human-readable stack summary, e.g. "React + Vite, TypeScript, MUI"
    pub fn describe(&self) -> String {
        let mut parts: Vec<&str> = self.features().iter().map(|f| f.display_name()).collect();
        if !self.typescript {
            parts.insert(1, "JavaScript");
        }
        parts.join(", ")
    }
}

/// Inputs for one generation run
#[derive(Debug, Clone)]
pub struct PlanRequest {
    /// package.json name
    pub name: String,
    pub selection: Selection,
    /// What to do with names whose live lookup failed
    pub failure_policy: FailurePolicy,
}

/// Fully rendered project, ready to be written
#[derive(Debug, Clone)]
pub struct ProjectPlan {
    pub name: String,
    pub selection: Selection,
    /// Relative path -> file contents
    pub files: BTreeMap<String, String>,
    pub manifest: PackageManifest,
    /// Live lookups that failed and were settled by the failure policy
    pub lookup_failures: BTreeMap<String, LookupError>,
}

/// Compose the selected features into a [`ProjectPlan`]
pub async fn plan_project(
    catalog: &Catalog,
    request: &PlanRequest,
    resolver: &VersionResolver,
) -> Result<ProjectPlan> {
    let features = request.selection.features();

    let mut accumulator = ManifestAccumulator::new(&request.name);
    let mut contributions = TemplateContributions::new();
    for &feature in &features {
        let fragment = catalog.effective_fragment(feature, &features)?;
        accumulator.merge(feature, &fragment)?;
        contributions.absorb(feature, &fragment);
    }

    let resolution = resolver.resolve(accumulator.dependency_names()).await?;
    let lookup_failures = resolution.failures.clone();
    let versions = resolution.settle(request.failure_policy, &catalog.versions)?;
    let manifest = accumulator.finalize(&versions)?;

    let placeholders = build_placeholders(catalog, request, &contributions, &manifest.lint_rules)?;
    let script_ext = extension(&placeholders, "script-extension", "js");
    let component_ext = extension(&placeholders, "component-extension", "jsx");

    let mut files = BTreeMap::new();
    let mut add = |path: String, template: &str| {
        files.insert(path, render(template, &placeholders));
    };
    add(format!("src/main.{}", component_ext), texts::MAIN);
    add(format!("src/App.{}", component_ext), texts::APP);
    add(format!("vite.config.{}", script_ext), texts::VITE_CONFIG);
    add(
        "eslint.config.js".to_string(),
        if request.selection.typescript {
            texts::ESLINT_TS
        } else {
            texts::ESLINT_JS
        },
    );
    add("index.html".to_string(), texts::INDEX_HTML);
    add(".prettierrc".to_string(), texts::PRETTIERRC);
    add(".gitignore".to_string(), texts::GITIGNORE);
    add("README.md".to_string(), texts::README);

    for (path, content) in contributions.files() {
        files.insert(render(&path, &placeholders), render(&content, &placeholders));
    }

    files.insert(
        "src/index.css".to_string(),
        format!(
            "{}{}",
            contributions.stylesheet_prelude(),
            render(texts::INDEX_CSS, &placeholders)
        ),
    );
    files.insert("package.json".to_string(), to_json(&manifest)?);

    let paths = Value::Object(catalog.aliases.to_compiler_paths());
    if request.selection.typescript {
        files.insert("tsconfig.json".to_string(), reformat_json(texts::TSCONFIG)?);
        files.insert("tsconfig.app.json".to_string(), tsconfig_app(paths)?);
        files.insert("tsconfig.node.json".to_string(), reformat_json(texts::TSCONFIG_NODE)?);
    } else {
        files.insert(
            "jsconfig.json".to_string(),
            to_json(&json!({ "compilerOptions": { "paths": paths } }))?,
        );
    }

    tracing::debug!(
        name = %request.name,
        files = files.len(),
        dependencies = manifest.dependencies.len(),
        dev_dependencies = manifest.dev_dependencies.len(),
        "planned project"
    );

    Ok(ProjectPlan {
        name: request.name.clone(),
        selection: request.selection,
        files,
        manifest,
        lookup_failures,
    })
}

fn build_placeholders(
    catalog: &Catalog,
    request: &PlanRequest,
    contributions: &TemplateContributions,
    lint_rules: &RuleSet,
) -> Result<PlaceholderMap> {
    let mut placeholders = contributions.placeholders();
    placeholders.insert("project-name".to_string(), request.name.clone());
    placeholders.insert("stack".to_string(), request.selection.describe());
    placeholders.insert(
        "vite-imports".to_string(),
        contributions.build_imports().join("\n"),
    );
    placeholders.insert(
        "vite-plugins".to_string(),
        contributions.build_plugins().join(", "),
    );
    placeholders.insert(
        "vite-resolve-alias".to_string(),
        catalog.aliases.to_build_tool_block(),
    );
    placeholders.insert("eslint-rules".to_string(), render_lint_rules(lint_rules)?);
    Ok(placeholders)
}

fn extension(placeholders: &PlaceholderMap, key: &str, fallback: &str) -> String {
    placeholders
        .get(key)
        .cloned()
        .unwrap_or_else(|| fallback.to_string())
}

/// Render rules as `"name": value,` lines for the body of an ESLint
/// `rules: { ... }` object
fn render_lint_rules(rules: &RuleSet) -> Result<String> {
    let lines = rules
        .iter()
        .map(|(name, value)| -> Result<String> {
            Ok(format!(
                "{}: {},",
                serde_json::to_string(name)?,
                serde_json::to_string(value)?
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(lines.join("\n      "))
}

fn tsconfig_app(paths: Value) -> Result<String> {
    let mut config: Value =
        serde_json::from_str(texts::TSCONFIG_APP).context("Failed to parse tsconfig.app.json template")?;
    config
        .get_mut("compilerOptions")
        .and_then(Value::as_object_mut)
        .context("tsconfig.app.json template has no compilerOptions")?
        .insert("paths".to_string(), paths);
    to_json(&config)
}

fn reformat_json(text: &str) -> Result<String> {
    let value: Value = serde_json::from_str(text).context("Failed to parse JSON template")?;
    to_json(&value)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{markers, RegistryLookup, VersionStrategy};
    use async_trait::async_trait;
    use std::sync::Arc;

    fn request(selection: Selection) -> PlanRequest {
        PlanRequest {
            name: "playground".to_string(),
            selection,
            failure_policy: FailurePolicy::Abort,
        }
    }

    async fn plan(selection: Selection) -> ProjectPlan {
        let catalog = Catalog::embedded().unwrap();
        let resolver = VersionResolver::pinned(catalog.versions.clone());
        plan_project(&catalog, &request(selection), &resolver).await.unwrap()
    }

    #[tokio::test]
    async fn test_javascript_project_files() {
        let plan = plan(Selection {
            typescript: false,
            tailwind: false,
            ui: UiLibrary::None,
        })
        .await;

        for path in [
            "src/main.jsx",
            "src/App.jsx",
            "vite.config.js",
            "eslint.config.js",
            "jsconfig.json",
            "package.json",
        ] {
            assert!(plan.files.contains_key(path), "missing {}", path);
        }
        assert!(!plan.files.contains_key("tsconfig.json"));
        assert!(!plan.files.keys().any(|p| p.starts_with("src/theme")));

        let main = &plan.files["src/main.jsx"];
        assert!(main.contains("getElementById('root'))"));
        assert!(!main.contains("ThemeProvider"));
        assert!(plan.files["index.html"].contains("/src/main.jsx"));
        assert!(plan.files[".prettierrc"].contains("\"plugins\": []"));
    }

    #[tokio::test]
    async fn test_no_markers_survive_rendering() {
        for typescript in [false, true] {
            for tailwind in [false, true] {
                for ui in [UiLibrary::None, UiLibrary::Mui] {
                    let plan = plan(Selection { typescript, tailwind, ui }).await;
                    for (path, content) in &plan.files {
                        assert!(markers(path).next().is_none(), "marker in path {}", path);
                        assert!(
                            markers(content).next().is_none(),
                            "marker left in {}",
                            path
                        );
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn test_typescript_mui_tailwind_project() {
        let plan = plan(Selection {
            typescript: true,
            tailwind: true,
            ui: UiLibrary::Mui,
        })
        .await;

        let main = &plan.files["src/main.tsx"];
        assert!(main.contains("getElementById('root')!)"));
        assert!(main.contains("<StyledEngineProvider enableCssLayer>"));
        assert!(main.contains("<ThemeProvider theme={theme}>"));
        assert!(plan.files.contains_key("src/theme.ts"));
        assert!(plan.files.contains_key("src/vite-env.d.ts"));
        assert!(plan.files.contains_key("vite.config.ts"));

        let css = &plan.files["src/index.css"];
        let layer = css.find("@layer theme").unwrap();
        let import = css.find("@import 'tailwindcss'").unwrap();
        assert!(layer < import);

        let vite = &plan.files["vite.config.ts"];
        assert!(vite.contains("import tailwindcss from '@tailwindcss/vite';"));
        assert!(vite.contains("plugins: [react(), tailwindcss()]"));
        assert!(vite.contains("\"@components\": path.resolve(__dirname, './src/components'),"));

        let eslint = &plan.files["eslint.config.js"];
        assert!(eslint.contains("tseslint.config("));
        assert!(eslint.contains("\"no-restricted-imports\": [\"error\",\"@mui/*/*/*\"],"));

        assert_eq!(plan.manifest.scripts["build"], "tsc -b && vite build");
        assert_eq!(plan.manifest.dependencies["@mui/material"], "^7.1.0");
        assert!(plan.manifest.dev_dependencies.contains_key("typescript"));
    }

    #[tokio::test]
    async fn test_compiler_paths_match_aliases() {
        let plan = plan(Selection::default()).await;
        let tsconfig: Value = serde_json::from_str(&plan.files["tsconfig.app.json"]).unwrap();
        assert_eq!(
            tsconfig["compilerOptions"]["paths"]["@components/*"],
            json!(["./src/components/*"])
        );
        assert_eq!(tsconfig["compilerOptions"]["strict"], json!(true));
    }

    #[tokio::test]
    async fn test_compiler_paths_follow_catalog_alias_order() {
        let catalog = Catalog::embedded().unwrap();
        let expected: Vec<String> = catalog
            .aliases
            .entries()
            .iter()
            .map(|e| format!("{}/*", e.name))
            .collect();

        for typescript in [true, false] {
            let plan = plan(Selection {
                typescript,
                ..Selection::default()
            })
            .await;
            let file = if typescript { "tsconfig.app.json" } else { "jsconfig.json" };
            let config: Value = serde_json::from_str(&plan.files[file]).unwrap();
            let keys: Vec<String> = config["compilerOptions"]["paths"]
                .as_object()
                .unwrap()
                .keys()
                .cloned()
                .collect();
            assert_eq!(keys, expected, "alias order in {}", file);
        }
    }

    #[tokio::test]
    async fn test_package_json_lists_every_dependency() {
        let plan = plan(Selection::default()).await;
        let package: Value = serde_json::from_str(&plan.files["package.json"]).unwrap();
        assert_eq!(package["name"], "playground");
        assert_eq!(package["dependencies"]["tailwindcss"], "^4.1.7");
        assert_eq!(package["devDependencies"]["typescript"], "~5.8.3");
        assert!(package["dependencies"].get("@mui/material").is_none());
    }

    struct DownRegistry;

    #[async_trait]
    impl RegistryLookup for DownRegistry {
        async fn latest_version(&self, _name: &str) -> Result<String, LookupError> {
            Err(LookupError::Transport("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_live_failures_follow_policy() {
        let catalog = Catalog::embedded().unwrap();
        let resolver = VersionResolver::new(VersionStrategy::live(Arc::new(DownRegistry)));

        let mut req = request(Selection::default());
        assert!(plan_project(&catalog, &req, &resolver).await.is_err());

        req.failure_policy = FailurePolicy::Pinned;
        let plan = plan_project(&catalog, &req, &resolver).await.unwrap();
        assert_eq!(plan.manifest.dependencies["react"], "^19.1.0");
        assert!(plan.lookup_failures.contains_key("react"));
    }

    #[test]
    fn test_selection_describe() {
        let selection = Selection {
            typescript: false,
            tailwind: true,
            ui: UiLibrary::Mui,
        };
        assert_eq!(selection.describe(), "React + Vite, JavaScript, MUI, Tailwind CSS");
        assert_eq!(
            selection.features(),
            vec![Feature::Common, Feature::Mui, Feature::Tailwind]
        );
    }
}
