//! Embedded template texts for React + Vite projects
//!
//! Files ending in `.tmpl` contain `~~key~~` markers; the JSON files are
//! parsed and extended by the planner.

pub const MAIN: &str = include_str!("../../templates/react/main.tmpl");
pub const APP: &str = include_str!("../../templates/react/App.tmpl");
pub const VITE_CONFIG: &str = include_str!("../../templates/react/vite.config.tmpl");
pub const ESLINT_JS: &str = include_str!("../../templates/react/eslint.config.js.tmpl");
pub const ESLINT_TS: &str = include_str!("../../templates/react/eslint.config.ts.tmpl");
pub const INDEX_HTML: &str = include_str!("../../templates/react/index.html.tmpl");
pub const INDEX_CSS: &str = include_str!("../../templates/react/index.css.tmpl");
pub const PRETTIERRC: &str = include_str!("../../templates/react/prettierrc.tmpl");
pub const GITIGNORE: &str = include_str!("../../templates/react/gitignore.tmpl");
pub const README: &str = include_str!("../../templates/react/README.md.tmpl");

pub const TSCONFIG: &str = include_str!("../../templates/react/tsconfig.json");
pub const TSCONFIG_APP: &str = include_str!("../../templates/react/tsconfig.app.json");
pub const TSCONFIG_NODE: &str = include_str!("../../templates/react/tsconfig.node.json");
