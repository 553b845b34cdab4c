//! Import alias table and its two rendered forms
//!
//! One [`AliasTable`] feeds both the Vite `resolve.alias` block and the
//! `compilerOptions.paths` mapping of `tsconfig.app.json` / `jsconfig.json`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Logical import prefix mapped to a directory relative to the project root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub name: String,
    pub path: String,
}

/// `compilerOptions.paths` entries, in alias insertion order
pub type CompilerPaths = Map<String, Value>;

/// Insertion-ordered alias table, unique by logical name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<AliasEntry>", into = "Vec<AliasEntry>")]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an alias. Re-inserting a name updates its path in place.
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<String>) {
        let name = name.into();
        let path = normalize_path(&path.into());
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.path = path,
            None => self.entries.push(AliasEntry { name, path }),
        }
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render `"<name>": path.resolve(__dirname, './<path>'),` lines in
    /// insertion order, for the body of Vite's `resolve.alias`
    pub fn to_build_tool_aliases(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("\"{}\": path.resolve(__dirname, './{}'),", e.name, e.path))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render the `resolve: { alias: { ... } }` block for a Vite config
    pub fn to_build_tool_block(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        let body = self
            .to_build_tool_aliases()
            .lines()
            .map(|line| format!("      {}", line))
            .collect::<Vec<_>>()
            .join("\n");
        format!("resolve: {{\n    alias: {{\n{}\n    }},\n  }},", body)
    }

    /// Glob-style `"<name>/*": ["./<path>/*"]` mapping for the compiler
    pub fn to_compiler_paths(&self) -> CompilerPaths {
        self.entries
            .iter()
            .map(|e| {
                (
                    format!("{}/*", e.name),
                    Value::from(vec![format!("./{}/*", e.path)]),
                )
            })
            .collect()
    }
}

impl From<Vec<AliasEntry>> for AliasTable {
    fn from(entries: Vec<AliasEntry>) -> Self {
        let mut table = AliasTable::new();
        for entry in entries {
            table.insert(entry.name, entry.path);
        }
        table
    }
}

impl From<AliasTable> for Vec<AliasEntry> {
    fn from(table: AliasTable) -> Self {
        table.entries
    }
}

/// Strip a leading `./` and trailing `/` so `./src/app/` and `src/app` match
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
    trimmed.trim_end_matches('/').to_string()
}
