//! Feature catalog: fragments, pinned versions and aliases
//!
//! The catalog is the read-only source of feature fragments. An embedded copy
//! ships with the binary; `--catalog <file>` swaps in another YAML file.

use crate::compose::{AliasTable, Feature, FeatureFragment, PinnedVersions, RuleSet, RuleValue};
use crate::error::ScaffoldError;
use crate::product::ProductConfig;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const EMBEDDED_CATALOG: &str = include_str!("../catalog/features.yaml");

/// Parsed and validated feature catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    pub features: BTreeMap<Feature, FeatureFragment>,

    /// Pinned version for every dependency any fragment references
    #[serde(default)]
    pub versions: PinnedVersions,

    #[serde(default)]
    pub aliases: AliasTable,
}

impl Catalog {
    /// The catalog compiled into the binary
    pub fn embedded() -> Result<Self, ScaffoldError> {
        Self::from_yaml(EMBEDDED_CATALOG)
    }

    /// Load a catalog file from disk
    pub fn load(path: &Path) -> Result<Self, ScaffoldError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScaffoldError::CatalogRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate catalog YAML
    pub fn from_yaml(content: &str) -> Result<Self, ScaffoldError> {
        let catalog: Catalog = serde_yaml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Look up a feature's own fragment (without companions applied)
    pub fn fragment(&self, feature: Feature) -> Result<&FeatureFragment, ScaffoldError> {
        self.features
            .get(&feature)
            .ok_or_else(|| ScaffoldError::UnknownFeature(feature.to_string()))
    }

    /// The fragment to merge for `feature` given the full selection: its own
    /// fragment plus every companion whose partner is selected
    pub fn effective_fragment(
        &self,
        feature: Feature,
        selection: &[Feature],
    ) -> Result<FeatureFragment, ScaffoldError> {
        let base = self.fragment(feature)?;
        let mut effective = base.clone();
        effective.companions.clear();
        for (partner, companion) in &base.companions {
            if selection.contains(partner) {
                effective.absorb(companion);
            }
        }
        Ok(effective)
    }

    /// Check the invariants merging relies on.
    ///
    /// - `common` exists
    /// - companions name another known feature and do not nest
    /// - no two features set conflicting scalar lint rules
    /// - only `common` defaults may be overridden in placeholders and scripts
    /// - every referenced dependency has a pinned version
    pub fn validate(&self) -> Result<(), ScaffoldError> {
        if !self.features.contains_key(&Feature::Common) {
            return Err(ScaffoldError::UnknownFeature(Feature::Common.to_string()));
        }

        for (feature, fragment) in &self.features {
            for (partner, companion) in &fragment.companions {
                if partner == feature || !self.features.contains_key(partner) {
                    return Err(ScaffoldError::MalformedFragment {
                        feature: *feature,
                        reason: format!("companion for unknown or self feature '{}'", partner),
                    });
                }
                if !companion.companions.is_empty() {
                    return Err(ScaffoldError::MalformedFragment {
                        feature: *feature,
                        reason: format!("companion for '{}' declares its own companions", partner),
                    });
                }
            }
        }

        let full: Vec<(Feature, FeatureFragment)> = self
            .features
            .keys()
            .map(|&f| self.effective_fragment(f, &Feature::ALL).map(|frag| (f, frag)))
            .collect::<Result<_, _>>()?;

        self.check_rule_conflicts(&full)?;
        check_contribution_conflicts(&full, "placeholder", |f| &f.placeholders)?;
        check_contribution_conflicts(&full, "script", |f| &f.scripts)?;
        check_contribution_conflicts(&full, "file", |f| &f.files)?;

        let mut missing: Vec<String> = full
            .iter()
            .flat_map(|(_, fragment)| fragment.all_dependencies())
            .filter(|name| !self.versions.contains_key(*name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            missing.sort();
            missing.dedup();
            return Err(ScaffoldError::MissingPinnedVersions(missing));
        }

        Ok(())
    }

    fn check_rule_conflicts(&self, full: &[(Feature, FeatureFragment)]) -> Result<(), ScaffoldError> {
        let mut owners: BTreeMap<String, (Feature, RuleLeaf<'_>)> = BTreeMap::new();
        for (feature, fragment) in full {
            let mut leaves = Vec::new();
            collect_rule_leaves(&fragment.lint_rules, "", &mut leaves);
            for (rule, leaf) in leaves {
                match owners.get(&rule) {
                    Some((first, existing)) if !existing.compatible(&leaf) => {
                        return Err(ScaffoldError::ConflictingRule {
                            rule,
                            first: *first,
                            second: *feature,
                        });
                    }
                    Some(_) => {}
                    None => {
                        owners.insert(rule, (*feature, leaf));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Print every catalog feature with its pinned dependencies
pub fn print_features<C: ProductConfig>(config: &C, catalog: &Catalog) {
    println!(
        "{}",
        format!("{} features", config.display_name()).cyan().bold()
    );
    println!();

    for (feature, fragment) in &catalog.features {
        println!("  {} {} ({})", "->".blue(), feature.display_name().bold(), feature);
        for (label, names) in [
            ("dependencies", &fragment.dependencies),
            ("devDependencies", &fragment.dev_dependencies),
        ] {
            if names.is_empty() {
                continue;
            }
            println!("      {}", label.dimmed());
            for name in names {
                let version = catalog.versions.get(name).map(String::as_str).unwrap_or("?");
                println!("        {} {}", name, version.green());
            }
        }
        for partner in fragment.companions.keys() {
            println!(
                "      {} {}",
                "with".dimmed(),
                format!("{}: extra setup applied", partner.display_name()).yellow()
            );
        }
        println!();
    }
}

/// Shape of a lint rule at one path, for conflict detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleLeaf<'a> {
    Scalar(&'a str),
    Sequence,
    Mapping,
}

impl RuleLeaf<'_> {
    /// Sequences union and mappings recurse; scalars must agree exactly
    fn compatible(&self, other: &RuleLeaf<'_>) -> bool {
        match (self, other) {
            (RuleLeaf::Scalar(a), RuleLeaf::Scalar(b)) => a == b,
            (RuleLeaf::Sequence, RuleLeaf::Sequence) => true,
            (RuleLeaf::Mapping, RuleLeaf::Mapping) => true,
            _ => false,
        }
    }
}

fn collect_rule_leaves<'a>(rules: &'a RuleSet, prefix: &str, out: &mut Vec<(String, RuleLeaf<'a>)>) {
    for (key, value) in rules {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            RuleValue::Scalar(s) => out.push((path, RuleLeaf::Scalar(s))),
            RuleValue::Sequence(_) => out.push((path, RuleLeaf::Sequence)),
            RuleValue::Mapping(nested) => {
                out.push((path.clone(), RuleLeaf::Mapping));
                collect_rule_leaves(nested, &path, out);
            }
        }
    }
}

/// Reject two non-`common` features writing different values to one key.
/// Overriding a `common` default is allowed; later features win in canonical
/// order.
fn check_contribution_conflicts<F>(
    full: &[(Feature, FeatureFragment)],
    kind: &'static str,
    field: F,
) -> Result<(), ScaffoldError>
where
    F: Fn(&FeatureFragment) -> &BTreeMap<String, String>,
{
    let mut owners: BTreeMap<&str, (Feature, &str)> = BTreeMap::new();
    for (feature, fragment) in full.iter().filter(|(f, _)| *f != Feature::Common) {
        for (key, value) in field(fragment) {
            match owners.get(key.as_str()) {
                Some((first, existing)) if *existing != value.as_str() => {
                    return Err(ScaffoldError::ConflictingContribution {
                        kind,
                        key: key.clone(),
                        first: *first,
                        second: *feature,
                    });
                }
                Some(_) => {}
                None => {
                    owners.insert(key.as_str(), (*feature, value.as_str()));
                }
            }
        }
    }
    Ok(())
}
