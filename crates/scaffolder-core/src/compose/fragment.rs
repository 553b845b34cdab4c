//! Features and the configuration fragments they contribute

use super::ordered_set::OrderedSet;
use crate::error::ScaffoldError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// A selectable capability of the generated project.
///
/// The declaration order is the canonical order: text contributions are
/// always emitted in this order, whatever order features were applied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    /// Base React + Vite stack, always applied
    Common,
    TypeScript,
    Mui,
    Tailwind,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::Common,
        Feature::TypeScript,
        Feature::Mui,
        Feature::Tailwind,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Feature::Common => "common",
            Feature::TypeScript => "typescript",
            Feature::Mui => "mui",
            Feature::Tailwind => "tailwind",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Feature::Common => "React + Vite",
            Feature::TypeScript => "TypeScript",
            Feature::Mui => "MUI",
            Feature::Tailwind => "Tailwind CSS",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Feature {
    type Err = ScaffoldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "common" => Ok(Feature::Common),
            "typescript" | "ts" => Ok(Feature::TypeScript),
            "mui" => Ok(Feature::Mui),
            "tailwind" | "tailwindcss" => Ok(Feature::Tailwind),
            _ => Err(ScaffoldError::UnknownFeature(s.to_string())),
        }
    }
}

/// Value of a lint rule. The merge policy depends on the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Scalar(String),
    Sequence(OrderedSet<String>),
    Mapping(BTreeMap<String, RuleValue>),
}

/// Lint rules keyed by rule name
pub type RuleSet = BTreeMap<String, RuleValue>;

/// Merge `incoming` rules into `target`.
///
/// - sequence over sequence: ordered set union
/// - mapping over mapping: recursive merge, incoming keys win
/// - anything else: the incoming value replaces the existing one
pub fn merge_rules(target: &mut RuleSet, incoming: &RuleSet) {
    for (key, value) in incoming {
        match target.get_mut(key) {
            Some(existing) => merge_rule_value(existing, value),
            None => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

fn merge_rule_value(existing: &mut RuleValue, incoming: &RuleValue) {
    match (existing, incoming) {
        (RuleValue::Sequence(current), RuleValue::Sequence(extra)) => current.union(extra),
        (RuleValue::Mapping(current), RuleValue::Mapping(extra)) => merge_rules(current, extra),
        (slot, value) => *slot = value.clone(),
    }
}

/// Declarative configuration delta contributed by one feature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureFragment {
    /// Runtime dependency names
    pub dependencies: BTreeSet<String>,

    /// Development dependency names
    pub dev_dependencies: BTreeSet<String>,

    /// ESLint rules
    pub lint_rules: RuleSet,

    /// package.json scripts
    pub scripts: BTreeMap<String, String>,

    /// Marker replacements for template text
    pub placeholders: BTreeMap<String, String>,

    /// Import statements for the Vite config
    pub build_imports: OrderedSet<String>,

    /// Plugin expressions for the Vite config
    pub build_plugins: OrderedSet<String>,

    /// CSS prepended to the project stylesheet
    pub stylesheet: Option<String>,

    /// Extra files (path -> contents); both may contain markers
    pub files: BTreeMap<String, String>,

    /// Extra fragments applied only when the keyed feature is also selected
    pub companions: BTreeMap<Feature, FeatureFragment>,
}

impl FeatureFragment {
    /// Fold another fragment of the same feature into this one.
    ///
    /// Used to layer companion fragments onto their owner before merging.
    pub fn absorb(&mut self, other: &FeatureFragment) {
        self.dependencies.extend(other.dependencies.iter().cloned());
        self.dev_dependencies
            .extend(other.dev_dependencies.iter().cloned());
        merge_rules(&mut self.lint_rules, &other.lint_rules);
        self.scripts
            .extend(other.scripts.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.placeholders
            .extend(other.placeholders.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.build_imports.union(&other.build_imports);
        self.build_plugins.union(&other.build_plugins);
        self.stylesheet = match (self.stylesheet.take(), &other.stylesheet) {
            (Some(mine), Some(theirs)) => Some(format!("{}{}", mine, theirs)),
            (mine, theirs) => mine.or_else(|| theirs.clone()),
        };
        self.files
            .extend(other.files.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Every dependency name, runtime and dev
    pub fn all_dependencies(&self) -> impl Iterator<Item = &String> {
        self.dependencies.iter().chain(self.dev_dependencies.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(items: &[&str]) -> RuleValue {
        RuleValue::Sequence(items.iter().map(|s| s.to_string()).collect())
    }

    fn scalar(s: &str) -> RuleValue {
        RuleValue::Scalar(s.to_string())
    }

    fn rules(entries: Vec<(&str, RuleValue)>) -> RuleSet {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn test_sequence_rules_union_in_first_occurrence_order() {
        let mut target = rules(vec![("quotes", seq(&["error", "single"]))]);
        merge_rules(&mut target, &rules(vec![("quotes", seq(&["error", "double"]))]));
        assert_eq!(target["quotes"], seq(&["error", "single", "double"]));
    }

    #[test]
    fn test_scalar_rule_replaces() {
        let mut target = rules(vec![("no-console", seq(&["warn", "log"]))]);
        merge_rules(&mut target, &rules(vec![("no-console", scalar("off"))]));
        assert_eq!(target["no-console"], scalar("off"));
    }

    #[test]
    fn test_mapping_rules_merge_recursively() {
        let mut target = rules(vec![(
            "settings",
            RuleValue::Mapping(rules(vec![
                ("react", scalar("detect")),
                ("ignore", seq(&["dist"])),
            ])),
        )]);
        let incoming = rules(vec![(
            "settings",
            RuleValue::Mapping(rules(vec![
                ("react", scalar("19")),
                ("ignore", seq(&["build"])),
                ("extra", scalar("yes")),
            ])),
        )]);
        merge_rules(&mut target, &incoming);

        let expected = RuleValue::Mapping(rules(vec![
            ("react", scalar("19")),
            ("ignore", seq(&["dist", "build"])),
            ("extra", scalar("yes")),
        ]));
        assert_eq!(target["settings"], expected);
    }

    #[test]
    fn test_mapping_replaces_non_mapping() {
        let mut target = rules(vec![("x", scalar("error"))]);
        let mapping = RuleValue::Mapping(rules(vec![("a", scalar("b"))]));
        merge_rules(&mut target, &rules(vec![("x", mapping.clone())]));
        assert_eq!(target["x"], mapping);
    }

    #[test]
    fn test_rule_values_deserialize_by_shape() {
        let parsed: RuleSet = serde_yaml::from_str(
            "a: error\nb: [warn, single]\nc:\n  nested: [x]\n",
        )
        .unwrap();
        assert_eq!(parsed["a"], scalar("error"));
        assert_eq!(parsed["b"], seq(&["warn", "single"]));
        assert_eq!(
            parsed["c"],
            RuleValue::Mapping(rules(vec![("nested", seq(&["x"]))]))
        );
    }

    #[test]
    fn test_absorb_layers_companion() {
        let mut owner: FeatureFragment = serde_yaml::from_str(
            "dependencies: ['@mui/material']\nplaceholders: { mui-open-tag: '<ThemeProvider>' }\n",
        )
        .unwrap();
        let companion: FeatureFragment = serde_yaml::from_str(
            "placeholders: { mui-style-engine-open-tag: '<StyledEngineProvider>' }\nstylesheet: '@layer mui;'\n",
        )
        .unwrap();
        owner.absorb(&companion);
        assert_eq!(owner.placeholders.len(), 2);
        assert_eq!(owner.stylesheet.as_deref(), Some("@layer mui;"));
        assert!(owner.dependencies.contains("@mui/material"));
    }

    #[test]
    fn test_unknown_fragment_fields_are_rejected() {
        let parsed: Result<FeatureFragment, _> = serde_yaml::from_str("dependancies: [react]\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_feature_from_str() {
        assert_eq!("ts".parse::<Feature>().unwrap(), Feature::TypeScript);
        assert_eq!("Tailwind".parse::<Feature>().unwrap(), Feature::Tailwind);
        assert!(matches!(
            "vue".parse::<Feature>(),
            Err(ScaffoldError::UnknownFeature(name)) if name == "vue"
        ));
    }
}
