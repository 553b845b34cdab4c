//! Per-run accumulators that fold feature fragments together

use super::fragment::{merge_rules, Feature, FeatureFragment, RuleSet};
use super::marker::PlaceholderMap;
use crate::error::ScaffoldError;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Merged package manifest state for one generation run.
///
/// Created empty, merged once per selected feature, then finalized against
/// resolved versions. Not reusable across runs.
#[derive(Debug, Clone)]
pub struct ManifestAccumulator {
    name: String,
    applied: BTreeSet<Feature>,
    dependencies: BTreeSet<String>,
    dev_dependencies: BTreeSet<String>,
    lint_rules: RuleSet,
    scripts: BTreeMap<Feature, BTreeMap<String, String>>,
}

impl ManifestAccumulator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            applied: BTreeSet::new(),
            dependencies: BTreeSet::new(),
            dev_dependencies: BTreeSet::new(),
            lint_rules: RuleSet::new(),
            scripts: BTreeMap::new(),
        }
    }

    /// Merge one feature's fragment.
    ///
    /// Dependency names are unioned, lint rules merged by value shape.
    /// Applying a feature a second time is rejected.
    pub fn merge(&mut self, feature: Feature, fragment: &FeatureFragment) -> Result<(), ScaffoldError> {
        if !self.applied.insert(feature) {
            return Err(ScaffoldError::AlreadyApplied(feature));
        }

        self.dependencies
            .extend(fragment.dependencies.iter().cloned());
        self.dev_dependencies
            .extend(fragment.dev_dependencies.iter().cloned());
        merge_rules(&mut self.lint_rules, &fragment.lint_rules);
        if !fragment.scripts.is_empty() {
            self.scripts.insert(feature, fragment.scripts.clone());
        }

        tracing::debug!(
            %feature,
            dependencies = fragment.dependencies.len(),
            dev_dependencies = fragment.dev_dependencies.len(),
            "merged feature fragment"
        );
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn applied(&self) -> &BTreeSet<Feature> {
        &self.applied
    }

    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    pub fn dev_dependencies(&self) -> &BTreeSet<String> {
        &self.dev_dependencies
    }

    pub fn lint_rules(&self) -> &RuleSet {
        &self.lint_rules
    }

    /// Every dependency name that needs a version
    pub fn dependency_names(&self) -> BTreeSet<String> {
        self.dependencies
            .union(&self.dev_dependencies)
            .cloned()
            .collect()
    }

    /// Scripts in canonical feature order; a later feature overrides a
    /// script of the same name set by an earlier one (e.g. `build`)
    pub fn scripts(&self) -> BTreeMap<String, String> {
        let mut merged = BTreeMap::new();
        for scripts in self.scripts.values() {
            merged.extend(scripts.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged
    }

    /// Attach versions to every dependency name.
    ///
    /// Fails if any accumulated name has no version in `versions`.
    pub fn finalize(self, versions: &BTreeMap<String, String>) -> Result<PackageManifest, ScaffoldError> {
        let pick = |names: &BTreeSet<String>| -> Result<BTreeMap<String, String>, ScaffoldError> {
            names
                .iter()
                .map(|name| {
                    versions
                        .get(name)
                        .map(|version| (name.clone(), version.clone()))
                        .ok_or_else(|| ScaffoldError::Unversioned(name.clone()))
                })
                .collect()
        };

        let dependencies = pick(&self.dependencies)?;
        let dev_dependencies = pick(&self.dev_dependencies)?;
        let scripts = self.scripts();

        Ok(PackageManifest {
            name: self.name,
            private: true,
            version: "0.0.0".to_string(),
            module_type: "module".to_string(),
            scripts,
            dependencies,
            dev_dependencies,
            lint_rules: self.lint_rules,
        })
    }
}

/// Finalized `package.json` plus the merged lint rules
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    pub name: String,
    pub private: bool,
    pub version: String,
    #[serde(rename = "type")]
    pub module_type: String,
    pub scripts: BTreeMap<String, String>,
    pub dependencies: BTreeMap<String, String>,
    pub dev_dependencies: BTreeMap<String, String>,
    /// Rendered into the ESLint config rather than package.json
    #[serde(skip)]
    pub lint_rules: RuleSet,
}

/// Template text contributions gathered from the applied features.
///
/// Stored per feature and emitted in canonical order, so the rendered text
/// does not depend on application order.
#[derive(Debug, Clone, Default)]
pub struct TemplateContributions {
    by_feature: BTreeMap<Feature, FeatureFragment>,
}

impl TemplateContributions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, feature: Feature, fragment: &FeatureFragment) {
        self.by_feature.insert(feature, fragment.clone());
    }

    /// Marker replacements; later features override `common` defaults
    pub fn placeholders(&self) -> PlaceholderMap {
        let mut map = PlaceholderMap::new();
        for fragment in self.by_feature.values() {
            map.extend(
                fragment
                    .placeholders
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
        }
        map
    }

    pub fn build_imports(&self) -> Vec<String> {
        self.collect(|f| f.build_imports.as_slice())
    }

    pub fn build_plugins(&self) -> Vec<String> {
        self.collect(|f| f.build_plugins.as_slice())
    }

    /// Stylesheet preludes, concatenated in canonical feature order
    pub fn stylesheet_prelude(&self) -> String {
        self.by_feature
            .values()
            .filter_map(|f| f.stylesheet.as_deref())
            .collect()
    }

    /// Extra files (unrendered path -> unrendered contents)
    pub fn files(&self) -> BTreeMap<String, String> {
        let mut files = BTreeMap::new();
        for fragment in self.by_feature.values() {
            files.extend(fragment.files.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        files
    }

    fn collect<'a, F>(&'a self, field: F) -> Vec<String>
    where
        F: Fn(&'a FeatureFragment) -> &'a [String],
    {
        let mut seen = super::OrderedSet::new();
        for fragment in self.by_feature.values() {
            seen.extend(field(fragment).iter().cloned());
        }
        seen.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(yaml: &str) -> FeatureFragment {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn sample_features() -> Vec<(Feature, FeatureFragment)> {
        vec![
            (
                Feature::Common,
                fragment(
                    "dependencies: [react, react-dom]\ndev_dependencies: [vite]\nscripts: { build: vite build, dev: vite }\nplaceholders: { ext: jsx }\nbuild_imports: [\"import react from '@vitejs/plugin-react';\"]\n",
                ),
            ),
            (
                Feature::TypeScript,
                fragment(
                    "dev_dependencies: [typescript, vite]\nscripts: { build: tsc -b && vite build }\nplaceholders: { ext: tsx }\n",
                ),
            ),
            (
                Feature::Tailwind,
                fragment(
                    "dependencies: [tailwindcss, react]\nbuild_imports: [\"import tailwindcss from '@tailwindcss/vite';\"]\nstylesheet: \"@import 'tailwindcss';\\n\"\n",
                ),
            ),
            (
                Feature::Mui,
                fragment("dependencies: ['@mui/material']\nstylesheet: \"@layer mui;\\n\"\n"),
            ),
        ]
    }

    fn accumulate(order: &[usize]) -> (ManifestAccumulator, TemplateContributions) {
        let features = sample_features();
        let mut manifest = ManifestAccumulator::new("demo");
        let mut contributions = TemplateContributions::new();
        for &idx in order {
            let (feature, fragment) = &features[idx];
            manifest.merge(*feature, fragment).unwrap();
            contributions.absorb(*feature, fragment);
        }
        (manifest, contributions)
    }

    #[test]
    fn test_dependency_sets_are_order_independent() {
        let (forward, _) = accumulate(&[0, 1, 2, 3]);
        let (backward, _) = accumulate(&[3, 2, 1, 0]);
        let (shuffled, _) = accumulate(&[2, 0, 3, 1]);

        assert_eq!(forward.dependencies(), backward.dependencies());
        assert_eq!(forward.dependencies(), shuffled.dependencies());
        assert_eq!(forward.dev_dependencies(), backward.dev_dependencies());
        assert_eq!(forward.dependency_names().len(), 6);
    }

    #[test]
    fn test_text_contributions_are_order_independent() {
        let (forward_manifest, forward) = accumulate(&[0, 1, 2, 3]);
        let (backward_manifest, backward) = accumulate(&[3, 2, 1, 0]);

        assert_eq!(forward.placeholders(), backward.placeholders());
        assert_eq!(forward.placeholders()["ext"], "tsx");
        assert_eq!(forward.build_imports(), backward.build_imports());
        assert_eq!(
            forward.stylesheet_prelude(),
            "@layer mui;\n@import 'tailwindcss';\n"
        );
        assert_eq!(forward.stylesheet_prelude(), backward.stylesheet_prelude());
        assert_eq!(forward_manifest.scripts(), backward_manifest.scripts());
        assert_eq!(forward_manifest.scripts()["build"], "tsc -b && vite build");
    }

    #[test]
    fn test_applying_feature_twice_is_rejected() {
        let features = sample_features();
        let mut manifest = ManifestAccumulator::new("demo");
        manifest.merge(Feature::Common, &features[0].1).unwrap();
        let err = manifest.merge(Feature::Common, &features[0].1).unwrap_err();
        assert!(matches!(err, ScaffoldError::AlreadyApplied(Feature::Common)));
    }

    #[test]
    fn test_finalize_requires_every_version() {
        let (manifest, _) = accumulate(&[0]);
        let mut versions = BTreeMap::new();
        versions.insert("react".to_string(), "^19.1.0".to_string());
        versions.insert("vite".to_string(), "^6.3.5".to_string());

        let err = manifest.clone().finalize(&versions).unwrap_err();
        assert!(matches!(err, ScaffoldError::Unversioned(name) if name == "react-dom"));

        versions.insert("react-dom".to_string(), "^19.1.0".to_string());
        let package = manifest.finalize(&versions).unwrap();
        assert_eq!(package.dependencies.len(), 2);
        assert_eq!(package.dev_dependencies["vite"], "^6.3.5");
    }

    #[test]
    fn test_package_manifest_serializes_as_package_json() {
        let (manifest, _) = accumulate(&[0]);
        let versions: BTreeMap<String, String> = ["react", "react-dom", "vite"]
            .iter()
            .map(|n| (n.to_string(), "1.0.0".to_string()))
            .collect();
        let json = serde_json::to_value(manifest.finalize(&versions).unwrap()).unwrap();
        assert_eq!(json["name"], "demo");
        assert_eq!(json["type"], "module");
        assert_eq!(json["devDependencies"]["vite"], "1.0.0");
        assert!(json.get("lintRules").is_none());
    }
}
