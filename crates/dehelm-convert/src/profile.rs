//! Conversion profiles
//!
//! A profile bundles the compiled-in lookup tables (source path map, image
//! map, template allow-list) with the variant that decides how strictly a
//! manifest is treated. Profiles are built once and never mutated.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ConvertError, Result};

/// How a manifest is processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Multi-chart manifests with source annotations, Helm pruning, template
    /// escaping and RBAC patching. Every unexpected condition aborts the run.
    Strict,
    /// Single-chart manifests written to one directory. Malformed documents
    /// are logged and skipped.
    Lenient,
}

/// Deployment selector for the kubecost profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Primary,
    Secondary,
    Waterfowl,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Waterfowl => "waterfowl",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "primary" => Ok(Self::Primary),
            "secondary" => Ok(Self::Secondary),
            "waterfowl" => Ok(Self::Waterfowl),
            other => Err(format!(
                "unknown environment '{}' (expected primary, secondary or waterfowl)",
                other
            )),
        }
    }
}

/// Where the objects of a manifest end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destinations {
    /// Source chart directory -> logical destination subdirectory
    ByChartPath(BTreeMap<String, String>),
    /// Every object goes to the output root itself
    Single,
}

/// Source registry prefix -> destination registry prefix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMap {
    entries: BTreeMap<String, String>,
}

impl ImageMap {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries.get(prefix).map(String::as_str)
    }

    /// All destination prefixes an image can be rewritten to
    pub fn destinations(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }
}

/// Immutable configuration for one conversion run
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: &'static str,
    pub variant: Variant,
    pub destinations: Destinations,
    pub images: ImageMap,
    /// `${...}` names that are real interpolation variables and stay as-is
    pub template_allow_list: BTreeSet<String>,
    /// Output root relative to the base directory, e.g. `ops/k8s/kubecost-primary`
    pub output_root: PathBuf,
}

impl Profile {
    /// The strict multi-chart profile for the kubecost manifests
    pub fn kubecost(environment: Environment) -> Self {
        Self {
            name: "kubecost",
            variant: Variant::Strict,
            destinations: Destinations::ByChartPath(
                [
                    ("cost-analyzer/charts/prometheus/templates", "prometheus"),
                    ("cost-analyzer/templates", "cost-analyzer"),
                ]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ),
            images: ImageMap::new([
                ("jimmidyson", "jimmidyson"),
                ("quay.io/prometheus", ""),
                ("gcr.io/kubecost1", "kubecost1"),
                ("prom", "node-exporter"),
                ("michaelkubecost", "michaelkubecost"),
            ]),
            template_allow_list: [
                "is_ksm_v2",
                "cluster",
                "environment",
                "prometheus_memory_request",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            output_root: PathBuf::from(format!("ops/k8s/kubecost-{}", environment)),
        }
    }

    /// The lenient single-chart profile for the flink operator manifest
    pub fn flink_operator() -> Self {
        Self {
            name: "flink-operator",
            variant: Variant::Lenient,
            destinations: Destinations::Single,
            images: ImageMap::new([
                ("gcr.io/flink-operator", "flinkoperator"),
                ("gcr.io/kubebuilder", "kubebuilder"),
                ("", ""),
            ]),
            template_allow_list: BTreeSet::new(),
            output_root: PathBuf::from("ops/k8s/flink/flinkoperator"),
        }
    }

    pub fn is_strict(&self) -> bool {
        self.variant == Variant::Strict
    }

    /// Resolve the destination subdirectory for a document
    ///
    /// `source` is the chart-relative path from the document's source
    /// annotation. The directory part is looked up in the path map; the
    /// single-destination profiles ignore it.
    pub fn classify(&self, source: Option<&str>) -> Result<String> {
        match &self.destinations {
            Destinations::Single => Ok(String::new()),
            Destinations::ByChartPath(map) => {
                let source = source.unwrap_or_default();
                let dir = source.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
                map.get(dir)
                    .cloned()
                    .ok_or_else(|| ConvertError::UnmappedSource {
                        source_path: source.to_string(),
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!("primary".parse::<Environment>(), Ok(Environment::Primary));
        assert_eq!(
            "waterfowl".parse::<Environment>(),
            Ok(Environment::Waterfowl)
        );
        assert!("tertiary".parse::<Environment>().is_err());
    }

    #[test]
    fn test_kubecost_output_root() {
        let profile = Profile::kubecost(Environment::Secondary);
        assert_eq!(profile.output_root, PathBuf::from("ops/k8s/kubecost-secondary"));
        assert!(profile.is_strict());
    }

    #[test]
    fn test_classify_by_chart_path() {
        let profile = Profile::kubecost(Environment::Primary);

        assert_eq!(
            profile
                .classify(Some("cost-analyzer/templates/cost-analyzer-deployment.yaml"))
                .unwrap(),
            "cost-analyzer"
        );
        assert_eq!(
            profile
                .classify(Some(
                    "cost-analyzer/charts/prometheus/templates/server-serviceaccount.yaml"
                ))
                .unwrap(),
            "prometheus"
        );
    }

    #[test]
    fn test_classify_unmapped_source() {
        let profile = Profile::kubecost(Environment::Primary);

        let err = profile
            .classify(Some("cost-analyzer/charts/grafana/templates/x.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnmappedSource { .. }));

        assert!(profile.classify(None).is_err());
    }

    #[test]
    fn test_classify_single_destination() {
        let profile = Profile::flink_operator();
        assert_eq!(profile.classify(None).unwrap(), "");
        assert_eq!(profile.classify(Some("anything/at/all.yaml")).unwrap(), "");
    }

    #[test]
    fn test_image_map_lookup() {
        let images = ImageMap::new([("gcr.io/kubecost1", "kubecost1"), ("prom", "node-exporter")]);
        assert_eq!(images.get("prom"), Some("node-exporter"));
        assert_eq!(images.get("docker.io"), None);
        assert_eq!(images.destinations().count(), 2);
    }
}
