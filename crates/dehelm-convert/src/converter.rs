//! Main converter logic
//!
//! Drives a manifest through splitting, classification, escaping, parsing,
//! cleanup and writing, according to the profile's variant.

use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::cleanup::{CleanupStats, Cleaner};
use crate::error::{ConvertError, ErrorKind, Result};
use crate::escape::TemplateEscaper;
use crate::manifest::{DocumentBlock, split_documents};
use crate::profile::{Destinations, Profile};
use crate::writer::{OutputWriter, file_stem};

/// Options for the converter
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Compute and report output paths without touching the filesystem
    pub dry_run: bool,
}

/// An object that was written (or would be, in dry-run mode)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenObject {
    pub path: PathBuf,
    pub destination: String,
    pub name: String,
    pub kind: String,
}

/// Why a document produced no output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Grafana dashboard ConfigMaps are provisioned separately
    GrafanaDashboard,
    /// Lenient profiles skip documents they cannot make sense of
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub index: usize,
    pub name: Option<String>,
    pub reason: SkipReason,
}

/// Result of converting one manifest
#[derive(Debug, Default)]
pub struct RunReport {
    pub written: Vec<WrittenObject>,
    pub skipped: Vec<SkippedDocument>,
    pub stats: CleanupStats,
}

/// Converts rendered manifests for one profile
pub struct Converter {
    profile: Profile,
    options: ConvertOptions,
    escaper: TemplateEscaper,
}

impl Converter {
    pub fn new(profile: Profile, options: ConvertOptions) -> Self {
        let escaper = TemplateEscaper::new(profile.template_allow_list.clone());
        Self {
            profile,
            options,
            escaper,
        }
    }

    /// Convert the manifest at `manifest_path`
    ///
    /// Output goes to the profile's output root below `base_dir`.
    pub fn convert_file(&self, manifest_path: &Path, base_dir: &Path) -> Result<RunReport> {
        let manifest =
            fs::read_to_string(manifest_path).map_err(|e| ConvertError::io(manifest_path, e))?;
        self.convert_str(&manifest, base_dir)
    }

    /// Convert manifest text
    pub fn convert_str(&self, manifest: &str, base_dir: &Path) -> Result<RunReport> {
        let mut report = RunReport::default();
        let mut writer = OutputWriter::new(
            base_dir.join(&self.profile.output_root),
            self.profile.is_strict(),
            self.options.dry_run,
        );

        for block in split_documents(manifest) {
            match self.convert_block(&block, &mut writer, &mut report) {
                Ok(()) => {}
                Err(e) if !self.profile.is_strict() && e.kind() == ErrorKind::Malformed => {
                    warn!("Skipping document {}: {}", block.index, e);
                    report.skipped.push(SkippedDocument {
                        index: block.index,
                        name: None,
                        reason: SkipReason::Malformed(e.to_string()),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    fn convert_block(
        &self,
        block: &DocumentBlock<'_>,
        writer: &mut OutputWriter,
        report: &mut RunReport,
    ) -> Result<()> {
        let strict = self.profile.is_strict();

        let source = block.source();
        if matches!(self.profile.destinations, Destinations::ByChartPath(_)) && source.is_none() {
            return Err(ConvertError::MissingSourceAnnotation { index: block.index });
        }
        let destination = self.profile.classify(source)?;

        let text = if strict {
            self.escaper.escape(block.text)
        } else {
            block.text.to_string()
        };

        let value: Value = serde_yaml::from_str(&text).map_err(|e| ConvertError::Yaml {
            index: block.index,
            source: e,
        })?;

        let mut object = match value {
            Value::Null => {
                debug!("Document {} is empty, skipping", block.index);
                return Ok(());
            }
            Value::Mapping(mapping) => mapping,
            _ => return Err(ConvertError::invalid(block.index, "document is not a mapping")),
        };

        if !strict && !(object.contains_key("metadata") && object.contains_key("kind")) {
            return Err(ConvertError::invalid(
                block.index,
                "document has no metadata or kind",
            ));
        }

        let (name, kind) = identity(&object, block.index)?;
        let stem = file_stem(&name, &kind);

        if strict && is_grafana_dashboard(&object) {
            info!("Skipping {} Grafana ConfigMap", stem);
            report.skipped.push(SkippedDocument {
                index: block.index,
                name: Some(name),
                reason: SkipReason::GrafanaDashboard,
            });
            return Ok(());
        }

        let mut cleaner = Cleaner::new(&self.profile.images, strict);
        cleaner.clean(&mut object)?;
        report.stats.merge(&cleaner.stats());

        let path = writer.write(block.index, &destination, &stem, &object)?;
        report.written.push(WrittenObject {
            path,
            destination,
            name,
            kind,
        });

        Ok(())
    }
}

/// `metadata.name` and `kind` of an object
fn identity(object: &Mapping, index: usize) -> Result<(String, String)> {
    let kind = object
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| ConvertError::invalid(index, "kind is missing or not a string"))?;
    let name = object
        .get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(Value::as_str)
        .ok_or_else(|| ConvertError::invalid(index, "metadata.name is missing or not a string"))?;
    Ok((name.to_string(), kind.to_string()))
}

fn is_grafana_dashboard(object: &Mapping) -> bool {
    object.get("kind").and_then(Value::as_str) == Some("ConfigMap")
        && object
            .get("metadata")
            .and_then(|m| m.get("labels"))
            .and_then(|l| l.get("grafana_dashboard"))
            .and_then(Value::as_str)
            == Some("1")
}

// =============================================================================
// Public API
// =============================================================================

/// Convert a manifest file with default options
pub fn convert(profile: Profile, manifest_path: &Path, base_dir: &Path) -> Result<RunReport> {
    Converter::new(profile, ConvertOptions::default()).convert_file(manifest_path, base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Environment;
    use tempfile::TempDir;

    const KUBECOST_MANIFEST: &str = r#"---
# Source: cost-analyzer/charts/prometheus/templates/server-serviceaccount.yaml
apiVersion: v1
kind: ServiceAccount
metadata:
  labels:
    component: "server"
    app: prometheus
    release: kubecost
    chart: prometheus-15.18.0
    heritage: Helm
  name: kubecost-prometheus-server
---
# Source: cost-analyzer/templates/cost-analyzer-frontend-config-map-template.yaml
apiVersion: v1
kind: ConfigMap
metadata:
  name: nginx-conf
  labels:
    app.kubernetes.io/name: cost-analyzer
    helm.sh/chart: cost-analyzer-1.101.3
data:
  query: sum(up{cluster="${cluster}", job="${random_other_var}"})
---
# Source: cost-analyzer/templates/grafana-dashboards.yaml
apiVersion: v1
kind: ConfigMap
metadata:
  name: attached-disk-metrics
  labels:
    grafana_dashboard: "1"
data:
  dashboard.json: "{}"
---
# Source: cost-analyzer/templates/cost-analyzer-cluster-role-template.yaml
---
# Source: cost-analyzer/templates/cost-analyzer-deployment-template.yaml
apiVersion: apps/v1
kind: Deployment
metadata:
  name: kubecost-cost-analyzer
spec:
  template:
    spec:
      containers:
        - image: gcr.io/kubecost1/cost-model:prod-1.101.3
          name: cost-model
          env:
            - name: HELM_VALUES
              value: abc
"#;

    fn strict_converter() -> Converter {
        Converter::new(
            Profile::kubecost(Environment::Primary),
            ConvertOptions::default(),
        )
    }

    #[test]
    fn test_convert_kubecost_manifest() {
        let dir = TempDir::new().unwrap();
        let report = strict_converter()
            .convert_str(KUBECOST_MANIFEST, dir.path())
            .unwrap();

        let names: Vec<String> = report
            .written
            .iter()
            .map(|w| {
                w.path
                    .strip_prefix(dir.path())
                    .unwrap()
                    .display()
                    .to_string()
            })
            .collect();
        insta::assert_snapshot!(names.join("\n"), @r"
        ops/k8s/kubecost-primary/prometheus/000-kubecost-prometheus-server-serviceaccount.yaml
        ops/k8s/kubecost-primary/cost-analyzer/000-nginx-conf-configmap.yaml
        ops/k8s/kubecost-primary/cost-analyzer/001-kubecost-cost-analyzer-deployment.yaml
        ");

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].reason, SkipReason::GrafanaDashboard);
        assert_eq!(report.stats.remapped_images, 1);
        assert_eq!(report.stats.pruned_entries, 1);
    }

    #[test]
    fn test_output_is_helm_free_and_escaped() {
        let dir = TempDir::new().unwrap();
        let report = strict_converter()
            .convert_str(KUBECOST_MANIFEST, dir.path())
            .unwrap();

        for written in &report.written {
            let content = fs::read_to_string(&written.path).unwrap();
            assert!(
                !content.to_lowercase().contains("helm"),
                "{} still mentions helm:\n{}",
                written.path.display(),
                content
            );
        }

        let config = fs::read_to_string(&report.written[1].path).unwrap();
        assert!(config.contains("\\${random_other_var}"), "got: {config}");
        assert!(config.contains("${cluster}"));
        assert!(!config.contains("\\${cluster}"));

        let deployment = fs::read_to_string(&report.written[2].path).unwrap();
        assert!(deployment.contains("image: kubecost1/cost-model:prod-1.101.3"));
    }

    #[test]
    fn test_unmapped_source_aborts() {
        let dir = TempDir::new().unwrap();
        let manifest = "# Source: cost-analyzer/charts/grafana/templates/x.yaml\nkind: ConfigMap\nmetadata:\n  name: x\n";

        let err = strict_converter()
            .convert_str(manifest, dir.path())
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnmappedSource { .. }));
        assert!(!dir.path().join("ops").exists());
    }

    #[test]
    fn test_strict_missing_name_aborts() {
        let dir = TempDir::new().unwrap();
        let manifest = "# Source: cost-analyzer/templates/x.yaml\nkind: ConfigMap\nmetadata: {}\n";

        let err = strict_converter()
            .convert_str(manifest, dir.path())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_strict_parse_error_aborts() {
        let dir = TempDir::new().unwrap();
        let manifest = "# Source: cost-analyzer/templates/x.yaml\nkind: [unclosed\n";

        let err = strict_converter()
            .convert_str(manifest, dir.path())
            .unwrap_err();
        assert!(matches!(err, ConvertError::Yaml { index: 0, .. }));
    }

    #[test]
    fn test_strict_blank_first_line_aborts() {
        let dir = TempDir::new().unwrap();
        let err = strict_converter()
            .convert_str("\nkind: ConfigMap\nmetadata:\n  name: x\n", dir.path())
            .unwrap_err();
        assert!(matches!(err, ConvertError::MissingSourceAnnotation { index: 0 }));
    }

    #[test]
    fn test_lenient_skips_malformed_documents() {
        let dir = TempDir::new().unwrap();
        let manifest = "\
apiVersion: v1
kind: Namespace
metadata:
  name: flink-operator-system
---
just: a mapping
---
- not
- a mapping
---
kind: [unclosed
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: flink-operator-controller-manager
  labels:
    heritage: Helm
spec:
  template:
    spec:
      containers:
        - name: manager
          image: gcr.io/flink-operator/flink-operator:v1beta1-6
";
        let converter = Converter::new(Profile::flink_operator(), ConvertOptions::default());
        let report = converter.convert_str(manifest, dir.path()).unwrap();

        let root = dir.path().join("ops/k8s/flink/flinkoperator");
        assert_eq!(report.written.len(), 2);
        assert_eq!(
            report.written[0].path,
            root.join("000-flink-operator-system-namespace.yaml")
        );
        assert_eq!(
            report.written[1].path,
            root.join("001-flink-operator-controller-manager-deployment.yaml")
        );

        let skipped: Vec<usize> = report.skipped.iter().map(|s| s.index).collect();
        assert_eq!(skipped, vec![1, 2, 3]);

        let deployment = fs::read_to_string(&report.written[1].path).unwrap();
        assert!(deployment.contains("image: flinkoperator/flink-operator:v1beta1-6"));
        // lenient profiles leave Helm labels alone
        assert!(deployment.contains("heritage: Helm"));
    }

    #[test]
    fn test_boolean_lookalike_strings_keep_their_quotes() {
        let dir = TempDir::new().unwrap();
        let manifest = r#"# Source: cost-analyzer/templates/feature-flags.yaml
apiVersion: v1
kind: ConfigMap
metadata:
  name: feature-flags
data:
  a: "yes"
  b: "on"
  c: "off"
  d: "n"
"#;
        let report = strict_converter().convert_str(manifest, dir.path()).unwrap();

        let config = fs::read_to_string(&report.written[0].path).unwrap();
        insta::assert_snapshot!(config, @r"
        apiVersion: v1
        kind: ConfigMap
        metadata:
          name: feature-flags
        data:
          a: 'yes'
          b: 'on'
          c: 'off'
          d: 'n'
        ");
    }

    #[test]
    fn test_lenient_leaves_template_variables_alone() {
        let dir = TempDir::new().unwrap();
        let manifest = r#"apiVersion: v1
kind: ConfigMap
metadata:
  name: flink-rules
data:
  query: sum(up{job="${random_other_var}"})
"#;
        let converter = Converter::new(Profile::flink_operator(), ConvertOptions::default());
        let report = converter.convert_str(manifest, dir.path()).unwrap();

        let config = fs::read_to_string(&report.written[0].path).unwrap();
        assert!(config.contains("${random_other_var}"), "got: {config}");
        assert!(!config.contains("\\${"));
        assert!(!config.contains("<BACKSLASH>"));
    }

    #[test]
    fn test_lenient_unmapped_image_still_aborts() {
        let dir = TempDir::new().unwrap();
        let manifest = "kind: Pod\nmetadata:\n  name: x\nspec:\n  containers:\n    - name: c\n      image: docker.io/library/nginx:1.25\n";
        let converter = Converter::new(Profile::flink_operator(), ConvertOptions::default());

        let err = converter.convert_str(manifest, dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_dry_run_reports_paths_only() {
        let dir = TempDir::new().unwrap();
        let converter = Converter::new(
            Profile::kubecost(Environment::Waterfowl),
            ConvertOptions { dry_run: true },
        );

        let report = converter.convert_str(KUBECOST_MANIFEST, dir.path()).unwrap();
        assert_eq!(report.written.len(), 3);
        assert!(report.written[0].path.starts_with(dir.path().join("ops/k8s/kubecost-waterfowl")));
        assert!(!dir.path().join("ops").exists());
    }

    #[test]
    fn test_convert_file_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let err = convert(
            Profile::flink_operator(),
            &dir.path().join("missing.yaml"),
            dir.path(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
