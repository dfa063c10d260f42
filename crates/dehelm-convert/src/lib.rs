//! Dehelm Convert - static GitOps files from Helm-rendered manifests
//!
//! This crate takes the output of `helm template` and turns it into one
//! numbered YAML file per Kubernetes object, ready to be checked in and
//! deployed without Helm:
//!
//! - Helm bookkeeping (`helm.sh/chart` labels, `heritage: Helm`, injected
//!   `HELM_VALUES` entries) is pruned
//! - container images are remapped onto the internal registry
//! - `${var}` lookalikes that the deploy tool would interpolate are escaped
//! - a ClusterRole rule granting non-core resources in the `""` group is fixed
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use dehelm_convert::{ConvertOptions, Converter, Environment, Profile};
//!
//! let converter = Converter::new(
//!     Profile::kubecost(Environment::Primary),
//!     ConvertOptions::default(),
//! );
//! let report = converter
//!     .convert_file(Path::new("kubecost.yaml"), Path::new("."))
//!     .unwrap();
//!
//! for written in &report.written {
//!     println!("{}", written.path.display());
//! }
//! ```
//!
//! # Profiles
//!
//! | Profile          | Variant | Destination                                  |
//! |------------------|---------|----------------------------------------------|
//! | `kubecost`       | strict  | `ops/k8s/kubecost-<env>/<chart subdir>/`     |
//! | `flink-operator` | lenient | `ops/k8s/flink/flinkoperator/`               |
//!
//! Strict profiles abort on anything unexpected. Lenient profiles skip
//! documents they cannot parse, but an unmapped image prefix is fatal for
//! both.

pub mod cleanup;
pub mod converter;
pub mod error;
pub mod escape;
pub mod image;
pub mod manifest;
pub mod profile;
pub mod writer;

// Re-exports
pub use cleanup::CleanupStats;
pub use converter::{
    ConvertOptions, Converter, RunReport, SkipReason, SkippedDocument, WrittenObject, convert,
};
pub use error::{ConvertError, ErrorKind, Result};
pub use profile::{Environment, ImageMap, Profile, Variant};
