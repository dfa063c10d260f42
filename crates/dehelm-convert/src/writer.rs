//! Numbered per-destination output files

use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::{ConvertError, Result};
use crate::escape::unescape;

/// `<name>-<lowercased kind>`, the identity part of an output file name
pub fn file_stem(name: &str, kind: &str) -> String {
    format!("{}-{}", name, kind.to_lowercase())
}

/// Placeholder put in front of strings that must come out single-quoted
const QUOTE_SENTINEL: &str = "<QUOTE>";

/// Plain scalars that YAML 1.1 loaders, Kubernetes tooling included, read as
/// booleans. The serializer only quotes the YAML 1.2 forms.
const YAML11_BOOLEANS: [&str; 22] = [
    "y", "Y", "yes", "Yes", "YES", "n", "N", "no", "No", "NO", "on", "On", "ON", "off", "Off",
    "OFF", "true", "True", "TRUE", "false", "False", "FALSE",
];

/// `<NNN>-<stem>.yaml`
pub fn file_name(sequence: usize, stem: &str) -> String {
    format!("{:03}-{}.yaml", sequence, stem)
}

/// Writes objects under an output root, numbering them per destination
///
/// Existing files are overwritten. Files left over from earlier runs whose
/// names no longer come up are not removed.
#[derive(Debug)]
pub struct OutputWriter {
    root: PathBuf,
    counters: HashMap<String, usize>,
    unescape: bool,
    dry_run: bool,
    quoted: Regex,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>, unescape: bool, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            counters: HashMap::new(),
            unescape,
            dry_run,
            quoted: Regex::new(r#"['"]?<QUOTE>(\w+)['"]?"#).expect("valid regex"),
        }
    }

    /// Directory a destination subdirectory resolves to
    pub fn destination_dir(&self, destination: &str) -> PathBuf {
        if destination.is_empty() {
            self.root.clone()
        } else {
            self.root.join(destination)
        }
    }

    /// Serialize `object` and write it as the next file of `destination`
    ///
    /// `index` is the document position, used only for error reporting.
    pub fn write(
        &mut self,
        index: usize,
        destination: &str,
        stem: &str,
        object: &Mapping,
    ) -> Result<PathBuf> {
        let dir = self.destination_dir(destination);
        let counter = self.counters.entry(destination.to_string()).or_insert(0);
        let path = dir.join(file_name(*counter, stem));

        let mut value = Value::Mapping(object.clone());
        mark_boolean_lookalikes(&mut value);
        let yaml = serde_yaml::to_string(&value)
            .map_err(|source| ConvertError::Yaml { index, source })?;
        let mut yaml = self.quoted.replace_all(&yaml, "'$1'").into_owned();
        if self.unescape {
            yaml = unescape(&yaml);
        }

        if self.dry_run {
            debug!("Would write {}", path.display());
        } else {
            fs::create_dir_all(&dir).map_err(|e| ConvertError::io(&dir, e))?;
            fs::write(&path, yaml).map_err(|e| ConvertError::io(&path, e))?;
            info!("==> wrote {}", path.display());
        }

        *counter += 1;
        Ok(path)
    }
}

/// Prefix every string a YAML 1.1 reader would take for a boolean
fn mark_boolean_lookalikes(value: &mut Value) {
    match value {
        Value::String(s) if YAML11_BOOLEANS.contains(&s.as_str()) => {
            s.insert_str(0, QUOTE_SENTINEL);
        }
        Value::Sequence(items) => items.iter_mut().for_each(mark_boolean_lookalikes),
        Value::Mapping(mapping) => {
            *mapping = std::mem::take(mapping)
                .into_iter()
                .map(|(mut key, mut value)| {
                    mark_boolean_lookalikes(&mut key);
                    mark_boolean_lookalikes(&mut value);
                    (key, value)
                })
                .collect();
        }
        Value::Tagged(tagged) => mark_boolean_lookalikes(&mut tagged.value),
        _ => {}
    }
}
