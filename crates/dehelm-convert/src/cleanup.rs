//! Recursive cleanup of a parsed Kubernetes object
//!
//! The walk strips Helm artifacts (strict profiles), drops injected
//! `HELM_VALUES` property-bag entries, remaps container images and patches a
//! ClusterRole rule that grants resources which do not exist in the core API
//! group. Removals are collected during each scan and applied afterwards.

use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use crate::error::{ConvertError, Result};
use crate::image::remap_image;
use crate::profile::ImageMap;

/// Name of the property-bag entry Helm injects into env-style lists
pub const HELM_VALUES: &str = "HELM_VALUES";

/// Resources granted in the `""` apiGroup that fail admission
pub const INVALID_CORE_RESOURCES: [&str; 2] = ["ingresses", "deployments"];

/// Counters for the mutations applied to one or more objects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupStats {
    pub pruned_keys: usize,
    pub pruned_entries: usize,
    pub pruned_rbac_resources: usize,
    pub remapped_images: usize,
}

impl CleanupStats {
    pub fn merge(&mut self, other: &CleanupStats) {
        self.pruned_keys += other.pruned_keys;
        self.pruned_entries += other.pruned_entries;
        self.pruned_rbac_resources += other.pruned_rbac_resources;
        self.remapped_images += other.remapped_images;
    }
}

/// Walks an object tree and applies the cleanup rules in place
pub struct Cleaner<'a> {
    images: &'a ImageMap,
    strict: bool,
    stats: CleanupStats,
}

impl<'a> Cleaner<'a> {
    pub fn new(images: &'a ImageMap, strict: bool) -> Self {
        Self {
            images,
            strict,
            stats: CleanupStats::default(),
        }
    }

    pub fn stats(&self) -> CleanupStats {
        self.stats
    }

    /// Clean a top-level object
    pub fn clean(&mut self, object: &mut Mapping) -> Result<()> {
        self.walk_mapping(object, &[])?;

        if self.strict && object.get("kind").and_then(Value::as_str) == Some("ClusterRole") {
            self.fix_cluster_role(object);
        }

        Ok(())
    }

    fn walk_mapping(&mut self, mapping: &mut Mapping, path: &[String]) -> Result<()> {
        let mut keys_to_prune = Vec::new();

        for (key, value) in mapping.iter_mut() {
            let label = key_label(key);

            if self.strict
                && (mentions_helm(&label) || value.as_str().is_some_and(mentions_helm))
            {
                keys_to_prune.push(key.clone());
                continue;
            }

            match value {
                Value::Mapping(child) => {
                    self.walk_mapping(child, &extend(path, &label))?;
                }
                Value::Sequence(items) => {
                    self.walk_sequence(items, &extend(path, &label))?;
                }
                _ if label == "image" && path.last().map(String::as_str) == Some("containers") => {
                    let Some(reference) = value.as_str() else {
                        return Err(ConvertError::InvalidImage {
                            path: dotted(path, &label),
                        });
                    };
                    let remapped = remap_image(self.images, reference)?;
                    info!("Remapping container image {} --> {}", reference, remapped);
                    *value = Value::String(remapped);
                    self.stats.remapped_images += 1;
                }
                _ => {}
            }
        }

        for key in keys_to_prune {
            if let Some(removed) = mapping.shift_remove(&key) {
                debug!(
                    "Pruning {}: {}",
                    dotted(path, &key_label(&key)),
                    scalar_preview(&removed)
                );
                self.stats.pruned_keys += 1;
            }
        }

        Ok(())
    }

    fn walk_sequence(&mut self, items: &mut Vec<Value>, path: &[String]) -> Result<()> {
        let mut index_to_prune = None;

        for (index, item) in items.iter_mut().enumerate() {
            let Value::Mapping(entry) = item else {
                continue;
            };

            if self.strict
                && index_to_prune.is_none()
                && entry.get("name").and_then(Value::as_str) == Some(HELM_VALUES)
            {
                index_to_prune = Some(index);
                continue;
            }

            self.walk_mapping(entry, path)?;
        }

        if let Some(index) = index_to_prune {
            items.remove(index);
            info!("Pruning {}[{}] {}", path.join("."), index, HELM_VALUES);
            self.stats.pruned_entries += 1;
        }

        Ok(())
    }

    fn fix_cluster_role(&mut self, object: &mut Mapping) {
        let Some(Value::Sequence(rules)) = object.get_mut("rules") else {
            return;
        };

        let Some(core_rule) = rules
            .iter_mut()
            .filter_map(Value::as_mapping_mut)
            .find(|rule| is_core_api_group(rule))
        else {
            return;
        };

        let Some(Value::Sequence(resources)) = core_rule.get_mut("resources") else {
            return;
        };

        let before = resources.len();
        resources.retain(|r| match r.as_str() {
            Some(name) if INVALID_CORE_RESOURCES.contains(&name) => {
                info!("Pruning bad resource in empty apiGroup: {}", name);
                false
            }
            _ => true,
        });
        self.stats.pruned_rbac_resources += before - resources.len();
    }
}

fn is_core_api_group(rule: &Mapping) -> bool {
    match rule.get("apiGroups") {
        Some(Value::Sequence(groups)) => groups.len() == 1 && groups[0].as_str() == Some(""),
        _ => false,
    }
}

fn mentions_helm(text: &str) -> bool {
    text.to_lowercase().contains("helm")
}

fn key_label(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "~".to_string(),
        _ => "<complex key>".to_string(),
    }
}

fn extend(path: &[String], segment: &str) -> Vec<String> {
    let mut next = path.to_vec();
    next.push(segment.to_string());
    next
}

fn dotted(path: &[String], last: &str) -> String {
    if path.is_empty() {
        last.to_string()
    } else {
        format!("{}.{}", path.join("."), last)
    }
}

fn scalar_preview(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Mapping(_) => "{...}".to_string(),
        Value::Sequence(_) => "[...]".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
