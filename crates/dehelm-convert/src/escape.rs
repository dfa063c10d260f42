//! Escaping of `${var}` lookalikes
//!
//! Rendered ConfigMaps often carry strings such as `${job}` that the
//! downstream deploy tool would treat as its own interpolation variables.
//! Those are prefixed with a sentinel before parsing and the sentinel becomes
//! a literal backslash once the object is serialized. A backslash cannot be
//! inserted up front since it would change how the YAML parser reads
//! double-quoted scalars.

use regex::{Captures, Regex};
use std::collections::BTreeSet;

/// Placeholder inserted in front of escaped `${...}` tokens
pub const BACKSLASH_SENTINEL: &str = "<BACKSLASH>";

/// Escapes template-variable lookalikes not on the allow-list
#[derive(Debug, Clone)]
pub struct TemplateEscaper {
    pattern: Regex,
    allow_list: BTreeSet<String>,
}

impl TemplateEscaper {
    pub fn new(allow_list: BTreeSet<String>) -> Self {
        Self {
            // ASCII-only \w, matching what the downstream templater accepts
            pattern: Regex::new(r"(?-u)\$\{(\w+)\}").expect("valid regex"),
            allow_list,
        }
    }

    /// Insert the sentinel before every `${name}` whose name is not allowed
    pub fn escape(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures| {
                let whole = &caps[0];
                if self.allow_list.contains(&caps[1]) {
                    whole.to_string()
                } else {
                    format!("{}{}", BACKSLASH_SENTINEL, whole)
                }
            })
            .into_owned()
    }
}

/// Turn every sentinel back into a literal backslash
pub fn unescape(text: &str) -> String {
    text.replace(BACKSLASH_SENTINEL, "\\")
}
