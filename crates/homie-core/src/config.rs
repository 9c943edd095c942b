//! Registry configuration.
//!
//! Limits and identifier checks applied when nodes are registered. The
//! defaults accept anything non-empty and non-duplicate within the size
//! limits; identifier alphabet validation is opt-in.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Convention alphabet for node and property ids: lowercase alphanumerics
/// and hyphens, not starting with a hyphen.
const IDENTIFIER_PATTERN: &str = "^[a-z0-9][a-z0-9-]*$";

fn identifier_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(IDENTIFIER_PATTERN).expect("Invalid identifier pattern"))
}

/// Settings applied by [`Registry`](crate::registry::Registry) at
/// registration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistryConfig {
    /// Check node and property ids against the convention alphabet.
    pub validate_identifiers: bool,

    /// Maximum length of a node or property id (only checked when
    /// `validate_identifiers` is set).
    pub max_identifier_length: usize,

    /// Maximum number of registered nodes.
    pub max_nodes: usize,

    /// Maximum number of properties on a single node.
    pub max_properties_per_node: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            validate_identifiers: false,
            max_identifier_length: 32,
            max_nodes: 32,
            max_properties_per_node: 32,
        }
    }
}

impl RegistryConfig {
    /// Check `id` against the alphabet and length limit.
    ///
    /// Always true when validation is disabled.
    pub fn is_valid_identifier(&self, id: &str) -> bool {
        if !self.validate_identifiers {
            return true;
        }
        id.len() <= self.max_identifier_length && identifier_regex().is_match(id)
    }
}
