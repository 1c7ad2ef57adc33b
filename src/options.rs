//! Options controlling how the template context is built.

use serde::{Deserialize, Serialize};

/// Name of the generated root container when the caller gives none.
pub const DEFAULT_ENUM_NAME: &str = "L10n";

/// Separator between namespace segments in a key.
pub const DEFAULT_KEY_DELIMITER: char = '.';

/// How a key that is both a leaf and a namespace prefix is resolved.
///
/// For keys `"a"` and `"a.b"`, `PreferNamespace` keeps the namespace `a`
/// containing `b` and shadows the leaf `a`; `PreferLeaf` keeps the leaf `a`
/// and shadows `a.b`. Neither the tree nor the reported conflicts depend on
/// which key came first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// The deeper definition wins.
    #[default]
    PreferNamespace,
    /// The shallower leaf wins.
    PreferLeaf,
}

/// Build options for [`crate::StringsFileParser::stencil_context_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    /// Name attached to the root of the context.
    pub enum_name: String,
    /// Character splitting keys into namespace segments.
    pub delimiter: char,
    /// Resolution for leaf/namespace collisions.
    pub conflict_policy: ConflictPolicy,
}

impl Default for ContextOptions {
    fn default() -> Self {
        ContextOptions {
            enum_name: DEFAULT_ENUM_NAME.to_string(),
            delimiter: DEFAULT_KEY_DELIMITER,
            conflict_policy: ConflictPolicy::default(),
        }
    }
}

impl ContextOptions {
    /// Creates default context options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root container name.
    pub fn with_enum_name(mut self, enum_name: impl Into<String>) -> Self {
        self.enum_name = enum_name.into();
        self
    }

    /// Sets the key delimiter.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the leaf/namespace conflict policy.
    pub fn with_conflict_policy(mut self, conflict_policy: ConflictPolicy) -> Self {
        self.conflict_policy = conflict_policy;
        self
    }
}
