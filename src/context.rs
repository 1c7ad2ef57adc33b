//! Template context built from accumulated entries.
//!
//! The context exposes the same entries twice: as a flat list in insertion
//! order, and as a namespace tree obtained by splitting every key on a
//! delimiter (`settings.profile.title` becomes `settings` → `profile` →
//! `title`). Code generators pick whichever shape suits them.
//!
//! A key that is both a leaf and the prefix of a deeper key (`"a"` and
//! `"a.b"`) cannot be represented in the tree. Such collisions are resolved by
//! [`ConflictPolicy`] and reported as [`StructuralConflict`]s. Keys with an
//! empty segment have no tree position at all and are listed as skipped. The
//! flat list always keeps every entry.

use std::fmt::Display;

use serde::{
    Serialize, Serializer,
    ser::{SerializeMap, SerializeStruct},
};

use crate::{
    error::Error,
    options::{ConflictPolicy, ContextOptions},
    types::{Entry, PlaceholderType},
};

/// Root of the exchange structure handed to the template engine.
///
/// Serializes as `{ "strings": { "enumName", "entries", "structuredEntries" } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringsContext {
    pub strings: StringsTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StringsTable {
    /// Name of the generated root container.
    pub enum_name: String,
    /// Every entry, in insertion order.
    pub entries: Vec<FlatEntry>,
    /// Entries nested by key segment.
    pub structured_entries: Namespace,
}

impl StringsContext {
    pub fn to_json_value(&self) -> Result<serde_json::Value, Error> {
        serde_json::to_value(self).map_err(Error::Json)
    }

    pub fn to_json_string(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(Error::Json)
    }

    pub fn to_json_string_pretty(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(Error::Json)
    }
}

/// One entry of the flat list, with its accessor parameter block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatEntry {
    pub key: String,
    pub translation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub types: Vec<PlaceholderType>,
    pub params: Params,
}

/// Parameter list of the accessor generated for an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Params {
    pub count: usize,
    /// `p1`, `p2`, ...
    pub names: Vec<String>,
    /// Swift type of each parameter.
    pub types: Vec<String>,
    /// `p1: String`, `p2: Int`, ...
    pub typednames: Vec<String>,
}

impl Params {
    fn new(types: &[PlaceholderType]) -> Self {
        let names: Vec<String> = (1..=types.len()).map(|i| format!("p{i}")).collect();
        let swift_types: Vec<String> = types
            .iter()
            .map(|ty| ty.swift_type().to_string())
            .collect();
        let typednames = names
            .iter()
            .zip(&swift_types)
            .map(|(name, ty)| format!("{name}: {ty}"))
            .collect();
        Params {
            count: types.len(),
            names,
            types: swift_types,
            typednames,
        }
    }
}

impl From<&Entry> for FlatEntry {
    fn from(entry: &Entry) -> Self {
        FlatEntry {
            key: entry.key().to_string(),
            translation: entry.translation().to_string(),
            comment: entry.comment().map(str::to_string),
            types: entry.types().to_vec(),
            params: Params::new(entry.types()),
        }
    }
}

/// A translation placed at the end of its key path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeafEntry {
    /// Last segment of the key, the accessor's own name.
    pub name: String,
    /// The full, unsplit key.
    pub key: String,
    pub translation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub types: Vec<PlaceholderType>,
    pub params: Params,
}

impl LeafEntry {
    fn new(entry: &Entry, name: &str) -> Self {
        LeafEntry {
            name: name.to_string(),
            key: entry.key().to_string(),
            translation: entry.translation().to_string(),
            comment: entry.comment().map(str::to_string),
            types: entry.types().to_vec(),
            params: Params::new(entry.types()),
        }
    }
}

/// A node of the namespace tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Node {
    Leaf(LeafEntry),
    Namespace(Namespace),
}

impl Node {
    pub fn as_leaf(&self) -> Option<&LeafEntry> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Namespace(_) => None,
        }
    }

    pub fn as_namespace(&self) -> Option<&Namespace> {
        match self {
            Node::Namespace(namespace) => Some(namespace),
            Node::Leaf(_) => None,
        }
    }
}

/// Named children in insertion order.
///
/// Serializes as `{ "children": { "<name>": <node>, ... } }`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Namespace {
    children: Vec<(String, Node)>,
}

impl Namespace {
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|(child, _)| child == name)
            .map(|(_, node)| node)
    }

    /// Iterates children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Keys of every leaf below this namespace, depth first.
    pub fn leaf_keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        for (_, node) in &self.children {
            match node {
                Node::Leaf(leaf) => keys.push(leaf.key.as_str()),
                Node::Namespace(namespace) => keys.extend(namespace.leaf_keys()),
            }
        }
        keys
    }

    /// The leaf closest to this namespace, ties broken by the smallest key.
    ///
    /// Unlike child order, the answer does not depend on insertion order.
    pub fn shallowest_leaf(&self) -> Option<&LeafEntry> {
        let mut level = vec![self];
        while !level.is_empty() {
            let mut leaves = Vec::new();
            let mut next = Vec::new();
            for (_, node) in level.iter().copied().flat_map(|ns| ns.children.iter()) {
                match node {
                    Node::Leaf(leaf) => leaves.push(leaf),
                    Node::Namespace(namespace) => next.push(namespace),
                }
            }
            if let Some(leaf) = leaves.into_iter().min_by(|a, b| a.key.cmp(&b.key)) {
                return Some(leaf);
            }
            level = next;
        }
        None
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|(child, _)| child == name)
    }
}

impl Serialize for Namespace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Children<'a>(&'a [(String, Node)]);

        impl Serialize for Children<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (name, node) in self.0 {
                    map.serialize_entry(name, node)?;
                }
                map.end()
            }
        }

        let mut state = serializer.serialize_struct("Namespace", 1)?;
        state.serialize_field("children", &Children(&self.children))?;
        state.end()
    }
}

/// A leaf that could not be placed in the tree because another entry claimed
/// its path with the opposite role.
///
/// `path` and `winning_key` are read off the finished tree, so they are the
/// same whatever order the keys came in. Under `PreferLeaf` the winner is the
/// leaf sitting on a prefix of the shadowed key; under `PreferNamespace` it is
/// the [shallowest leaf](Namespace::shallowest_leaf) of the namespace at the
/// shadowed key's path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralConflict {
    /// Key path, joined with the delimiter, where the roles collide.
    pub path: String,
    /// Key of the entry missing from the tree.
    pub shadowed_key: String,
    /// Key of an entry that occupies the path instead.
    pub winning_key: String,
    pub policy: ConflictPolicy,
}

impl Display for StructuralConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "key `{}` is shadowed by `{}` at `{}`",
            self.shadowed_key, self.winning_key, self.path
        )
    }
}

/// A built context together with the conflicts found while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOutput {
    pub context: StringsContext,
    /// Shadowed entries, in entry order.
    pub conflicts: Vec<StructuralConflict>,
    /// Keys kept out of the tree because splitting them yields an empty
    /// segment (`a..b`, `.x`, `y.`), in entry order.
    pub skipped_keys: Vec<String>,
}

/// Builds the context for `entries` without modifying them.
pub fn build_context(entries: &[Entry], options: &ContextOptions) -> ContextOutput {
    let mut root = Namespace::default();
    let mut placed = Vec::new();
    let mut skipped_keys = Vec::new();

    for entry in entries {
        let segments: Vec<&str> = entry.key_segments(options.delimiter).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            tracing::warn!(key = entry.key(), "key has an empty segment, left out of the tree");
            skipped_keys.push(entry.key().to_string());
            continue;
        }
        insert(&mut root, entry, &segments, options.conflict_policy);
        placed.push((entry, segments));
    }

    let conflicts: Vec<StructuralConflict> = placed
        .iter()
        .filter_map(|(entry, segments)| locate_conflict(&root, entry, segments, options))
        .collect();

    for conflict in &conflicts {
        tracing::warn!(
            path = %conflict.path,
            shadowed = %conflict.shadowed_key,
            winner = %conflict.winning_key,
            "structural conflict in strings keys"
        );
    }

    ContextOutput {
        context: StringsContext {
            strings: StringsTable {
                enum_name: options.enum_name.clone(),
                entries: entries.iter().map(FlatEntry::from).collect(),
                structured_entries: root,
            },
        },
        conflicts,
        skipped_keys,
    }
}

fn insert(root: &mut Namespace, entry: &Entry, segments: &[&str], policy: ConflictPolicy) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = root;
    for segment in parents {
        let index = match current.position(segment) {
            Some(index) => index,
            None => {
                current
                    .children
                    .push((segment.to_string(), Node::Namespace(Namespace::default())));
                current.children.len() - 1
            }
        };

        if matches!(current.children[index].1, Node::Leaf(_)) {
            match policy {
                ConflictPolicy::PreferNamespace => {
                    current.children[index].1 = Node::Namespace(Namespace::default());
                }
                ConflictPolicy::PreferLeaf => return,
            }
        }

        let Node::Namespace(namespace) = &mut current.children[index].1 else {
            return;
        };
        current = namespace;
    }

    let leaf = Node::Leaf(LeafEntry::new(entry, last));
    match current.position(last) {
        None => current.children.push((last.to_string(), leaf)),
        Some(index) => {
            let is_namespace = matches!(current.children[index].1, Node::Namespace(_));
            if is_namespace && policy == ConflictPolicy::PreferNamespace {
                return;
            }
            current.children[index].1 = leaf;
        }
    }
}

/// Walks the finished tree along `segments` and reports why `entry` is not
/// the leaf found there, if it is not.
fn locate_conflict(
    root: &Namespace,
    entry: &Entry,
    segments: &[&str],
    options: &ContextOptions,
) -> Option<StructuralConflict> {
    let mut current = root;
    for (depth, segment) in segments.iter().enumerate() {
        let winner = match current.get(segment)? {
            Node::Leaf(leaf) if leaf.key == entry.key() => return None,
            Node::Leaf(leaf) => leaf,
            Node::Namespace(namespace) if depth + 1 == segments.len() => {
                namespace.shallowest_leaf()?
            }
            Node::Namespace(namespace) => {
                current = namespace;
                continue;
            }
        };

        let delimiter = options.delimiter.to_string();
        return Some(StructuralConflict {
            path: segments[..=depth].join(delimiter.as_str()),
            shadowed_key: entry.key().to_string(),
            winning_key: winner.key.clone(),
            policy: options.conflict_policy,
        });
    }
    None
}
