// src/facts.rs

//! Fact-path flattening into tag strings
//!
//! Host facts arrive as an arbitrarily nested tree (maps of scalars,
//! sequences, and further maps). A tag path spec is an ordered list of
//! dotted paths; each path that resolves to a scalar emits one `path:value`
//! tag, and a sequence fans out into one tag per element. Resolution tries
//! the full string as a literal top-level key before descending dotted
//! segments, so a key like `looks.like.a.path` wins over traversal.
//!
//! Flattening never fails: an unresolvable path simply contributes nothing.

use serde::Serialize;
use serde_yaml::Value;
use std::fmt;

/// Header fragment for the legacy comma-joined tag form (agent 5
/// `datadog.conf`), emitted once before any tag fragments.
pub const LEGACY_TAGS_HEADER: &str = "tags: ";

/// A single `path:value` tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub path: String,
    pub value: String,
}

impl Tag {
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Legacy comma-joined fragment form, independently addressable so a
    /// fragment can be appended without re-rendering the whole list.
    pub fn legacy_fragment(&self) -> String {
        format!("{}:{}, ", self.path, self.value)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.value)
    }
}

impl Serialize for Tag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Flatten a fact tree over an ordered path spec.
///
/// Output ordering is load-bearing: outer loop over path order, inner loop
/// over element order for fanned-out sequences.
pub fn flatten(facts: &Value, paths: &[String]) -> Vec<Tag> {
    let mut tags = Vec::new();
    for path in paths {
        if let Some(node) = lookup(facts, path) {
            emit(path, node, &mut tags);
        }
    }
    tags
}

/// Flatten general facts, then trusted-source facts, preserving stable
/// overall ordering (general paths first).
pub fn flatten_with_trusted(
    facts: &Value,
    paths: &[String],
    trusted_facts: &Value,
    trusted_paths: &[String],
) -> Vec<Tag> {
    let mut tags = flatten(facts, paths);
    tags.extend(flatten(trusted_facts, trusted_paths));
    tags
}

/// Render a tag list as the YAML sequence stored under the `tags:` key
pub fn tags_value(tags: &[Tag]) -> Value {
    Value::Sequence(tags.iter().map(|t| Value::String(t.to_string())).collect())
}

/// Resolve a path in the tree: literal full-string key first, then dotted
/// segment descent through nested maps.
fn lookup<'a>(facts: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(node) = facts.get(path) {
        return Some(node);
    }

    let mut node = facts;
    for segment in path.split('.') {
        node = node.get(segment)?;
    }
    Some(node)
}

/// Emit tags for a resolved node: one tag per scalar, one per sequence
/// element in original order, nothing for maps or non-scalar leaves.
fn emit(path: &str, node: &Value, tags: &mut Vec<Tag>) {
    match node {
        Value::Sequence(elements) => {
            for element in elements {
                if let Some(value) = scalar_string(element) {
                    tags.push(Tag::new(path, value));
                }
            }
        }
        _ => {
            if let Some(value) = scalar_string(node) {
                tags.push(Tag::new(path, value));
            }
        }
    }
}

/// Stringify a scalar leaf; maps, sequences, and nulls yield nothing
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
