//! Nested localization trees and their flat, dotted-key form
//!
//! Localization files nest messages in arbitrarily deep mappings:
//!
//! ```json
//! { "settings": { "title": "Settings", "save": "Save" }, "ok": "OK" }
//! ```
//!
//! The translation pipeline works on a flat view of the same data, where each
//! leaf is addressed by its dotted path (`settings.title`, `settings.save`, `ok`).
//! [`flatten`] and [`unflatten`] convert between the two shapes.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// A nested mapping from key to leaf string or further nesting.
///
/// Ordered so that writers emit keys in a stable, sorted order.
pub type LocalizationTree = BTreeMap<String, TreeNode>;

/// Dotted path to value. Iteration order is unspecified.
pub type FlatMap = HashMap<String, String>;

/// Separator between path segments of a flat key.
pub const KEY_SEPARATOR: char = '.';

/// A node of a [`LocalizationTree`]
///
/// Leaf values are always strings: readers coerce numbers, booleans and other
/// scalars to their textual form when building the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TreeNode {
    Leaf(String),
    Branch(LocalizationTree),
}

impl TreeNode {
    pub fn leaf(value: impl Into<String>) -> Self {
        TreeNode::Leaf(value.into())
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf(_))
    }
}

impl From<&str> for TreeNode {
    fn from(value: &str) -> Self {
        TreeNode::Leaf(value.to_string())
    }
}

impl From<LocalizationTree> for TreeNode {
    fn from(tree: LocalizationTree) -> Self {
        TreeNode::Branch(tree)
    }
}

/// Join a prefix and a key into a flat key
fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}{}{}", prefix, KEY_SEPARATOR, key)
    }
}

/// Flatten a tree into a map from dotted path to leaf value
///
/// Every key of `tree` is prefixed with `prefix` (pass `""` for the root).
/// Nested branches are flattened recursively with the extended prefix.
///
/// Two different paths can produce the same flat key, for example a literal
/// `"a.b"` key next to `{"a": {"b": ...}}`. The later write wins and a warning
/// is logged.
///
/// # Example
///
/// ```ignore
/// let flat = flatten(&tree, "");
/// assert_eq!(flat["settings.title"], "Settings");
/// ```
pub fn flatten(tree: &LocalizationTree, prefix: &str) -> FlatMap {
    // Levels holding only leaves need no recursion
    if tree.values().all(TreeNode::is_leaf) {
        let mut flat = FlatMap::with_capacity(tree.len());
        for (key, node) in tree {
            if let TreeNode::Leaf(value) = node {
                insert_flat(&mut flat, join_key(prefix, key), value.clone());
            }
        }
        return flat;
    }

    let mut flat = FlatMap::new();
    for (key, node) in tree {
        let full_key = join_key(prefix, key);
        match node {
            TreeNode::Leaf(value) => insert_flat(&mut flat, full_key, value.clone()),
            TreeNode::Branch(child) => {
                for (child_key, child_value) in flatten(child, &full_key) {
                    insert_flat(&mut flat, child_key, child_value);
                }
            }
        }
    }
    flat
}

fn insert_flat(flat: &mut FlatMap, key: String, value: String) {
    if let Some(previous) = flat.insert(key.clone(), value) {
        warn!(key = %key, previous = %previous, "flat key collision, keeping the later value");
    }
}

/// Rebuild a nested tree from a flat map
///
/// Each key is split on `.`; intermediate segments become branches and the
/// final segment holds the leaf. Keys without a separator become top-level
/// leaves. Malformed keys such as `a..b` are not validated and produce an
/// empty-named branch.
///
/// Keys are processed in sorted order. If a path runs through an existing
/// leaf (`a` and `a.b` both present), the leaf is replaced by a branch and a
/// warning is logged.
pub fn unflatten(flat: &FlatMap) -> LocalizationTree {
    let mut keys: Vec<&String> = flat.keys().collect();
    keys.sort();

    let mut root = LocalizationTree::new();
    'keys: for key in keys {
        let value = &flat[key];
        let segments: Vec<&str> = key.split(KEY_SEPARATOR).collect();
        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => continue,
        };

        let mut current = &mut root;
        for segment in parents {
            let node = current
                .entry(segment.to_string())
                .or_insert_with(|| TreeNode::Branch(LocalizationTree::new()));
            if node.is_leaf() {
                warn!(key = %key, segment = %segment, "leaf replaced by nested keys");
                *node = TreeNode::Branch(LocalizationTree::new());
            }
            let TreeNode::Branch(child) = node else {
                continue 'keys;
            };
            current = child;
        }

        match current.get(*last) {
            Some(TreeNode::Branch(_)) => {
                warn!(key = %key, "value dropped, key already holds nested keys");
            }
            _ => {
                current.insert(last.to_string(), TreeNode::Leaf(value.clone()));
            }
        }
    }
    root
}
