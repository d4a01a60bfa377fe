//! YAML localization files: a nested mapping whose keys and leaves are coerced to text

use super::{FormatError, FormatResult};
use crate::tree::{LocalizationTree, TreeNode};
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Parse a YAML document whose root is a mapping
pub fn parse(content: &str, path: &Path) -> FormatResult<LocalizationTree> {
    let yaml: Value = serde_yaml::from_str(content).map_err(|e| FormatError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    match yaml {
        Value::Mapping(mapping) => Ok(tree_from_mapping(mapping)),
        // An empty document is an empty mapping
        Value::Null => Ok(LocalizationTree::new()),
        _ => Err(FormatError::InvalidShape {
            path: path.to_path_buf(),
            message: "root must be a mapping".to_string(),
        }),
    }
}

fn tree_from_mapping(mapping: Mapping) -> LocalizationTree {
    mapping
        .into_iter()
        .map(|(key, value)| (scalar_text(&key), node_from_value(value)))
        .collect()
}

/// Convert a YAML value into a tree node, coercing scalars to strings
pub fn node_from_value(value: Value) -> TreeNode {
    match value {
        Value::Mapping(mapping) => TreeNode::Branch(tree_from_mapping(mapping)),
        Value::Tagged(tagged) => node_from_value(tagged.value),
        other => TreeNode::Leaf(scalar_text(&other)),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        // Sequences and mappings used as scalars keep their JSON text
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

pub fn render(tree: &LocalizationTree, path: &Path) -> FormatResult<String> {
    serde_yaml::to_string(tree).map_err(|e| FormatError::Serialize {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
