//! JSON localization files: a nested object whose leaves are coerced to text

use super::{FormatError, FormatResult};
use crate::tree::{LocalizationTree, TreeNode};
use serde_json::Value;
use std::path::Path;

/// Parse a JSON document whose root is an object
pub fn parse(content: &str, path: &Path) -> FormatResult<LocalizationTree> {
    let json: Value = serde_json::from_str(content).map_err(|e| FormatError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    match json {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, value)| (key, node_from_value(value)))
            .collect()),
        _ => Err(FormatError::InvalidShape {
            path: path.to_path_buf(),
            message: "root must be an object".to_string(),
        }),
    }
}

/// Convert a JSON value into a tree node, coercing scalars to strings
pub fn node_from_value(value: Value) -> TreeNode {
    match value {
        Value::Object(map) => TreeNode::Branch(
            map.into_iter()
                .map(|(key, value)| (key, node_from_value(value)))
                .collect(),
        ),
        Value::String(s) => TreeNode::Leaf(s),
        Value::Null => TreeNode::Leaf(String::new()),
        // Numbers, booleans and arrays keep their JSON text
        other => TreeNode::Leaf(other.to_string()),
    }
}

pub fn render(tree: &LocalizationTree, path: &Path) -> FormatResult<String> {
    serde_json::to_string_pretty(tree).map_err(|e| FormatError::Serialize {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let tree = parse(r#"{"a": {"b": "Hello"}, "c": "World"}"#, Path::new("t.json")).unwrap();
        match tree.get("a") {
            Some(TreeNode::Branch(a)) => assert_eq!(a.get("b"), Some(&TreeNode::leaf("Hello"))),
            other => panic!("Expected branch, got {:?}", other),
        }
        assert_eq!(tree.get("c"), Some(&TreeNode::leaf("World")));
    }

    #[test]
    fn test_parse_coerces_scalars() {
        let tree = parse(
            r#"{"count": 3, "ratio": 1.5, "enabled": true, "empty": null, "list": ["x", 1]}"#,
            Path::new("t.json"),
        )
        .unwrap();
        assert_eq!(tree["count"], TreeNode::leaf("3"));
        assert_eq!(tree["ratio"], TreeNode::leaf("1.5"));
        assert_eq!(tree["enabled"], TreeNode::leaf("true"));
        assert_eq!(tree["empty"], TreeNode::leaf(""));
        assert_eq!(tree["list"], TreeNode::leaf(r#"["x",1]"#));
    }

    #[test]
    fn test_parse_rejects_non_object_root() {
        let result = parse(r#"["a", "b"]"#, Path::new("t.json"));
        assert!(matches!(result, Err(FormatError::InvalidShape { .. })));
    }

    #[test]
    fn test_parse_malformed() {
        let result = parse(r#"{"a": "#, Path::new("t.json"));
        assert!(matches!(result, Err(FormatError::Parse { .. })));
    }

    #[test]
    fn test_render_sorted_keys() {
        let mut tree = LocalizationTree::new();
        tree.insert("zebra".to_string(), TreeNode::leaf("Z"));
        tree.insert("apple".to_string(), TreeNode::leaf("A"));
        let rendered = render(&tree, Path::new("t.json")).unwrap();
        let apple = rendered.find("apple").unwrap();
        let zebra = rendered.find("zebra").unwrap();
        assert!(apple < zebra);
    }
}
