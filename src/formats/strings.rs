//! Apple `.strings` files
//!
//! ```text
//! /* Title of the settings screen */
//! "settings.title" = "Settings";
//! "ok" = "OK";
//! ```
//!
//! Keys are read as-is, so a `.strings` file always yields a flat tree whose
//! keys may already contain dots.

use crate::tree::{FlatMap, LocalizationTree, TreeNode, flatten};
use regex::Regex;
use std::sync::LazyLock;

static KEY_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*"((?:[^"\\]|\\.)*)"\s*=\s*"((?:[^"\\]|\\.)*)"\s*;"#)
        .expect("key-value pattern is valid")
});

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(//|/\*|\*|--)").expect("comment pattern is valid"));

/// Parse `.strings` content into a flat tree
///
/// Lines starting with `//`, `/*`, `*` or `--` are comments. Lines that are
/// not `"key" = "value";` pairs are ignored.
pub fn parse(content: &str) -> LocalizationTree {
    let mut tree = LocalizationTree::new();
    for line in content.lines() {
        let line = line.trim();
        if COMMENT.is_match(line) {
            continue;
        }
        if let Some(captures) = KEY_VALUE.captures(line) {
            tree.insert(
                unescape(&captures[1]),
                TreeNode::Leaf(unescape(&captures[2])),
            );
        }
    }
    tree
}

/// Render a tree as `.strings` content, one line per flat key in sorted order
pub fn render(tree: &LocalizationTree) -> String {
    render_flat(&flatten(tree, ""))
}

/// Render flat keys as `.strings` content, one line per key in sorted order
pub fn render_flat(flat: &FlatMap) -> String {
    let mut keys: Vec<&String> = flat.keys().collect();
    keys.sort();

    let mut out = String::new();
    for key in keys {
        out.push_str(&format!("\"{}\" = \"{}\";\n", escape(key), escape(&flat[key])));
    }
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
