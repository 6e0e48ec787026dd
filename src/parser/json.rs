//! JSON key path lookup backed by tree-sitter

use std::ops::Range;

use tree_sitter::Node;
use tracing::warn;

/// Returns the byte range of the value found at `path` in a JSON document.
pub fn property_range(text: &str, path: &[&str]) -> Option<Range<usize>> {
    if path.is_empty() {
        return None;
    }

    let mut parser = tree_sitter::Parser::new();
    let language = tree_sitter_json::LANGUAGE;
    if let Err(e) = parser.set_language(&language.into()) {
        warn!("Failed to set JSON language for tree-sitter: {}", e);
        return None;
    }

    let tree = parser.parse(text, None)?;
    let root = tree.root_node();

    let mut cursor = root.walk();
    let mut node = root.named_children(&mut cursor).find(|n| n.kind() != "comment")?;

    for segment in path {
        node = match node.kind() {
            "object" => object_value(node, segment, text)?,
            "array" => {
                let index: usize = segment.parse().ok()?;
                let mut cursor = node.walk();
                node.named_children(&mut cursor)
                    .filter(|n| n.kind() != "comment")
                    .nth(index)?
            }
            _ => return None,
        };
    }

    Some(node.byte_range())
}

fn object_value<'a>(object: Node<'a>, key: &str, text: &str) -> Option<Node<'a>> {
    let mut cursor = object.walk();

    for pair in object.named_children(&mut cursor) {
        if pair.kind() != "pair" {
            continue;
        }

        let Some(key_node) = pair.child_by_field_name("key") else {
            continue;
        };

        if string_value(key_node, text) == key {
            return pair.child_by_field_name("value");
        }
    }

    None
}

/// Get the string value from a string node (removes quotes)
fn string_value<'t>(node: Node<'_>, text: &'t str) -> &'t str {
    text[node.byte_range()]
        .trim()
        .trim_start_matches('"')
        .trim_end_matches('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCORES: &str = r#"{
  "avg_prec": 0.89,
  "roc": { "auc": 0.92, "thresholds": [0.1, 0.5] }
}"#;

    #[test]
    fn property_range_finds_top_level_value() {
        let range = property_range(SCORES, &["avg_prec"]).unwrap();

        assert_eq!(&SCORES[range], "0.89");
    }

    #[test]
    fn property_range_finds_nested_value() {
        let range = property_range(SCORES, &["roc", "auc"]).unwrap();

        assert_eq!(&SCORES[range], "0.92");
    }

    #[test]
    fn property_range_indexes_arrays() {
        let range = property_range(SCORES, &["roc", "thresholds", "1"]).unwrap();

        assert_eq!(&SCORES[range], "0.5");
    }

    #[test]
    fn property_range_returns_none_for_missing_path() {
        assert_eq!(property_range(SCORES, &["roc", "f1"]), None);
        assert_eq!(property_range(SCORES, &["avg_prec", "x"]), None);
        assert_eq!(property_range(SCORES, &[]), None);
    }
}
