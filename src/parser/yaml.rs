//! YAML symbol lookup backed by tree-sitter
//!
//! Answers two questions about a YAML document: what symbol sits under a byte
//! offset, and where the value at a dotted key path lives.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tree_sitter::{Node, Tree};
use tracing::warn;

static FILE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w./\\-]*\.[A-Za-z]+").expect("valid file path regex"));
static VARIABLE_TEMPLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]*)\}").expect("valid template regex"));
static PROPERTY_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w-]+(?:\.[\w-]+)*").expect("valid property path regex"));
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\w-]+").expect("valid word regex"));

const SCALAR_KINDS: [&str; 3] = ["plain_scalar", "double_quote_scalar", "single_quote_scalar"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Scalar text that looks like a relative file path
    File,
    /// A word inside a dotted property path such as `train.epochs`
    Property,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlSymbol {
    /// File path, or the dotted path up to and including the word under the cursor
    pub name: String,
    pub kind: SymbolKind,
    /// Byte range of the symbol in the document
    pub range: Range<usize>,
}

pub(crate) fn parse(text: &str) -> Option<Tree> {
    let mut parser = tree_sitter::Parser::new();
    let language = tree_sitter_yaml::LANGUAGE;
    if let Err(e) = parser.set_language(&language.into()) {
        warn!("Failed to set YAML language for tree-sitter: {}", e);
        return None;
    }

    parser.parse(text, None)
}

/// Returns the candidate symbols under `offset`, a file symbol first (if any)
/// and then a property symbol (if any).
pub fn symbol_at(text: &str, offset: usize) -> Vec<YamlSymbol> {
    let Some(tree) = parse(text) else {
        return Vec::new();
    };

    let Some(scalar) = enclosing_scalar(tree.root_node(), offset) else {
        return Vec::new();
    };

    let content = scalar_content(scalar);
    let value = &text[content.clone()];
    let cursor = offset.saturating_sub(content.start).min(value.len());

    let mut symbols = Vec::new();
    symbols.extend(file_symbol(value, cursor, content.start));
    symbols.extend(property_symbol(value, cursor, content.start));
    symbols
}

/// Returns the byte range of the value found at `path`, walking mappings by
/// key and sequences by index.
pub fn property_range(text: &str, path: &[&str]) -> Option<Range<usize>> {
    let tree = parse(text)?;
    let mut node = tree.root_node();

    for (depth, segment) in path.iter().enumerate() {
        let container = unwrap_container(node)?;
        let is_last = depth + 1 == path.len();

        match container.kind() {
            "block_mapping" | "flow_mapping" => {
                let pair = mapping_pairs(container)
                    .into_iter()
                    .find(|pair| key_text(*pair, text).as_deref() == Some(*segment))?;
                match pair.child_by_field_name("value") {
                    Some(value) => node = value,
                    None if is_last => return pair.child_by_field_name("key").map(|k| k.byte_range()),
                    None => return None,
                }
            }
            "block_sequence" | "flow_sequence" => {
                let index: usize = segment.parse().ok()?;
                node = sequence_items(container).into_iter().nth(index)?;
            }
            _ => return None,
        }
    }

    if path.is_empty() {
        return None;
    }

    Some(node.byte_range())
}

fn enclosing_scalar(root: Node<'_>, offset: usize) -> Option<Node<'_>> {
    let mut current = root.descendant_for_byte_range(offset, offset);

    while let Some(node) = current {
        if SCALAR_KINDS.contains(&node.kind()) {
            return Some(node);
        }
        current = node.parent();
    }

    None
}

/// Byte range of a scalar without its surrounding quotes.
fn scalar_content(scalar: Node<'_>) -> Range<usize> {
    let range = scalar.byte_range();
    match scalar.kind() {
        "double_quote_scalar" | "single_quote_scalar" if range.len() >= 2 => {
            range.start + 1..range.end - 1
        }
        _ => range,
    }
}

fn file_symbol(value: &str, cursor: usize, base: usize) -> Option<YamlSymbol> {
    let found = FILE_PATH
        .find_iter(value)
        .find(|m| m.start() <= cursor && cursor <= m.end())?;

    Some(YamlSymbol {
        name: found.as_str().to_string(),
        kind: SymbolKind::File,
        range: base + found.start()..base + found.end(),
    })
}

fn property_symbol(value: &str, cursor: usize, base: usize) -> Option<YamlSymbol> {
    // Inside `${...}` only the expression counts
    let region = if VARIABLE_TEMPLATE.is_match(value) {
        let template = VARIABLE_TEMPLATE
            .captures_iter(value)
            .filter_map(|captures| captures.get(1))
            .find(|expression| expression.start() <= cursor && cursor <= expression.end())?;
        template.start()..template.end()
    } else {
        0..value.len()
    };

    let region_text = &value[region.clone()];
    let region_cursor = cursor - region.start;

    let segment = PROPERTY_PATH
        .find_iter(region_text)
        .find(|m| m.start() <= region_cursor && region_cursor <= m.end())?;

    let mut path = Vec::new();
    for word in WORD.find_iter(segment.as_str()) {
        path.push(word.as_str());

        let word_start = segment.start() + word.start();
        let word_end = segment.start() + word.end();
        if word_start <= region_cursor && region_cursor <= word_end {
            let start = base + region.start + word_start;
            return Some(YamlSymbol {
                name: path.join("."),
                kind: SymbolKind::Property,
                range: start..start + word.len(),
            });
        }
    }

    None
}

/// Descends through wrapper nodes until a mapping or sequence is reached.
fn unwrap_container(node: Node<'_>) -> Option<Node<'_>> {
    let mut node = node;

    loop {
        match node.kind() {
            "block_mapping" | "flow_mapping" | "block_sequence" | "flow_sequence" => {
                return Some(node);
            }
            "stream" | "document" | "block_node" | "flow_node" | "block_sequence_item" => {
                let mut cursor = node.walk();
                node = node
                    .named_children(&mut cursor)
                    .find(|child| child.kind() != "comment")?;
            }
            _ => return None,
        }
    }
}

fn mapping_pairs(mapping: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = mapping.walk();
    mapping
        .named_children(&mut cursor)
        .filter(|child| matches!(child.kind(), "block_mapping_pair" | "flow_pair"))
        .collect()
}

fn sequence_items(sequence: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = sequence.walk();
    sequence
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

fn key_text(pair: Node<'_>, text: &str) -> Option<String> {
    let key = pair.child_by_field_name("key")?;
    let raw = text[key.byte_range()].trim();

    Some(
        raw.trim_start_matches(['"', '\''])
            .trim_end_matches(['"', '\''])
            .to_string(),
    )
}
