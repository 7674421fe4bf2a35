//! Ruby-specific tree-sitter parsing logic.
//!
//! This module contains tree-sitter-ruby integration for extracting the
//! ordered comment stream with byte spans. Extraction walks the parse tree,
//! so directive-shaped text inside string or heredoc literals is never
//! classified as a comment.

use crate::error::{Result, UnfurlError};
use std::path::Path;

/// A single comment lexed from a Ruby source buffer.
///
/// `text` is the raw comment content including the leading `#`. Offsets are
/// absolute byte positions into the buffer the comment was lexed from; `line`
/// is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubyComment {
    /// Raw comment text, including the leading `#`.
    pub text: String,
    /// Start byte offset (inclusive).
    pub byte_start: usize,
    /// End byte offset (exclusive).
    pub byte_end: usize,
    /// 1-based line number of the comment's first character.
    pub line: usize,
}

/// Extract the ordered comment stream from a Ruby source buffer.
///
/// Uses tree-sitter-ruby to parse the buffer and collect every `comment`
/// node in source order. Returns line comments (`# ...`) and embedded
/// documentation blocks (`=begin`/`=end`); the latter never begin with `#`
/// and so never qualify as directives downstream.
pub fn extract_ruby_comments(path: &Path, source: &[u8]) -> Result<Vec<RubyComment>> {
    // Create tree-sitter parser for Ruby
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_ruby::language())
        .map_err(|e| UnfurlError::Parse {
            file: path.to_path_buf(),
            message: format!("Failed to set Ruby language: {:?}", e),
        })?;

    // Parse the source code
    let tree = parser.parse(source, None).ok_or_else(|| UnfurlError::Parse {
        file: path.to_path_buf(),
        message: "Parse failed - no tree returned".to_string(),
    })?;

    let text = std::str::from_utf8(source)?;

    // Collect comment nodes in a pre-order walk (source order)
    let mut comments = Vec::new();
    collect_comments(tree.root_node(), text, &mut comments);

    Ok(comments)
}

/// Collect comment nodes from the AST.
fn collect_comments(node: tree_sitter::Node, source: &str, comments: &mut Vec<RubyComment>) {
    if node.kind() == "comment" {
        let byte_start = node.start_byte();
        let byte_end = node.end_byte();

        if let Some(text) = source.get(byte_start..byte_end) {
            comments.push(RubyComment {
                text: text.to_string(),
                byte_start,
                byte_end,
                line: node.start_position().row + 1,
            });
        }
        // A comment node has no children worth visiting.
        return;
    }

    // Recursively process children
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_comments(child, source, comments);
    }
}
