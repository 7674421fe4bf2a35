//! Post-rewrite validation gates.
//!
//! Gates run against the rewritten file on disk. A failing gate makes the
//! caller roll the file back to its original bytes, so a rewrite either
//! lands whole and verified or not at all.

use crate::error::{Result, UnfurlError};
use crate::ingest::extract_ruby_comments;
use crate::rewrite::{scan_directives, DirectiveConfig};
use std::path::Path;

/// Run all gates in sequence.
///
/// 1. Tree-sitter reparse: the rewritten file must still be valid Ruby.
/// 2. Rescan: the rewrite must be a fixed point - zero remaining same-line
///    directives.
pub fn run_validation_gates(file_path: &Path, config: &DirectiveConfig) -> Result<()> {
    gate_reparse(file_path)?;
    gate_rescan(file_path, config)?;
    Ok(())
}

/// Tree-sitter reparse gate.
///
/// Validates that the rewritten file parses as Ruby without error nodes.
pub fn gate_reparse(file_path: &Path) -> Result<()> {
    let source = std::fs::read(file_path).map_err(|e| UnfurlError::Io {
        path: file_path.to_path_buf(),
        source: e,
    })?;

    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_ruby::language())
        .map_err(|e| UnfurlError::Parse {
            file: file_path.to_path_buf(),
            message: format!("Failed to set Ruby language: {:?}", e),
        })?;

    let tree = parser
        .parse(&source, None)
        .ok_or_else(|| UnfurlError::ParseValidationFailed {
            file: file_path.to_path_buf(),
            message: "Parse failed - no tree returned".to_string(),
        })?;

    if tree.root_node().has_error() {
        return Err(UnfurlError::ParseValidationFailed {
            file: file_path.to_path_buf(),
            message: "Tree-sitter detected syntax errors in rewritten file".to_string(),
        });
    }

    Ok(())
}

/// Rescan gate.
///
/// Re-extracts the comment stream and re-runs detection; any remaining
/// same-line directive means the rewrite did not converge.
pub fn gate_rescan(file_path: &Path, config: &DirectiveConfig) -> Result<()> {
    let source = std::fs::read(file_path).map_err(|e| UnfurlError::Io {
        path: file_path.to_path_buf(),
        source: e,
    })?;
    let text = std::str::from_utf8(&source)?;

    let comments = extract_ruby_comments(file_path, &source)?;
    let remaining = scan_directives(text, &comments, config).len();

    if remaining > 0 {
        return Err(UnfurlError::RescanFailed {
            file: file_path.to_path_buf(),
            remaining,
        });
    }

    Ok(())
}
