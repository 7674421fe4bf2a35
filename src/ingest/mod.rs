//! Source → comment stream ingestion.
//!
//! This module handles reading Ruby source buffers and lexing them with
//! tree-sitter into the ordered comment stream the rewrite engine consumes.

pub mod ruby;

use std::path::Path;

pub use ruby::{extract_ruby_comments, RubyComment};

/// Detect whether a path names a Ruby source file.
///
/// Table-driven: known extensions plus well-known extensionless file names.
/// Unknown paths return false, never infer from content.
///
/// # Examples
///
/// ```
/// # use unfurl::ingest::is_ruby_source;
/// # use std::path::Path;
/// assert!(is_ruby_source(Path::new("app/models/user.rb")));
/// assert!(is_ruby_source(Path::new("Rakefile")));
/// assert!(!is_ruby_source(Path::new("main.rs")));
/// ```
pub fn is_ruby_source(path: &Path) -> bool {
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        return matches!(extension, "rb" | "rake" | "gemspec" | "ru");
    }

    // Extensionless names (case-sensitive)
    matches!(
        path.file_name().and_then(|n| n.to_str()),
        Some("Rakefile") | Some("Gemfile") | Some("Guardfile")
    )
}
