//! Integration tests for Ruby comment extraction.
//!
//! These tests validate that the comment stream is byte-accurate, ordered,
//! and token-aware: nothing inside string or heredoc literals is ever
//! reported as a comment.

use std::path::Path;

use unfurl::ingest::{extract_ruby_comments, is_ruby_source, RubyComment};

fn extract(source: &str) -> Vec<RubyComment> {
    extract_ruby_comments(Path::new("test.rb"), source.as_bytes())
        .expect("Failed to extract comments")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_stream_is_ordered_with_accurate_spans() {
        let source = "\
# leading comment\n\
class User\n  \
def name # trailing\n    \
@name\n  \
end\nend\n";

        let comments = extract(source);
        assert_eq!(comments.len(), 2);

        let leading = &comments[0];
        assert_eq!(leading.text, "# leading comment");
        assert_eq!(leading.byte_start, 0);
        assert_eq!(leading.byte_end, "# leading comment".len());
        assert_eq!(leading.line, 1);

        let trailing = &comments[1];
        assert_eq!(trailing.text, "# trailing");
        assert_eq!(trailing.line, 3);
        assert_eq!(
            &source[trailing.byte_start..trailing.byte_end],
            "# trailing"
        );
    }

    #[test]
    fn test_interpolated_string_hash_is_not_a_comment() {
        let source = "puts \"value: #{x} # not a comment\"\n";
        assert!(extract(source).is_empty());
    }

    #[test]
    fn test_single_quoted_string_hash_is_not_a_comment() {
        let source = "x = 'a # b'\ny = 2 # real\n";
        let comments = extract(source);

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text, "# real");
        assert_eq!(comments[0].line, 2);
    }

    #[test]
    fn test_squiggly_heredoc_content_is_not_a_comment() {
        let source = "text = <<~SQL\n  SELECT 1 -- # rubocop:disable Lint/X\nSQL\n";
        assert!(extract(source).is_empty());
    }

    #[test]
    fn test_plain_heredoc_content_is_not_a_comment() {
        let source = "text = <<HEREDOC\nfoo # rubocop:disable Lint/X\nHEREDOC\n";
        assert!(extract(source).is_empty());
    }

    #[test]
    fn test_comment_after_heredoc_open_is_reported() {
        let source = "text = <<~FOO # real comment\n  body\nFOO\n";
        let comments = extract(source);

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text, "# real comment");
        assert_eq!(comments[0].line, 1);
    }

    #[test]
    fn test_multibyte_source_keeps_byte_offsets() {
        let source = "name = \"Łukasz\" # note\n";
        let comments = extract(source);

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].byte_start, source.find("# note").expect("comment"));
        assert_eq!(&source[comments[0].byte_start..comments[0].byte_end], "# note");
    }

    #[test]
    fn test_comments_survive_syntax_errors() {
        // Extraction is used on files as they are, not as they should be.
        let source = "def broken(\n  x = 1 # still a comment\n";
        let comments = extract(source);

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text, "# still a comment");
    }

    #[test]
    fn test_ruby_source_detection() {
        assert!(is_ruby_source(Path::new("app/models/user.rb")));
        assert!(is_ruby_source(Path::new("tasks/build.rake")));
        assert!(is_ruby_source(Path::new("Gemfile")));
        assert!(!is_ruby_source(Path::new("src/lib.rs")));
        assert!(!is_ruby_source(Path::new("notes.txt")));
    }
}
