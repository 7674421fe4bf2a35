//! Integration tests for the directive rewrite engine.
//!
//! These tests validate the full in-memory pipeline:
//! comment extraction → detection → edit construction → edit application.

use std::path::Path;

use unfurl::ingest::extract_ruby_comments;
use unfurl::rewrite::{
    rewrite_directives, scan_directives, DirectiveConfig, Edit, EditSet, MSG,
};

/// Run the whole pipeline over a buffer and return the corrected text.
fn corrected(source: &str) -> String {
    let comments = extract_ruby_comments(Path::new("test.rb"), source.as_bytes())
        .expect("Failed to extract comments");
    let rewrites = rewrite_directives(source, &comments, &DirectiveConfig::default());

    let edits: Vec<Edit> = rewrites.into_iter().flat_map(|r| r.edits).collect();
    let edit_set = EditSet::from_edits(Path::new("test.rb"), edits, source)
        .expect("Failed to build edit set");
    edit_set.apply(source)
}

/// Number of same-line directives detected in a buffer.
fn match_count(source: &str) -> usize {
    let comments = extract_ruby_comments(Path::new("test.rb"), source.as_bytes())
        .expect("Failed to extract comments");
    scan_directives(source, &comments, &DirectiveConfig::default()).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scenario A: a bare end-of-line disable moves into block form.
    #[test]
    fn test_end_of_line_disable_is_rewritten() {
        let source = "foo # rubocop:disable Lint/SomeLint\n";

        assert_eq!(match_count(source), 1);
        assert_eq!(
            corrected(source),
            "# rubocop:disable Lint/SomeLint\nfoo\n# rubocop:enable Lint/SomeLint\n"
        );
    }

    /// Scenario B: the inserted lines carry the host line's indentation.
    #[test]
    fn test_indentation_is_preserved() {
        let source = "def method\n  foo # rubocop:disable Lint/SomeLint\nend\n";

        assert_eq!(
            corrected(source),
            "def method\n  \
             # rubocop:disable Lint/SomeLint\n  \
             foo\n  \
             # rubocop:enable Lint/SomeLint\nend\n"
        );
    }

    /// Scenario B for tab indentation.
    #[test]
    fn test_tab_indentation_is_preserved() {
        let source = "def method\n\tfoo # rubocop:disable Lint/SomeLint\nend\n";

        assert_eq!(
            corrected(source),
            "def method\n\t# rubocop:disable Lint/SomeLint\n\tfoo\n\t# rubocop:enable Lint/SomeLint\nend\n"
        );
    }

    /// Scenario C: standalone directives are already in the accepted form.
    #[test]
    fn test_standalone_directives_are_left_alone() {
        let source = "# rubocop:disable Lint/SomeLint\nfoo\n# rubocop:enable Lint/SomeLint\n";

        assert_eq!(match_count(source), 0);
        assert_eq!(corrected(source), source);
    }

    /// Scenario D: directive-shaped text inside a heredoc body never matches.
    #[test]
    fn test_heredoc_body_is_immune() {
        let source = "text = <<~FOO\n  foo # rubocop:disable Lint/SomeLint\nFOO\n";

        assert_eq!(match_count(source), 0);
        assert_eq!(corrected(source), source);
    }

    /// Directive-shaped text inside a string literal never matches,
    /// regardless of indentation.
    #[test]
    fn test_string_literal_is_immune() {
        let source = "x = \"foo # rubocop:disable Lint/SomeLint\"\n";
        assert_eq!(match_count(source), 0);

        let indented = "def m\n    y = 'bar # rubocop:todo Lint/SomeLint'\nend\n";
        assert_eq!(match_count(indented), 0);
    }

    /// The transform is a fixed point: rewritten output scans clean.
    #[test]
    fn test_rewrite_is_a_fixed_point() {
        let source = "def method\n  foo # rubocop:disable Lint/SomeLint\n  bar # rubocop:todo Style/Other\nend\n";

        let output = corrected(source);
        assert_eq!(match_count(&output), 0);
        // A second pass changes nothing.
        assert_eq!(corrected(&output), output);
    }

    /// Keyword symmetry: disable pairs with enable, and the cop-name list is
    /// carried over unchanged.
    #[test]
    fn test_keyword_symmetry_preserves_cop_list() {
        let source = "foo # rubocop:disable Lint/SomeLint, Style/Other\n";

        assert_eq!(
            corrected(source),
            "# rubocop:disable Lint/SomeLint, Style/Other\n\
             foo\n\
             # rubocop:enable Lint/SomeLint, Style/Other\n"
        );
    }

    /// A todo directive opens with todo and closes with enable.
    #[test]
    fn test_todo_closes_with_enable() {
        let source = "foo # rubocop:todo Lint/SomeLint\n";

        assert_eq!(
            corrected(source),
            "# rubocop:todo Lint/SomeLint\nfoo\n# rubocop:enable Lint/SomeLint\n"
        );
    }

    /// Several directives in one buffer are rewritten independently.
    #[test]
    fn test_multiple_directives_in_one_buffer() {
        let source = "\
class C\n  \
def a\n    \
foo # rubocop:disable Lint/A\n  \
end\n\n  \
def b\n    \
bar # rubocop:disable Lint/B\n  \
end\nend\n";

        assert_eq!(match_count(source), 2);

        let output = corrected(source);
        assert_eq!(match_count(&output), 0);
        assert!(output.contains("    # rubocop:disable Lint/A\n    foo\n    # rubocop:enable Lint/A\n"));
        assert!(output.contains("    # rubocop:disable Lint/B\n    bar\n    # rubocop:enable Lint/B\n"));
    }

    /// Extra blanks between code and comment are swallowed by the deletion.
    #[test]
    fn test_whitespace_before_comment_is_removed() {
        let source = "foo      # rubocop:disable Lint/SomeLint\n";

        assert_eq!(
            corrected(source),
            "# rubocop:disable Lint/SomeLint\nfoo\n# rubocop:enable Lint/SomeLint\n"
        );
    }

    /// Non-directive comments and directive-like prefixes are not matched.
    #[test]
    fn test_non_directives_are_ignored() {
        assert_eq!(match_count("foo # plain comment\n"), 0);
        assert_eq!(match_count("foo # rubocop:disable\n"), 0);
        assert_eq!(match_count("foo # rubocop:unknown Lint/X\n"), 0);
        assert_eq!(match_count("foo # RuboCop:disable Lint/X\n"), 0);
    }

    /// Every finding carries the fixed message and the comment's position.
    #[test]
    fn test_finding_message_and_position() {
        let source = "def m\n  foo # rubocop:disable Lint/SomeLint\nend\n";
        let comments = extract_ruby_comments(Path::new("test.rb"), source.as_bytes())
            .expect("Failed to extract comments");
        let rewrites = rewrite_directives(source, &comments, &DirectiveConfig::default());

        assert_eq!(rewrites.len(), 1);
        let finding = &rewrites[0].finding;
        assert_eq!(
            finding.message,
            "Use multiline rubocop directives instead of end-of-line comments."
        );
        assert_eq!(finding.message, MSG);
        assert_eq!(finding.line, 2);
        assert_eq!(
            finding.byte_start,
            source.find("# rubocop").expect("directive")
        );
        assert_eq!(finding.byte_end, source.find("\nend").expect("line end"));
    }

    /// Edit groups are emitted in ascending source order across matches.
    #[test]
    fn test_edit_groups_are_ordered_and_disjoint() {
        let source = "a # rubocop:disable Lint/A\nb # rubocop:disable Lint/B\n";
        let comments = extract_ruby_comments(Path::new("test.rb"), source.as_bytes())
            .expect("Failed to extract comments");
        let rewrites = rewrite_directives(source, &comments, &DirectiveConfig::default());
        assert_eq!(rewrites.len(), 2);

        let edits: Vec<Edit> = rewrites.into_iter().flat_map(|r| r.edits).collect();
        let edit_set = EditSet::from_edits(Path::new("test.rb"), edits, source)
            .expect("Edit groups must not overlap");

        let starts: Vec<usize> = edit_set.edits().iter().map(|e| e.start).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);
    }

    /// A custom marker rewrites its own directives and nothing else.
    #[test]
    fn test_custom_config_round_trip() {
        let config = DirectiveConfig {
            marker: "# lint:".to_string(),
            actions: vec!["off".to_string()],
        };
        let source = "  foo # lint:off Checks/All\n";
        let comments = extract_ruby_comments(Path::new("test.rb"), source.as_bytes())
            .expect("Failed to extract comments");

        let rewrites = rewrite_directives(source, &comments, &config);
        assert_eq!(rewrites.len(), 1);

        let edits: Vec<Edit> = rewrites.into_iter().flat_map(|r| r.edits).collect();
        let edit_set = EditSet::from_edits(Path::new("test.rb"), edits, source)
            .expect("Failed to build edit set");
        assert_eq!(
            edit_set.apply(source),
            "  # lint:off Checks/All\n  foo\n  # lint:enable Checks/All\n"
        );
    }
}
