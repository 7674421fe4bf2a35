//! End-of-line directive rewrite engine.
//!
//! Detects `# rubocop:disable`-style suppression comments that trail code on
//! the same line and builds span edits that move them into block form: one
//! directive line before the host line, one `enable` line after it. The
//! engine is pure: it consumes an immutable comment stream and returns edits
//! whose offsets all refer to the original, unmodified buffer.

pub mod edit;

use crate::ingest::RubyComment;
use ropey::Rope;
use serde::Serialize;

pub use edit::{Edit, EditSet};

/// Finding message reported for every qualifying comment.
pub const MSG: &str = "Use multiline rubocop directives instead of end-of-line comments.";

/// Directive comment syntax the engine recognizes.
///
/// The marker is the comment prefix up to the action keyword; actions are the
/// keywords accepted after it. Matching requires a space after the keyword,
/// mirroring the directive grammar rubocop itself accepts.
#[derive(Debug, Clone)]
pub struct DirectiveConfig {
    /// Comment prefix that opens a directive, e.g. `# rubocop:`.
    pub marker: String,
    /// Action keywords recognized after the marker.
    pub actions: Vec<String>,
}

impl Default for DirectiveConfig {
    fn default() -> Self {
        DirectiveConfig {
            marker: "# rubocop:".to_string(),
            actions: vec!["disable".to_string(), "todo".to_string()],
        }
    }
}

impl DirectiveConfig {
    /// Match a comment's text against the directive grammar.
    ///
    /// This is a prefix match on the comment's own text: the marker, then one
    /// of the configured actions, then a space. Returns the matched action.
    /// Comments that merely mention a directive mid-text do not match, and
    /// neither does a marker with an unrecognized or space-less keyword.
    pub fn match_action<'a>(&'a self, comment_text: &str) -> Option<&'a str> {
        let rest = comment_text.strip_prefix(self.marker.as_str())?;

        self.actions
            .iter()
            .find(|action| {
                rest.strip_prefix(action.as_str())
                    .is_some_and(|tail| tail.starts_with(' '))
            })
            .map(|action| action.as_str())
    }
}

/// A user-visible offense for one same-line directive comment.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    /// Fixed offense message.
    pub message: String,
    /// 1-based line of the offending comment.
    pub line: usize,
    /// Start byte offset of the comment.
    pub byte_start: usize,
    /// End byte offset of the comment.
    pub byte_end: usize,
}

/// A comment classified as a same-line suppression directive, with the line
/// geometry needed to rewrite it.
#[derive(Debug, Clone)]
pub struct DirectiveMatch {
    /// The offending comment.
    pub comment: RubyComment,
    /// The matched action keyword (`disable` or `todo` by default).
    pub action: String,
    /// Full directive text to hoist above the line (the whole comment).
    pub directive_text: String,
    /// Directive text with the action keyword replaced by `enable`.
    pub enable_text: String,
    /// Leading blanks of the host line.
    pub indent: String,
    /// Length of the blank run between the code and the comment.
    pub ws_before_comment: usize,
    /// Byte offset of the host line's first character.
    pub line_start: usize,
    /// Byte offset just past the host line's content (before its newline).
    pub line_content_end: usize,
}

impl DirectiveMatch {
    /// The offense reported for this match.
    pub fn finding(&self) -> Finding {
        Finding {
            message: MSG.to_string(),
            line: self.comment.line,
            byte_start: self.comment.byte_start,
            byte_end: self.comment.byte_end,
        }
    }

    /// Build the edit group for this match: one deletion (the trailing
    /// comment plus the blanks separating it from code) and two insertions
    /// (directive line before, enable line after). All offsets refer to the
    /// original buffer; the group is atomic.
    pub fn edits(&self) -> Vec<Edit> {
        let deletion_start = self.comment.byte_start - self.ws_before_comment;

        vec![
            Edit::insertion(
                self.line_start,
                format!("{}{}\n", self.indent, self.directive_text),
            ),
            Edit::deletion(deletion_start, self.comment.byte_end),
            Edit::insertion(
                self.line_content_end,
                format!("\n{}{}", self.indent, self.enable_text),
            ),
        ]
    }
}

/// One detected directive with its finding and edit group.
#[derive(Debug, Clone)]
pub struct DirectiveRewrite {
    /// The offense to report.
    pub finding: Finding,
    /// The three edits that move the directive into block form.
    pub edits: Vec<Edit>,
}

/// Scan a comment stream for same-line suppression directives.
///
/// A comment qualifies when its text matches the directive grammar AND the
/// host line carries code besides the comment: a line that, stripped of
/// surrounding whitespace, equals the comment text is a standalone directive
/// and is left alone. Comments are taken as lexed; text inside string or
/// heredoc literals never reaches this function.
pub fn scan_directives(
    source: &str,
    comments: &[RubyComment],
    config: &DirectiveConfig,
) -> Vec<DirectiveMatch> {
    let rope = Rope::from_str(source);
    let mut matches = Vec::new();

    for comment in comments {
        let Some(action) = config.match_action(&comment.text) else {
            continue;
        };

        let Some((line_start, line_content_end)) = line_span(source, &rope, comment.line) else {
            continue;
        };

        // Offsets from the lexer must land inside the host line.
        if comment.byte_start < line_start || comment.byte_end > line_content_end {
            continue;
        }

        let line_text = &source[line_start..line_content_end];

        // Standalone directive lines are already in the accepted form.
        if line_text.trim() == comment.text {
            continue;
        }

        let code_prefix = &line_text[..comment.byte_start - line_start];
        let ws_before_comment = code_prefix.len() - code_prefix.trim_end().len();

        let indent: String = line_text
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect();

        let after_action = &comment.text[config.marker.len() + action.len()..];
        let enable_text = format!("{}enable{}", config.marker, after_action);

        matches.push(DirectiveMatch {
            comment: comment.clone(),
            action: action.to_string(),
            directive_text: comment.text.clone(),
            enable_text,
            indent,
            ws_before_comment,
            line_start,
            line_content_end,
        });
    }

    matches
}

/// Scan and build edit groups in one pass.
///
/// Returns one [`DirectiveRewrite`] per detected same-line directive, in
/// ascending source order. Groups never overlap: each match touches only its
/// own host line.
pub fn rewrite_directives(
    source: &str,
    comments: &[RubyComment],
    config: &DirectiveConfig,
) -> Vec<DirectiveRewrite> {
    scan_directives(source, comments, config)
        .into_iter()
        .map(|m| DirectiveRewrite {
            finding: m.finding(),
            edits: m.edits(),
        })
        .collect()
}

/// Byte span of one line's content: `(start, end)` excluding the trailing
/// newline. Returns None for out-of-range line numbers.
fn line_span(source: &str, rope: &Rope, line: usize) -> Option<(usize, usize)> {
    let line_idx = line.checked_sub(1)?;
    if line_idx >= rope.len_lines() {
        return None;
    }

    let line_start = rope.line_to_byte(line_idx);
    let mut content_end = if line_idx + 1 < rope.len_lines() {
        rope.line_to_byte(line_idx + 1)
    } else {
        source.len()
    };

    let bytes = source.as_bytes();
    if content_end > line_start && bytes[content_end - 1] == b'\n' {
        content_end -= 1;
    }
    if content_end > line_start && bytes[content_end - 1] == b'\r' {
        content_end -= 1;
    }

    Some((line_start, content_end))
}
