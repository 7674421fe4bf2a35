//! Span-based text edits.
//!
//! An [`Edit`] replaces one byte range of the original buffer with literal
//! text; a zero-width range is an insertion and empty content is a deletion.
//! [`EditSet`] holds a validated, ascending, non-overlapping collection and
//! applies it in a single pass, so every offset refers to the original
//! buffer and no edit ever sees the result of another.

use crate::error::{Result, UnfurlError};
use ropey::Rope;
use std::path::Path;

/// A single span-based text mutation against the original buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive). Equal to `start` for insertions.
    pub end: usize,
    /// Replacement contents. Empty for deletions.
    pub content: String,
}

impl Edit {
    /// Insertion of `content` at byte offset `at`.
    pub fn insertion(at: usize, content: impl Into<String>) -> Self {
        Edit {
            start: at,
            end: at,
            content: content.into(),
        }
    }

    /// Deletion of the byte range `[start, end)`.
    pub fn deletion(start: usize, end: usize) -> Self {
        Edit {
            start,
            end,
            content: String::new(),
        }
    }

    /// True when this edit inserts without removing anything.
    pub fn is_insertion(&self) -> bool {
        self.start == self.end
    }
}

/// An ordered, validated set of non-overlapping edits for one buffer.
#[derive(Debug, Clone, Default)]
pub struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    /// Build a set from raw edits, validating against the buffer they target.
    ///
    /// Edits are sorted into ascending source order (stable for equal
    /// starts). Every span must lie inside the buffer on UTF-8 boundaries,
    /// and no two spans may overlap; adjacent spans (one ending where the
    /// next begins) are allowed. `file` is error context only.
    pub fn from_edits(file: &Path, mut edits: Vec<Edit>, source: &str) -> Result<Self> {
        edits.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

        let mut previous_end: Option<usize> = None;
        for edit in &edits {
            if edit.start > edit.end || source.get(edit.start..edit.end).is_none() {
                return Err(UnfurlError::InvalidSpan {
                    file: file.to_path_buf(),
                    start: edit.start,
                    end: edit.end,
                });
            }

            if let Some(prev_end) = previous_end {
                if edit.start < prev_end {
                    return Err(UnfurlError::OverlappingEdits {
                        file: file.to_path_buf(),
                    });
                }
            }
            previous_end = Some(edit.end);
        }

        Ok(EditSet { edits })
    }

    /// Borrow the edits in ascending source order.
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    /// Returns true when the set contains no work.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Number of edits in the set.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Total bytes removed across the set.
    pub fn bytes_removed(&self) -> usize {
        self.edits.iter().map(|e| e.end - e.start).sum()
    }

    /// Total bytes inserted across the set.
    pub fn bytes_added(&self) -> usize {
        self.edits.iter().map(|e| e.content.len()).sum()
    }

    /// Apply the set to the buffer it was validated against.
    ///
    /// Edits are applied back-to-front, so offsets computed against the
    /// original buffer stay valid without recomputation.
    pub fn apply(&self, source: &str) -> String {
        let mut rope = Rope::from_str(source);

        for edit in self.edits.iter().rev() {
            let start_char = rope.byte_to_char(edit.start);
            let end_char = rope.byte_to_char(edit.end);
            rope.remove(start_char..end_char);
            rope.insert(start_char, &edit.content);
        }

        rope.to_string()
    }
}
