//! Word-level diff primitive

use crate::tree::HunkStatus;
use similar::{ChangeTag, TextDiff};

/// A run of text with a single status, as produced by a word diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub value: String,
    pub status: HunkStatus,
}

impl Segment {
    pub fn new(value: impl Into<String>, status: HunkStatus) -> Self {
        Self {
            value: value.into(),
            status,
        }
    }
}

/// Produces an ordered edit script between two strings.
///
/// Concatenating the `Unchanged` and `Added` segments must yield `to`, and the
/// `Unchanged` and `Removed` segments must yield `from`.
pub trait WordDiffEngine {
    fn diff_words(&self, from: &str, to: &str) -> Vec<Segment>;
}

/// Word diff backed by `similar`, with consecutive same-status tokens coalesced
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarWordDiff;

impl WordDiffEngine for SimilarWordDiff {
    fn diff_words(&self, from: &str, to: &str) -> Vec<Segment> {
        let diff = TextDiff::from_words(from, to);
        let mut segments: Vec<Segment> = Vec::new();

        for change in diff.iter_all_changes() {
            let status = match change.tag() {
                ChangeTag::Equal => HunkStatus::Unchanged,
                ChangeTag::Delete => HunkStatus::Removed,
                ChangeTag::Insert => HunkStatus::Added,
            };
            let value = change.value();
            if value.is_empty() {
                continue;
            }
            match segments.last_mut() {
                Some(last) if last.status == status => last.value.push_str(value),
                _ => segments.push(Segment::new(value, status)),
            }
        }

        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(segments: &[Segment], skip: HunkStatus) -> String {
        segments
            .iter()
            .filter(|s| s.status != skip)
            .map(|s| s.value.as_str())
            .collect()
    }

    #[test]
    fn test_segments_reconstruct_both_sides() {
        let from = "the cat sat\non the mat";
        let to = "the dog sat\non a mat\nquietly";
        let segments = SimilarWordDiff.diff_words(from, to);
        assert_eq!(side(&segments, HunkStatus::Added), from);
        assert_eq!(side(&segments, HunkStatus::Removed), to);
    }

    #[test]
    fn test_adjacent_tokens_are_coalesced() {
        let segments = SimilarWordDiff.diff_words("", "one two three");
        assert_eq!(segments, vec![Segment::new("one two three", HunkStatus::Added)]);
    }

    #[test]
    fn test_identical_inputs() {
        let segments = SimilarWordDiff.diff_words("same words", "same words");
        assert_eq!(segments, vec![Segment::new("same words", HunkStatus::Unchanged)]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(SimilarWordDiff.diff_words("", "").is_empty());
    }
}
