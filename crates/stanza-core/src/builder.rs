//! Rebuilds paragraph and line structure from a flat word-level edit script
//!
//! A word diff does not respect line boundaries: a single segment may span
//! several lines, and one line may be made of several segments with different
//! statuses. The builder scans every segment character by character and keeps
//! the open line and paragraph across segment boundaries, so a line can carry
//! an unchanged prefix, a removed word and an added word side by side.

use crate::engine::{Segment, SimilarWordDiff, WordDiffEngine};
use crate::tree::{DiffTree, Hunk, HunkStatus, Line, Paragraph, PARAGRAPH_SEPARATOR};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::LazyLock;

/// A newline run of two or more newlines, possibly with horizontal whitespace between
static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n)+").expect("blank-run pattern is valid"));

/// How runs of blank lines are turned into paragraph breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparatorPolicy {
    /// Any run of blank lines is a single paragraph break
    #[default]
    Collapse,
    /// Each extra blank line after the first produces an empty paragraph
    Preserve,
}

impl SeparatorPolicy {
    /// Rewrite blank-line runs into `\n\n` paragraph separators
    pub fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self {
            SeparatorPolicy::Collapse => BLANK_RUN.replace_all(text, PARAGRAPH_SEPARATOR),
            SeparatorPolicy::Preserve => BLANK_RUN.replace_all(text, |caps: &regex::Captures| {
                let newlines = caps[0].matches('\n').count();
                PARAGRAPH_SEPARATOR.repeat(newlines - 1)
            }),
        }
    }
}

/// Scanner state between characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Inside a line, or at the start of one
    #[default]
    ReadingLine,
    /// One newline seen; the next character decides line or paragraph break
    SawLineBreak,
}

/// Accumulates the tree while segments are fed in order
#[derive(Debug, Default)]
pub struct TreeAccumulator {
    state: ScanState,
    paragraphs: Vec<Paragraph>,
    paragraph: Paragraph,
    line: Line,
    pending: String,
}

impl TreeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Feed one already-normalized piece of text with its status
    pub fn feed(&mut self, text: &str, status: HunkStatus) {
        for c in text.chars() {
            self.step(c, status);
        }
        self.flush_hunk(status);
    }

    /// Advance the state machine by one character
    pub fn step(&mut self, c: char, status: HunkStatus) {
        match (self.state, c) {
            (ScanState::ReadingLine, '\n') => {
                self.state = ScanState::SawLineBreak;
            }
            (ScanState::ReadingLine, c) => {
                self.pending.push(c);
            }
            (ScanState::SawLineBreak, '\n') => {
                self.flush_hunk(status);
                self.close_line();
                self.close_paragraph();
                self.state = ScanState::ReadingLine;
            }
            (ScanState::SawLineBreak, c) => {
                self.flush_hunk(status);
                self.close_line();
                self.pending.push(c);
                self.state = ScanState::ReadingLine;
            }
        }
    }

    /// Close everything still open and return the tree
    pub fn finish(mut self) -> DiffTree {
        if self.state == ScanState::SawLineBreak {
            self.close_line();
        }
        let line = std::mem::take(&mut self.line);
        self.paragraph.push(line);
        self.paragraphs.push(self.paragraph);
        DiffTree::new(self.paragraphs)
    }

    fn flush_hunk(&mut self, status: HunkStatus) {
        if self.pending.is_empty() {
            return;
        }
        let content = std::mem::take(&mut self.pending);
        self.line.push(Hunk::new(content, status));
    }

    fn close_line(&mut self) {
        let line = std::mem::take(&mut self.line);
        self.paragraph.push(line);
    }

    fn close_paragraph(&mut self) {
        let paragraph = std::mem::take(&mut self.paragraph);
        self.paragraphs.push(paragraph);
    }
}

/// Word-diff `from` against `to` and rebuild the paragraph/line structure
pub fn tree_diff(from: &str, to: &str) -> DiffTree {
    tree_diff_with(&SimilarWordDiff, from, to, SeparatorPolicy::default())
}

/// [`tree_diff`] with an explicit engine and separator policy
pub fn tree_diff_with<E: WordDiffEngine + ?Sized>(
    engine: &E,
    from: &str,
    to: &str,
    policy: SeparatorPolicy,
) -> DiffTree {
    build_tree(&engine.diff_words(from, to), policy)
}

/// Build a tree from an edit script produced elsewhere
pub fn build_tree(segments: &[Segment], policy: SeparatorPolicy) -> DiffTree {
    let mut acc = TreeAccumulator::new();
    for segment in segments {
        if segment.value.is_empty() {
            continue;
        }
        acc.feed(&policy.normalize(&segment.value), segment.status);
    }
    acc.finish()
}

/// Split a single revision into an all-unchanged tree
pub fn simple_split(text: &str, policy: SeparatorPolicy) -> DiffTree {
    let mut acc = TreeAccumulator::new();
    acc.feed(&policy.normalize(text), HunkStatus::Unchanged);
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Side;

    fn line_texts(tree: &DiffTree) -> Vec<Vec<(String, HunkStatus)>> {
        tree.lines()
            .map(|l| {
                l.hunks()
                    .iter()
                    .map(|h| (h.content.clone(), h.status))
                    .collect()
            })
            .collect()
    }

    fn count_separators(text: &str) -> usize {
        SeparatorPolicy::Collapse
            .normalize(text)
            .matches(PARAGRAPH_SEPARATOR)
            .count()
    }

    #[test]
    fn test_collapse_policy() {
        let policy = SeparatorPolicy::Collapse;
        assert_eq!(policy.normalize("a\n\nb"), "a\n\nb");
        assert_eq!(policy.normalize("a\n  \n\t\nb"), "a\n\nb");
        assert_eq!(policy.normalize("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(policy.normalize("a\nb"), "a\nb");
    }

    #[test]
    fn test_preserve_policy() {
        let policy = SeparatorPolicy::Preserve;
        assert_eq!(policy.normalize("a\n \nb"), "a\n\nb");
        assert_eq!(policy.normalize("a\n\n\nb"), "a\n\n\n\nb");
        assert_eq!(policy.normalize("a\nb"), "a\nb");
    }

    #[test]
    fn test_preserve_policy_keeps_empty_paragraphs() {
        let collapsed = simple_split("a\n\n\nb", SeparatorPolicy::Collapse);
        assert_eq!(collapsed.len(), 2);

        let preserved = simple_split("a\n\n\nb", SeparatorPolicy::Preserve);
        assert_eq!(preserved.len(), 3);
        assert_eq!(preserved.paragraphs()[1].lines(), &[Line::default()]);
    }

    #[test]
    fn test_state_machine_transitions() {
        let mut acc = TreeAccumulator::new();
        acc.step('a', HunkStatus::Unchanged);
        assert_eq!(acc.state(), ScanState::ReadingLine);
        acc.step('\n', HunkStatus::Unchanged);
        assert_eq!(acc.state(), ScanState::SawLineBreak);
        acc.step('b', HunkStatus::Unchanged);
        assert_eq!(acc.state(), ScanState::ReadingLine);
        acc.step('\n', HunkStatus::Unchanged);
        acc.step('\n', HunkStatus::Unchanged);
        assert_eq!(acc.state(), ScanState::ReadingLine);

        let tree = acc.finish();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.text(Side::To), "a\nb\n\n");
    }

    #[test]
    fn test_mixed_statuses_share_a_line() {
        let segments = vec![
            Segment::new("the ", HunkStatus::Unchanged),
            Segment::new("cat", HunkStatus::Removed),
            Segment::new("dog", HunkStatus::Added),
            Segment::new(" sat\nstill", HunkStatus::Unchanged),
        ];
        let tree = build_tree(&segments, SeparatorPolicy::Collapse);
        assert_eq!(
            line_texts(&tree),
            vec![
                vec![
                    ("the ".to_string(), HunkStatus::Unchanged),
                    ("cat".to_string(), HunkStatus::Removed),
                    ("dog".to_string(), HunkStatus::Added),
                    (" sat".to_string(), HunkStatus::Unchanged),
                ],
                vec![("still".to_string(), HunkStatus::Unchanged)],
            ]
        );
    }

    #[test]
    fn test_segment_spanning_lines_and_paragraphs() {
        let segments = vec![
            Segment::new("keep ", HunkStatus::Unchanged),
            Segment::new("new\nwhole line\n\nnext par", HunkStatus::Added),
            Segment::new(" tail", HunkStatus::Unchanged),
        ];
        let tree = build_tree(&segments, SeparatorPolicy::Collapse);
        assert_eq!(tree.len(), 2);
        assert_eq!(
            line_texts(&tree),
            vec![
                vec![
                    ("keep ".to_string(), HunkStatus::Unchanged),
                    ("new".to_string(), HunkStatus::Added),
                ],
                vec![("whole line".to_string(), HunkStatus::Added)],
                vec![
                    ("next par".to_string(), HunkStatus::Added),
                    (" tail".to_string(), HunkStatus::Unchanged),
                ],
            ]
        );
    }

    #[test]
    fn test_newline_split_across_segments() {
        let segments = vec![
            Segment::new("a\n", HunkStatus::Unchanged),
            Segment::new("\nb", HunkStatus::Added),
        ];
        let tree = build_tree(&segments, SeparatorPolicy::Collapse);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.text(Side::To), "a\n\nb");
    }

    #[test]
    fn test_empty_segments_contribute_nothing() {
        let segments = vec![
            Segment::new("", HunkStatus::Added),
            Segment::new("word", HunkStatus::Unchanged),
            Segment::new("", HunkStatus::Removed),
        ];
        let tree = build_tree(&segments, SeparatorPolicy::Collapse);
        assert_eq!(line_texts(&tree), vec![vec![("word".to_string(), HunkStatus::Unchanged)]]);
    }

    #[test]
    fn test_empty_inputs_give_one_empty_line() {
        let tree = tree_diff("", "");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.paragraphs()[0].lines(), &[Line::default()]);
    }

    #[test]
    fn test_leading_and_trailing_blank_lines_are_kept() {
        let tree = simple_split("\nmiddle\n", SeparatorPolicy::Collapse);
        let lines: Vec<&Line> = tree.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].is_empty());
        assert!(lines[2].is_empty());
    }

    #[test]
    fn test_round_trip_word_edits() {
        let from = "Roses are red,\nviolets are blue.\n\nSugar is sweet\nand so are you.";
        let to = "Roses are crimson,\nviolets are blue.\n\nHoney is sweet\nand so are you.";
        let tree = tree_diff(from, to);
        assert_eq!(tree.text(Side::To), to);
        assert_eq!(tree.text(Side::From), from);
    }

    #[test]
    fn test_round_trip_added_line() {
        // Line breaks inside added text only affect the "from" rendering
        let from = "a\nb";
        let to = "a\nnew line\nb";
        let tree = tree_diff(from, to);
        assert_eq!(tree.text(Side::To), to);
    }

    #[test]
    fn test_round_trip_whole_document_insertion() {
        let to = "first stanza\nline two\n\nsecond stanza\n\nthird";
        let tree = tree_diff("", to);
        assert_eq!(tree.text(Side::To), to);
        assert!(tree
            .lines()
            .flat_map(|l| l.hunks())
            .all(|h| h.status == HunkStatus::Added));
    }

    #[test]
    fn test_round_trip_whole_document_deletion() {
        let from = "gone\n\nall gone";
        let tree = tree_diff(from, "");
        assert_eq!(tree.text(Side::From), from);
    }

    #[test]
    fn test_paragraph_count_for_pure_insertion() {
        for to in ["", "one", "one\ntwo", "a\n\nb", "a\n\nb\n\nc\n", "a\n\n\n\nb\n\n"] {
            let tree = tree_diff("", to);
            assert_eq!(tree.len(), count_separators(to) + 1, "input {to:?}");
        }
    }

    #[test]
    fn test_simple_split_matches_self_diff() {
        let text = "one line\nanother\n\n  indented\n\n\nlast";
        assert_eq!(
            simple_split(text, SeparatorPolicy::Collapse),
            tree_diff(text, text)
        );
    }

    #[test]
    fn test_simple_split_is_all_unchanged() {
        let tree = simple_split("a b\nc\n\nd", SeparatorPolicy::Collapse);
        assert_eq!(tree.len(), 2);
        assert!(!tree.has_changes());
        assert_eq!(tree.paragraphs()[0].lines().len(), 2);
    }
}
