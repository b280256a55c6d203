//! Paragraph / line / hunk tree for a two-revision comparison

use serde::{Deserialize, Serialize};

pub(crate) const PARAGRAPH_SEPARATOR: &str = "\n\n";
pub(crate) const LINE_SEPARATOR: &str = "\n";

/// Status of a piece of diffed text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HunkStatus {
    Added,
    Removed,
    #[default]
    Unchanged,
}

impl HunkStatus {
    /// True if text with this status is part of the given side
    pub fn is_visible_on(self, side: Side) -> bool {
        match (self, side) {
            (HunkStatus::Unchanged, _) => true,
            (HunkStatus::Added, Side::To) => true,
            (HunkStatus::Removed, Side::From) => true,
            _ => false,
        }
    }

    pub fn is_change(self) -> bool {
        self != HunkStatus::Unchanged
    }
}

/// Which revision of a comparison to reconstruct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    From,
    To,
}

/// Smallest tagged run of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    pub content: String,
    pub status: HunkStatus,
}

impl Hunk {
    pub fn new(content: impl Into<String>, status: HunkStatus) -> Self {
        Self {
            content: content.into(),
            status,
        }
    }

    pub fn unchanged(content: impl Into<String>) -> Self {
        Self::new(content, HunkStatus::Unchanged)
    }

    pub fn added(content: impl Into<String>) -> Self {
        Self::new(content, HunkStatus::Added)
    }

    pub fn removed(content: impl Into<String>) -> Self {
        Self::new(content, HunkStatus::Removed)
    }
}

/// One physical line, as an ordered list of hunks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub(crate) hunks: Vec<Hunk>,
}

impl Line {
    pub fn new(hunks: Vec<Hunk>) -> Self {
        Self { hunks }
    }

    pub fn hunks(&self) -> &[Hunk] {
        &self.hunks
    }

    pub(crate) fn push(&mut self, hunk: Hunk) {
        self.hunks.push(hunk);
    }

    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// True if any hunk on this line is added or removed
    pub fn has_changes(&self) -> bool {
        self.hunks.iter().any(|h| h.status.is_change())
    }

    /// Line content as it reads in one revision
    pub fn text(&self, side: Side) -> String {
        self.hunks
            .iter()
            .filter(|h| h.status.is_visible_on(side))
            .map(|h| h.content.as_str())
            .collect()
    }
}

/// Lines separated by a single newline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub(crate) lines: Vec<Line>,
}

impl Paragraph {
    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub(crate) fn push(&mut self, line: Line) {
        self.lines.push(line);
    }

    pub fn text(&self, side: Side) -> String {
        self.lines
            .iter()
            .map(|l| l.text(side))
            .collect::<Vec<_>>()
            .join(LINE_SEPARATOR)
    }
}

/// Word counts for a comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added_words: usize,
    pub removed_words: usize,
}

/// Full comparison of two revisions. Built fresh for every from/to pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffTree {
    pub(crate) paragraphs: Vec<Paragraph>,
}

impl DiffTree {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self { paragraphs }
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Iterate every line of every paragraph in order
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.paragraphs.iter().flat_map(|p| p.lines.iter())
    }

    /// Rebuild one side of the comparison, lines joined by `\n`, paragraphs by `\n\n`
    pub fn text(&self, side: Side) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text(side))
            .collect::<Vec<_>>()
            .join(PARAGRAPH_SEPARATOR)
    }

    pub fn has_changes(&self) -> bool {
        self.lines().any(Line::has_changes)
    }

    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats::default();
        for hunk in self.lines().flat_map(|l| l.hunks.iter()) {
            let words = hunk.content.split_whitespace().count();
            match hunk.status {
                HunkStatus::Added => stats.added_words += words,
                HunkStatus::Removed => stats.removed_words += words,
                HunkStatus::Unchanged => {}
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DiffTree {
        DiffTree::new(vec![
            Paragraph::new(vec![
                Line::new(vec![
                    Hunk::unchanged("the "),
                    Hunk::removed("cat"),
                    Hunk::added("dog"),
                ]),
                Line::new(vec![Hunk::added("barks")]),
            ]),
            Paragraph::new(vec![Line::new(vec![Hunk::unchanged("fin")])]),
        ])
    }

    #[test]
    fn test_text_per_side() {
        let tree = sample();
        assert_eq!(tree.text(Side::To), "the dog\nbarks\n\nfin");
        assert_eq!(tree.text(Side::From), "the cat\n\n\nfin");
    }

    #[test]
    fn test_stats_count_words() {
        let stats = sample().stats();
        assert_eq!(stats.added_words, 2);
        assert_eq!(stats.removed_words, 1);
    }

    #[test]
    fn test_has_changes() {
        assert!(sample().has_changes());
        let plain = DiffTree::new(vec![Paragraph::new(vec![Line::new(vec![Hunk::unchanged(
            "still",
        )])])]);
        assert!(!plain.has_changes());
    }
}
