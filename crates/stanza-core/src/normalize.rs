//! Per-line hunk normalization for rendering
//!
//! The builder emits hunks exactly as the word diff produced them, which for a
//! heavily edited line means many small interleaved added/removed runs. Here a
//! line is regrouped so that, between two unchanged stretches, all text of the
//! priority status comes first, then all text of the other status, and
//! adjacent same-status hunks are merged into one.

use crate::tree::{Hunk, HunkStatus, Line};
use serde::{Deserialize, Serialize};

/// Which change status is shown first within a run of changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HunkPriority {
    #[default]
    Added,
    Removed,
}

impl HunkPriority {
    pub fn status(self) -> HunkStatus {
        match self {
            HunkPriority::Added => HunkStatus::Added,
            HunkPriority::Removed => HunkStatus::Removed,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            HunkPriority::Added => HunkPriority::Removed,
            HunkPriority::Removed => HunkPriority::Added,
        }
    }
}

/// How the contents of two merged same-status hunks are joined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeJoiner {
    /// Always one space between the two contents
    #[default]
    Space,
    /// One space only where neither content has whitespace at the seam
    Touching,
}

impl MergeJoiner {
    fn join(self, left: &mut String, right: &str) {
        let seam_has_space =
            left.ends_with(char::is_whitespace) || right.starts_with(char::is_whitespace);
        match self {
            MergeJoiner::Touching if seam_has_space => {}
            _ => left.push(' '),
        }
        left.push_str(right);
    }
}

/// The unchanged single space between two words
fn is_spacer(hunk: &Hunk) -> bool {
    hunk.status == HunkStatus::Unchanged && hunk.content == " "
}

/// A maximal stretch of added/removed hunks between unchanged ones
#[derive(Default)]
struct ChangeRun<'a> {
    hunks: Vec<&'a Hunk>,
    /// Spacers seen since the last change; dropped if another change follows
    trailing: Vec<&'a Hunk>,
}

impl<'a> ChangeRun<'a> {
    fn push_change(&mut self, hunk: &'a Hunk) {
        self.trailing.clear();
        self.hunks.push(hunk);
    }

    fn drain_into(self, priority: HunkStatus, out: &mut Vec<&'a Hunk>) {
        let (first, rest): (Vec<&Hunk>, Vec<&Hunk>) =
            self.hunks.into_iter().partition(|h| h.status == priority);
        out.extend(first);
        out.extend(rest);
        out.extend(self.trailing);
    }
}

impl Line {
    /// Hunks regrouped for display, merged with [`MergeJoiner::Space`].
    ///
    /// Pure: the same line and priority always give the same result, and a
    /// normalized line is a fixed point.
    pub fn normalized_hunks(&self, priority: HunkPriority) -> Vec<Hunk> {
        self.normalized_hunks_with(priority, MergeJoiner::default())
    }

    pub fn normalized_hunks_with(&self, priority: HunkPriority, joiner: MergeJoiner) -> Vec<Hunk> {
        let priority = priority.status();
        let mut ordered: Vec<&Hunk> = Vec::with_capacity(self.hunks.len());
        let mut run: Option<ChangeRun> = None;

        for hunk in self.hunks.iter().filter(|h| !h.content.is_empty()) {
            if is_spacer(hunk) {
                match run.as_mut() {
                    Some(run) => run.trailing.push(hunk),
                    None => ordered.push(hunk),
                }
            } else if hunk.status.is_change() {
                run.get_or_insert_with(ChangeRun::default).push_change(hunk);
            } else {
                if let Some(run) = run.take() {
                    run.drain_into(priority, &mut ordered);
                }
                ordered.push(hunk);
            }
        }
        if let Some(run) = run.take() {
            run.drain_into(priority, &mut ordered);
        }

        let mut merged: Vec<Hunk> = Vec::with_capacity(ordered.len());
        for hunk in ordered {
            match merged.last_mut() {
                Some(last) if last.status == hunk.status => {
                    joiner.join(&mut last.content, &hunk.content);
                }
                _ => merged.push(hunk.clone()),
            }
        }
        merged
    }

    /// A copy of this line with its hunks normalized
    pub fn normalized(&self, priority: HunkPriority) -> Line {
        Line::new(self.normalized_hunks(priority))
    }

    pub fn normalized_with(&self, priority: HunkPriority, joiner: MergeJoiner) -> Line {
        Line::new(self.normalized_hunks_with(priority, joiner))
    }
}
