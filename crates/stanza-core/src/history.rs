//! Step-through navigation over a document's revision history

use crate::builder::{tree_diff_with, SeparatorPolicy};
use crate::engine::SimilarWordDiff;
use crate::normalize::{HunkPriority, MergeJoiner};
use crate::pager::{PagerError, RevisionPager};
use crate::source::{Revision, RevisionSource};
use crate::tree::DiffTree;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Direction of the last step action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StepDirection {
    #[default]
    None,
    Forward,
    Backward,
}

/// Where the viewer is in the history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryState {
    /// Index of the revision on screen, oldest first
    pub current_index: usize,
    pub total: usize,
    /// Direction of the last step; decides which neighbour the diff is taken against
    pub direction: StepDirection,
}

impl HistoryState {
    pub fn new(current_index: usize, total: usize) -> Self {
        Self {
            current_index,
            total,
            direction: StepDirection::None,
        }
    }

    pub fn is_at_start(&self) -> bool {
        self.current_index == 0
    }

    pub fn is_at_end(&self) -> bool {
        self.current_index + 1 >= self.total
    }

    /// Get progress as a percentage
    pub fn progress(&self) -> f64 {
        if self.total <= 1 {
            return 100.0;
        }
        (self.current_index as f64 / (self.total - 1) as f64) * 100.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryOptions {
    pub separators: SeparatorPolicy,
    pub priority: HunkPriority,
    /// Show removed text first after stepping backward
    pub flip_on_backward: bool,
    pub joiner: MergeJoiner,
}

/// Navigator that keeps the texts of the revision on screen and of the
/// neighbour it is compared against
#[derive(Debug)]
pub struct HistoryNavigator<S> {
    pager: RevisionPager<S>,
    state: HistoryState,
    options: HistoryOptions,
    from_text: Arc<str>,
    to_text: Arc<str>,
}

impl<S: RevisionSource> HistoryNavigator<S> {
    /// Load the window around `start_at` (clamped to the history) and show that revision
    pub async fn open(
        pager: RevisionPager<S>,
        start_at: usize,
        options: HistoryOptions,
    ) -> Result<Self, PagerError> {
        let total = pager.len();
        let index = start_at.min(total.saturating_sub(1));
        let mut nav = Self {
            pager,
            state: HistoryState::new(index, total),
            options,
            from_text: Arc::from(""),
            to_text: Arc::from(""),
        };
        nav.pager.ensure_index(index)?.wait().await?;
        nav.show(index, StepDirection::None).await?;
        Ok(nav)
    }

    pub fn state(&self) -> &HistoryState {
        &self.state
    }

    pub fn options(&self) -> &HistoryOptions {
        &self.options
    }

    pub fn pager(&self) -> &RevisionPager<S> {
        &self.pager
    }

    pub fn current_revision(&self) -> Option<&Revision> {
        self.pager.revision(self.state.current_index)
    }

    /// Text of the revision on screen
    pub fn text(&self) -> &str {
        &self.to_text
    }

    /// Priority for normalizing the current diff
    pub fn priority(&self) -> HunkPriority {
        match self.state.direction {
            StepDirection::Backward if self.options.flip_on_backward => {
                self.options.priority.flipped()
            }
            _ => self.options.priority,
        }
    }

    /// Diff of the neighbour against the revision on screen, both trimmed
    pub fn diff_tree(&self) -> DiffTree {
        tree_diff_with(
            &SimilarWordDiff,
            self.from_text.trim(),
            self.to_text.trim(),
            self.options.separators,
        )
    }

    /// Index the current revision is compared against
    fn compare_index(index: usize, total: usize, direction: StepDirection) -> Option<usize> {
        match direction {
            StepDirection::Backward if index + 1 < total => Some(index + 1),
            _ => index.checked_sub(1),
        }
    }

    /// Fetch both texts for `index`, then commit the new position
    async fn show(&mut self, index: usize, direction: StepDirection) -> Result<(), PagerError> {
        let to_text = self.pager.resolve(index).await?;
        let from_text = match Self::compare_index(index, self.state.total, direction) {
            Some(other) => self.pager.resolve_neighbor(other).await?,
            None => Arc::from(""),
        };

        self.state.current_index = index;
        self.state.direction = direction;
        self.from_text = from_text;
        self.to_text = to_text;
        tracing::debug!(index, ?direction, "showing revision");
        Ok(())
    }

    /// Move to the next revision. Returns false at the newest revision.
    pub async fn next(&mut self) -> Result<bool, PagerError> {
        if self.state.is_at_end() {
            return Ok(false);
        }
        self.show(self.state.current_index + 1, StepDirection::Forward)
            .await?;
        Ok(true)
    }

    /// Move to the previous revision. Returns false at the oldest revision.
    pub async fn prev(&mut self) -> Result<bool, PagerError> {
        if self.state.is_at_start() {
            return Ok(false);
        }
        self.show(self.state.current_index - 1, StepDirection::Backward)
            .await?;
        Ok(true)
    }

    /// Jump to a revision, clamped to the history
    pub async fn goto(&mut self, index: usize) -> Result<bool, PagerError> {
        let target = index.min(self.state.total.saturating_sub(1));
        let direction = match target.cmp(&self.state.current_index) {
            std::cmp::Ordering::Equal => return Ok(false),
            std::cmp::Ordering::Greater => StepDirection::Forward,
            std::cmp::Ordering::Less => StepDirection::Backward,
        };
        self.show(target, direction).await?;
        Ok(true)
    }

    pub async fn goto_start(&mut self) -> Result<bool, PagerError> {
        self.goto(0).await
    }

    pub async fn goto_end(&mut self) -> Result<bool, PagerError> {
        self.goto(self.state.total.saturating_sub(1)).await
    }
}
