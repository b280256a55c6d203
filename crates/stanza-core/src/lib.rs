//! Stanza Core - word-level revision diffs with lazy history paging
//!
//! This library rebuilds paragraph and line structure from word diffs of two
//! revisions, and pages through a long revision history with a three-page
//! cache that prefetches ahead of the viewer.

pub mod builder;
pub mod engine;
pub mod history;
pub mod normalize;
pub mod page;
pub mod pager;
pub mod source;
pub mod tree;

pub use builder::{build_tree, simple_split, tree_diff, tree_diff_with, ScanState, SeparatorPolicy};
pub use engine::{Segment, SimilarWordDiff, WordDiffEngine};
pub use history::{HistoryNavigator, HistoryOptions, HistoryState, StepDirection};
pub use normalize::{HunkPriority, MergeJoiner};
pub use page::{Page, PageLoad, PageStatus};
pub use pager::{PagerConfig, PagerError, RevisionPager, WindowLoad};
pub use source::{FetchError, FsRevisionSource, Revision, RevisionId, RevisionSource};
pub use tree::{DiffStats, DiffTree, Hunk, HunkStatus, Line, Paragraph, Side};
