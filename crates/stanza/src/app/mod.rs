//! Application state and logic

use crate::color::Theme;
use crate::time_format::TimeFormatter;
use crate::views::DiffStyle;
use stanza_core::{
    DiffStats, DiffTree, HistoryNavigator, HistoryState, HunkPriority, PagerError, Revision,
    RevisionSource,
};
use std::time::Instant;
use time::OffsetDateTime;

mod playback;


/// The main application state
pub struct App<S> {
    /// Revision history being viewed
    pub nav: HistoryNavigator<S>,
    /// Document name shown in the status bar
    pub document: String,
    /// Diff for the current position, rebuilt after every move
    tree: DiffTree,
    /// Delay between autoplay steps in milliseconds
    pub autoplay_speed: u64,
    /// Whether autoplay is enabled
    pub autoplay: bool,
    /// Last autoplay tick time
    last_autoplay_tick: Instant,
    /// Vertical scroll offset in rendered lines
    pub scroll: u16,
    /// Whether to quit
    pub should_quit: bool,
    /// Whether to show the help popover
    pub show_help: bool,
    /// Show the page-window debug overlay
    pub show_debug: bool,
    /// Show strikethrough on removed text
    pub strikethrough_deletions: bool,
    /// Render removed text at all
    pub show_removed: bool,
    pub theme: Theme,
    pub time_formatter: TimeFormatter,
    /// Last navigation failure, shown in the status bar until the next successful move
    pub error: Option<String>,
}

impl<S: RevisionSource> App<S> {
    pub fn new(nav: HistoryNavigator<S>, document: impl Into<String>, speed: u64, autoplay: bool) -> Self {
        let tree = nav.diff_tree();
        Self {
            nav,
            document: document.into(),
            tree,
            autoplay_speed: speed,
            autoplay,
            last_autoplay_tick: Instant::now(),
            scroll: 0,
            should_quit: false,
            show_help: false,
            show_debug: false,
            strikethrough_deletions: true,
            show_removed: true,
            theme: Theme::default(),
            time_formatter: TimeFormatter::default(),
            error: None,
        }
    }

    pub fn state(&self) -> &HistoryState {
        self.nav.state()
    }

    pub fn tree(&self) -> &DiffTree {
        &self.tree
    }

    pub fn priority(&self) -> HunkPriority {
        self.nav.priority()
    }

    pub fn stats(&self) -> DiffStats {
        self.tree.stats()
    }

    pub fn revision(&self) -> Option<&Revision> {
        self.nav.current_revision()
    }

    pub fn diff_style(&self) -> DiffStyle {
        DiffStyle {
            theme: self.theme,
            strikethrough_deletions: self.strikethrough_deletions,
            show_removed: self.show_removed,
            joiner: self.nav.options().joiner,
        }
    }

    /// Date of the revision on screen, formatted for the status bar
    pub fn revision_date(&self, now: OffsetDateTime) -> String {
        self.revision()
            .map(|r| self.time_formatter.format(r.date, now))
            .unwrap_or_default()
    }

    fn apply(&mut self, result: Result<bool, PagerError>) -> bool {
        match result {
            Ok(true) => {
                self.tree = self.nav.diff_tree();
                self.scroll = 0;
                self.error = None;
                true
            }
            Ok(false) => false,
            Err(err) => {
                tracing::warn!(error = %err, index = self.state().current_index, "navigation failed");
                self.error = Some(err.to_string());
                self.autoplay = false;
                false
            }
        }
    }

    /// Step forward one revision; stops autoplay
    pub async fn next_step(&mut self) {
        self.autoplay = false;
        let result = self.nav.next().await;
        self.apply(result);
    }

    /// Step back one revision; stops autoplay
    pub async fn prev_step(&mut self) {
        self.autoplay = false;
        let result = self.nav.prev().await;
        self.apply(result);
    }

    pub async fn goto_start(&mut self) {
        self.autoplay = false;
        let result = self.nav.goto_start().await;
        self.apply(result);
    }

    pub async fn goto_end(&mut self) {
        self.autoplay = false;
        let result = self.nav.goto_end().await;
        self.apply(result);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_debug(&mut self) {
        self.show_debug = !self.show_debug;
    }

    pub fn toggle_strikethrough_deletions(&mut self) {
        self.strikethrough_deletions = !self.strikethrough_deletions;
    }

    pub fn toggle_show_removed(&mut self) {
        self.show_removed = !self.show_removed;
    }

    /// Advance autoplay if its interval has elapsed
    pub async fn tick(&mut self) {
        if !self.autoplay || self.last_autoplay_tick.elapsed().as_millis() < self.autoplay_speed as u128 {
            return;
        }
        self.last_autoplay_tick = Instant::now();

        if self.state().is_at_end() {
            self.autoplay = false;
            return;
        }
        let result = self.nav.next().await;
        self.apply(result);
    }
}
