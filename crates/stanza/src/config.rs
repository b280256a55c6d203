//! Configuration file support for stanza
//!
//! Config file location: `~/.config/stanza/config.toml` (XDG_CONFIG_HOME)
//!
//! Example config:
//! ```toml
//! [pager]
//! page_size = 100
//! prefetch_bound = 25
//! fetch_timeout_ms = 10000
//!
//! [diff]
//! priority = "added"
//! flip_on_backward = false
//! paragraphs = "collapse"
//! joiner = "space"
//!
//! [playback]
//! speed = 100
//! autoplay = false
//!
//! [ui]
//! strikethrough_deletions = true
//! show_removed = true
//! debug = false
//! time_format = "relative"
//! date_format = "[year]-[month]-[day] [hour]:[minute]"
//!
//! [ui.colors]
//! added = "green"
//! removed = "#BF616A"
//! muted = "darkgray"
//!
//! [log]
//! level = "info"
//! file = "~/.cache/stanza/stanza.log"
//! ```

use crate::color::{self, Theme};
use ratatui::style::Color;
use serde::Deserialize;
use stanza_core::{HistoryOptions, HunkPriority, MergeJoiner, PagerConfig, SeparatorPolicy};
use std::path::PathBuf;
use std::time::Duration;

/// Revision paging
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PagerSection {
    /// Revisions per page
    pub page_size: usize,
    /// Distance from a page edge at which the neighbouring page is fetched
    pub prefetch_bound: usize,
    /// Per-revision fetch timeout; 0 disables it
    pub fetch_timeout_ms: u64,
}

impl Default for PagerSection {
    fn default() -> Self {
        Self {
            page_size: 100,
            prefetch_bound: 25,
            fetch_timeout_ms: 10_000,
        }
    }
}

impl PagerSection {
    pub fn to_pager_config(&self) -> PagerConfig {
        PagerConfig {
            page_size: self.page_size,
            prefetch_bound: self.prefetch_bound,
            fetch_timeout: (self.fetch_timeout_ms > 0)
                .then(|| Duration::from_millis(self.fetch_timeout_ms)),
        }
    }
}

/// Diff presentation
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Which side of a change run is shown first: "added" or "removed"
    pub priority: HunkPriority,
    /// Show removed text first after stepping backward
    pub flip_on_backward: bool,
    /// Blank-line handling: "collapse" or "preserve"
    pub paragraphs: SeparatorPolicy,
    /// Merged same-status words: "space" always puts one space between them,
    /// "touching" only where neither word brings its own
    pub joiner: MergeJoiner,
}

impl DiffConfig {
    pub fn to_options(&self) -> HistoryOptions {
        HistoryOptions {
            separators: self.paragraphs,
            priority: self.priority,
            flip_on_backward: self.flip_on_backward,
            joiner: self.joiner,
        }
    }
}

/// Playback configuration
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Autoplay speed in milliseconds (delay between revisions)
    pub speed: u64,
    /// Start with autoplay enabled
    pub autoplay: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed: 100,
            autoplay: false,
        }
    }
}

/// How revision dates are shown in the status bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeMode {
    #[default]
    Relative,
    Absolute,
}

/// Colors for diff text; each value is a color name or `#rrggbb`
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub added: String,
    pub removed: String,
    pub muted: String,
    pub accent: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            added: "green".to_string(),
            removed: "red".to_string(),
            muted: "darkgray".to_string(),
            accent: "cyan".to_string(),
        }
    }
}

impl ColorConfig {
    pub fn resolve(&self) -> Theme {
        let pick = |value: &str, fallback: Color| color::resolve_color(value).unwrap_or(fallback);
        Theme {
            added: pick(&self.added, Color::Green),
            removed: pick(&self.removed, Color::Red),
            muted: pick(&self.muted, Color::DarkGray),
            accent: pick(&self.accent, Color::Cyan),
            ..Theme::default()
        }
    }
}

/// UI configuration
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Show strikethrough on removed text
    pub strikethrough_deletions: bool,
    /// Show removed text at all (off shows only the newer revision's words)
    pub show_removed: bool,
    /// Start with the page-window debug overlay open
    pub debug: bool,
    /// "relative" ("3 days ago") or "absolute"
    pub time_format: TimeMode,
    /// `time` format description used in absolute mode
    pub date_format: String,
    pub colors: ColorConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            strikethrough_deletions: true,
            show_removed: true,
            debug: false,
            time_format: TimeMode::Relative,
            date_format: String::new(),
            colors: ColorConfig::default(),
        }
    }
}

/// Log output
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive, e.g. "info" or "stanza_core=debug"
    pub level: String,
    /// Log file; defaults to the platform cache dir
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LogConfig {
    pub fn file_path(&self) -> Option<PathBuf> {
        match &self.file {
            Some(path) => Some(expand_home(path)),
            None => dirs::cache_dir().map(|dir| dir.join("stanza").join("stanza.log")),
        }
    }
}

fn expand_home(path: &std::path::Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Root configuration
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pager: PagerSection,
    pub diff: DiffConfig,
    pub playback: PlaybackConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

impl Config {
    /// Get all possible config file paths in priority order
    fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg).join("stanza").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("stanza").join("config.toml"));
        }

        // ~/Library/Application Support on macOS
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("stanza").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        paths
    }

    /// Get the first existing config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_paths().into_iter().find(|p| p.exists())
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load config from XDG config path
    /// Returns default config if file doesn't exist or can't be parsed
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| std::fs::read_to_string(&path).ok())
            .and_then(|content| {
                Self::from_toml(&content)
                    .map_err(|e| {
                        eprintln!("Warning: Failed to parse config: {}", e);
                        e
                    })
                    .ok()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        let pager = config.pager.to_pager_config();
        assert_eq!(pager.page_size, 100);
        assert_eq!(pager.prefetch_bound, 25);
        assert_eq!(pager.fetch_timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.playback.speed, 100);
        assert!(config.ui.strikethrough_deletions);
        assert_eq!(config.diff.to_options(), HistoryOptions::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r##"
            [pager]
            page_size = 20
            fetch_timeout_ms = 0

            [diff]
            priority = "removed"
            paragraphs = "preserve"
            joiner = "touching"

            [ui.colors]
            added = "#A3BE8C"
            "##,
        )
        .unwrap();

        let pager = config.pager.to_pager_config();
        assert_eq!(pager.page_size, 20);
        assert_eq!(pager.prefetch_bound, 25);
        assert_eq!(pager.fetch_timeout, None);

        let options = config.diff.to_options();
        assert_eq!(options.priority, HunkPriority::Removed);
        assert_eq!(options.separators, SeparatorPolicy::Preserve);
        assert!(!options.flip_on_backward);
        assert_eq!(options.joiner, MergeJoiner::Touching);

        let theme = config.ui.colors.resolve();
        assert_eq!(theme.added, Color::Rgb(0xA3, 0xBE, 0x8C));
        assert_eq!(theme.removed, Color::Red);
    }

    #[test]
    fn test_bad_enum_value_is_an_error() {
        assert!(Config::from_toml("[diff]\npriority = \"sideways\"").is_err());
    }

    #[test]
    fn test_log_file_expands_home() {
        let log = LogConfig {
            level: "debug".to_string(),
            file: Some(PathBuf::from("~/logs/stanza.log")),
        };
        let path = log.file_path().unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("logs/stanza.log"));
        }
    }
}
