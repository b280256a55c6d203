use crate::config::TimeMode;
use time::format_description::{parse_owned, OwnedFormatItem};
use time::OffsetDateTime;

const DEFAULT_ABSOLUTE_FORMAT: &str = "[year]-[month]-[day] [hour]:[minute]";

#[derive(Debug, Clone)]
pub struct TimeFormatter {
    mode: TimeMode,
    absolute_format: Option<OwnedFormatItem>,
}

impl Default for TimeFormatter {
    fn default() -> Self {
        Self::new(TimeMode::default(), "")
    }
}

impl TimeFormatter {
    /// `format` is a `time` format description; empty or invalid falls back to the default
    pub fn new(mode: TimeMode, format: &str) -> Self {
        let absolute_format = parse_format(format).or_else(|| parse_format(DEFAULT_ABSOLUTE_FORMAT));
        Self {
            mode,
            absolute_format,
        }
    }

    pub fn format(&self, date: OffsetDateTime, now: OffsetDateTime) -> String {
        match self.mode {
            TimeMode::Relative => format_relative_age(date, now),
            TimeMode::Absolute => self
                .absolute_format
                .as_ref()
                .and_then(|format| date.format(format).ok())
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

fn parse_format(format: &str) -> Option<OwnedFormatItem> {
    let trimmed = format.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_owned::<2>(trimmed).ok()
}

pub fn format_relative_age(date: OffsetDateTime, now: OffsetDateTime) -> String {
    let age_secs = (now - date).whole_seconds();
    if age_secs < 60 * 60 {
        let minutes = (age_secs / 60).max(0);
        return match minutes {
            0 => "just now".to_string(),
            1 => "1 minute ago".to_string(),
            m => format!("{m} minutes ago"),
        };
    }
    let age_days = age_secs / 86_400;
    if age_days <= 0 {
        let hours = age_secs / 3_600;
        if hours == 1 {
            return "1 hour ago".to_string();
        }
        return format!("{hours} hours ago");
    }
    if age_days == 1 {
        return "1 day ago".to_string();
    }
    if age_days < 30 {
        return format!("{age_days} days ago");
    }
    if age_days < 365 {
        let months = (age_days / 30).max(1);
        if months == 1 {
            return "1 month ago".to_string();
        }
        return format!("{months} months ago");
    }
    let years = age_days / 365;
    if years == 1 {
        "1 year ago".to_string()
    } else {
        format!("{years} years ago")
    }
}
