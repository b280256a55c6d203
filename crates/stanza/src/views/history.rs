//! The diff of one revision against its neighbour, as styled paragraphs

use crate::app::App;
use crate::color::Theme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use stanza_core::{DiffTree, Hunk, HunkPriority, HunkStatus, MergeJoiner, RevisionSource};

/// How hunks are drawn, resolved from the app's toggles and theme
#[derive(Debug, Clone, Copy)]
pub struct DiffStyle {
    pub theme: Theme,
    pub strikethrough_deletions: bool,
    pub show_removed: bool,
    pub joiner: MergeJoiner,
}

impl DiffStyle {
    pub fn span_style(&self, status: HunkStatus) -> Style {
        match status {
            HunkStatus::Added => Style::default().fg(self.theme.added),
            HunkStatus::Removed => {
                let style = Style::default().fg(self.theme.removed);
                if self.strikethrough_deletions {
                    style.add_modifier(Modifier::CROSSED_OUT)
                } else {
                    style
                }
            }
            HunkStatus::Unchanged => Style::default().fg(self.theme.text),
        }
    }
}

/// Hunks of one line in display order. Neighbours that would otherwise run
/// together (no whitespace on either side of the boundary) get a space between
/// them, so a replaced word reads as `old new` rather than `oldnew`.
pub fn display_hunks(
    line: &stanza_core::Line,
    priority: HunkPriority,
    style: &DiffStyle,
) -> Vec<Hunk> {
    let mut out: Vec<Hunk> = Vec::new();
    for hunk in line.normalized_hunks_with(priority, style.joiner) {
        if hunk.status == HunkStatus::Removed && !style.show_removed {
            continue;
        }
        if out.last().is_some_and(|prev| needs_gap(&prev.content, &hunk.content)) {
            out.push(Hunk::unchanged(" "));
        }
        out.push(hunk);
    }
    out
}

fn needs_gap(left: &str, right: &str) -> bool {
    let left_space = left.chars().next_back().is_some_and(char::is_whitespace);
    let right_space = right.chars().next().is_some_and(char::is_whitespace);
    !left_space && !right_space
}

/// One rendered line per tree line, with a blank line between paragraphs
pub fn diff_lines(tree: &DiffTree, priority: HunkPriority, style: &DiffStyle) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, paragraph) in tree.paragraphs().iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        for line in paragraph.lines() {
            let spans: Vec<Span<'static>> = display_hunks(line, priority, style)
                .into_iter()
                .map(|hunk| {
                    let span_style = style.span_style(hunk.status);
                    Span::styled(hunk.content, span_style)
                })
                .collect();
            lines.push(Line::from(spans));
        }
    }
    lines
}

pub fn render_history<S: RevisionSource>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let muted = Style::default().fg(app.theme.muted);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(muted)
        .title(Span::styled(
            format!(" {} ", app.document),
            Style::default().fg(app.theme.accent),
        ));

    let mut lines = diff_lines(app.tree(), app.priority(), &app.diff_style());
    if lines.iter().all(|line| line.spans.is_empty()) {
        lines = vec![Line::from(Span::styled("(empty revision)", muted))];
    }

    let content = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    frame.render_widget(content, area);
}
