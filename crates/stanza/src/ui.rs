//! UI rendering

use crate::app::App;
use crate::views::render_history;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use stanza_core::{Page, PageStatus, RevisionSource, StepDirection};
use time::OffsetDateTime;

/// Main drawing function
pub fn draw<S: RevisionSource>(frame: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_history(frame, app, chunks[0]);
    draw_status_bar(frame, app, chunks[1], OffsetDateTime::now_utc());

    if app.show_debug {
        draw_debug_overlay(frame, app, chunks[0]);
    }
    if app.show_help {
        draw_help_popover(frame, app);
    }
}

fn draw_status_bar<S: RevisionSource>(
    frame: &mut Frame,
    app: &App<S>,
    area: Rect,
    now: OffsetDateTime,
) {
    let state = app.state();
    let stats = app.stats();
    let muted = Style::default().fg(app.theme.muted);
    let text = Style::default().fg(app.theme.text);

    let arrow = match state.direction {
        StepDirection::Backward => "◀",
        StepDirection::Forward => "▶",
        StepDirection::None => "·",
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", app.document),
            Style::default()
                .fg(app.theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{arrow} "), muted),
        Span::styled(
            format!("{}/{}", state.current_index + 1, state.total),
            text,
        ),
    ];

    if let Some(revision) = app.revision() {
        spans.push(Span::styled(format!("  {}", revision.id.short()), muted));
        spans.push(Span::styled(format!("  {}", app.revision_date(now)), text));
    }

    spans.push(Span::styled(
        format!("  +{}", stats.added_words),
        Style::default().fg(app.theme.added),
    ));
    spans.push(Span::styled(
        format!(" -{}", stats.removed_words),
        Style::default().fg(app.theme.removed),
    ));

    if app.autoplay {
        spans.push(Span::styled(
            format!("  ▶ {}ms", app.autoplay_speed),
            Style::default().fg(app.theme.warning),
        ));
    }

    if let Some(error) = &app.error {
        spans.push(Span::styled(
            format!("  ! {error}"),
            Style::default().fg(app.theme.error),
        ));
    } else {
        spans.push(Span::styled("  ? help", muted));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn status_label(status: PageStatus) -> &'static str {
    match status {
        PageStatus::Unloaded => "unloaded",
        PageStatus::Loading => "loading",
        PageStatus::Ready => "ready",
        PageStatus::Failed => "failed",
    }
}

/// Page window state in the top right corner of `area`
fn draw_debug_overlay<S: RevisionSource>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let pager = app.nav.pager();
    let header = Style::default().fg(app.theme.muted);
    let text = Style::default().fg(app.theme.text);

    let page_line = |name: &str, page: Option<&Page>| -> Line {
        let row = match page {
            Some(page) => format!(
                " {:<8}{:<9}{:>5}{:>7}{:>7}",
                name,
                status_label(page.status()),
                page.cached(),
                page.start(),
                page.end()
            ),
            None => format!(" {:<8}{:<9}", name, "-"),
        };
        let style = match page.map(Page::status) {
            Some(PageStatus::Failed) => Style::default().fg(app.theme.error),
            Some(PageStatus::Loading) => Style::default().fg(app.theme.warning),
            _ => text,
        };
        Line::from(Span::styled(row, style))
    };

    let lines = vec![
        Line::from(Span::styled(
            format!(" {:<8}{:<9}{:>5}{:>7}{:>7}", "page", "status", "size", "start", "end"),
            header,
        )),
        page_line("prev", pager.previous()),
        page_line("current", pager.current()),
        page_line("next", pager.next()),
        Line::from(Span::styled(
            format!(" index {} of {}", app.state().current_index, pager.len()),
            header,
        )),
    ];

    let width = 42u16.min(area.width);
    let height = (lines.len() as u16 + 2).min(area.height);
    let popup_area = Rect::new(
        area.x + area.width.saturating_sub(width),
        area.y,
        width,
        height,
    );

    frame.render_widget(Clear, popup_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Pages ")
        .border_style(Style::default().fg(app.theme.accent));
    frame.render_widget(Paragraph::new(lines).block(block), popup_area);
}

fn draw_help_popover<S: RevisionSource>(frame: &mut Frame, app: &App<S>) {
    let area = frame.area();

    let popup_width = 40u16.min(area.width.saturating_sub(4));
    let popup_height = 22u16.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let key_style = Style::default().fg(app.theme.accent);
    let label_style = Style::default().fg(app.theme.text);
    let dim_style = Style::default().fg(app.theme.muted);
    let section_style = Style::default()
        .fg(app.theme.accent)
        .add_modifier(Modifier::BOLD);

    let help_line = |key: &str, desc: String| -> Line {
        Line::from(vec![
            Span::styled(format!("  {:<12}", key), key_style),
            Span::styled(desc, label_style),
        ])
    };

    let lines = vec![
        Line::from(Span::styled(" Navigation", section_style)),
        help_line("l / j / →", "Next revision".into()),
        help_line("h / k / ←", "Previous revision".into()),
        help_line("g / Home", "First revision".into()),
        help_line("G / End", "Last revision".into()),
        help_line("J / K / ↑↓", "Scroll down/up".into()),
        Line::from(""),
        Line::from(Span::styled(" Playback", section_style)),
        help_line("Space", "Toggle autoplay".into()),
        help_line("+ / -", format!("Speed ({}ms)", app.autoplay_speed)),
        Line::from(""),
        Line::from(Span::styled(" View", section_style)),
        help_line("s", "Toggle strikethrough".into()),
        help_line("r", "Toggle removed text".into()),
        help_line("d", "Page debug overlay".into()),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("  {:<12}", "?"), key_style),
            Span::styled("Close help", dim_style),
        ]),
        Line::from(vec![
            Span::styled(format!("  {:<12}", "q / Esc"), key_style),
            Span::styled("Quit", label_style),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(app.theme.accent));

    let help_block = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(help_block, popup_area);
}
