//! Stanza CLI - step through the revision history of a poem

mod app;
mod color;
mod config;
mod logging;
mod print;
mod time_format;
mod tui;
mod ui;
mod views;

#[cfg(test)]
mod test_support;

use anyhow::{bail, Context, Result};
use app::App;
use clap::Parser;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use stanza_core::{FsRevisionSource, HistoryNavigator, RevisionPager, RevisionSource};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use time_format::TimeFormatter;
use tokio::time::MissedTickBehavior;

#[derive(Parser, Debug)]
#[command(name = "stz")]
#[command(author, version, about = "Step through the revision history of a poem")]
struct Args {
    /// Directory holding `<document>.json` revision lists and `<document>/` contents
    root: PathBuf,

    /// Document to open; needed when the root holds more than one
    #[arg(short, long)]
    document: Option<String>,

    /// Revision to open at, 0 being the oldest
    #[arg(short, long, default_value = "0")]
    at: usize,

    /// Auto-play through the history
    #[arg(long)]
    autoplay: bool,

    /// Autoplay delay in milliseconds
    #[arg(short, long)]
    speed: Option<u64>,

    /// Revisions fetched per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Distance from a page edge that triggers prefetching the neighbour page
    #[arg(long)]
    prefetch_bound: Option<usize>,

    /// Start with the page-window debug overlay open
    #[arg(long)]
    debug: bool,

    /// Print the diff at --at to stdout and exit
    #[arg(long)]
    print: bool,

    /// Log filter directive (e.g. "debug", "stanza_core=trace")
    #[arg(long)]
    log_level: Option<String>,
}

/// The requested document, or the only one under `root`
fn pick_document(root: &Path, requested: Option<String>) -> Result<String> {
    if let Some(name) = requested {
        return Ok(name);
    }
    let mut found = FsRevisionSource::discover(root)
        .with_context(|| format!("Failed to read directory: {}", root.display()))?;
    match found.len() {
        0 => bail!("No documents found in {}", root.display()),
        1 => Ok(found.remove(0)),
        _ => bail!(
            "{} holds several documents, choose one with --document: {}",
            root.display(),
            found.join(", ")
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::Config::load();

    let filter = logging::filter(args.log_level.as_deref(), &config.log.level);
    let _log_guard = if args.print {
        logging::init_stderr(filter)?;
        None
    } else {
        match config.log.file_path() {
            Some(path) => Some(logging::init_file(filter, &path)?),
            None => None,
        }
    };

    let document = pick_document(&args.root, args.document.clone())?;

    let mut pager_config = config.pager.to_pager_config();
    if let Some(page_size) = args.page_size {
        pager_config.page_size = page_size;
    }
    if let Some(bound) = args.prefetch_bound {
        pager_config.prefetch_bound = bound;
    }

    let source = Arc::new(FsRevisionSource::new(&args.root, &document));
    let pager = RevisionPager::open(source, pager_config)
        .await
        .with_context(|| format!("Failed to load revision list for {document}"))?;
    if pager.is_empty() {
        bail!("{document} has no revisions");
    }
    tracing::info!(%document, revisions = pager.len(), at = args.at, "opening history");

    let nav = HistoryNavigator::open(pager, args.at, config.diff.to_options())
        .await
        .context("Failed to load the opening revision")?;

    // CLI overrides config
    let speed = args.speed.unwrap_or(config.playback.speed);
    let autoplay = args.autoplay || config.playback.autoplay;
    let mut app = App::new(nav, document, speed, autoplay);
    app.strikethrough_deletions = config.ui.strikethrough_deletions;
    app.show_removed = config.ui.show_removed;
    app.show_debug = args.debug || config.ui.debug;
    app.theme = config.ui.colors.resolve();
    app.time_formatter = TimeFormatter::new(config.ui.time_format, &config.ui.date_format);

    if args.print {
        let mut stdout = io::stdout().lock();
        return print::write_diff(&mut stdout, app.tree(), app.priority(), &app.diff_style())
            .context("Failed to write diff");
    }

    tui::install_panic_hook();
    let mut terminal = tui::init().context("Failed to set up terminal")?;

    let result = run_app(&mut terminal, &mut app).await;

    tui::restore().context("Failed to restore terminal")?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(error = %err, "exiting with error");
    }
    result
}

async fn run_app<S: RevisionSource>(terminal: &mut tui::Tui, app: &mut App<S>) -> Result<()> {
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(16));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while !app.should_quit {
        terminal.draw(|frame| ui::draw(frame, app))?;

        tokio::select! {
            _ = ticker.tick() => app.tick().await,
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    handle_key(app, key).await;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                None => break,
            },
        }
    }
    Ok(())
}

async fn handle_key<S: RevisionSource>(app: &mut App<S>, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }
    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc) {
            app.show_help = false;
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('j') => app.next_step().await,
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('k') => app.prev_step().await,
        KeyCode::Home | KeyCode::Char('g') => app.goto_start().await,
        KeyCode::End | KeyCode::Char('G') => app.goto_end().await,
        KeyCode::Down | KeyCode::Char('J') => app.scroll_down(),
        KeyCode::Up | KeyCode::Char('K') => app.scroll_up(),
        KeyCode::Char(' ') => app.toggle_autoplay(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.increase_speed(),
        KeyCode::Char('-') => app.decrease_speed(),
        KeyCode::Char('d') => app.toggle_debug(),
        KeyCode::Char('s') => app.toggle_strikethrough_deletions(),
        KeyCode::Char('r') => app.toggle_show_removed(),
        KeyCode::Char('?') => app.toggle_help(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{open_app, write_history};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_pick_document() {
        let dir = tempfile::tempdir().unwrap();
        assert!(pick_document(dir.path(), None).is_err());

        write_history(dir.path(), "ode", &["a"]);
        assert_eq!(pick_document(dir.path(), None).unwrap(), "ode");

        write_history(dir.path(), "sonnet", &["b"]);
        let err = pick_document(dir.path(), None).unwrap_err().to_string();
        assert!(err.contains("ode, sonnet"), "{err}");
        assert_eq!(
            pick_document(dir.path(), Some("sonnet".into())).unwrap(),
            "sonnet"
        );
    }

    #[tokio::test]
    async fn test_keys_drive_navigation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = open_app(dir.path(), &["a", "a b", "a b c"], 0).await;

        handle_key(&mut app, press(KeyCode::Char('l'))).await;
        assert_eq!(app.state().current_index, 1);
        handle_key(&mut app, press(KeyCode::End)).await;
        assert_eq!(app.state().current_index, 2);
        handle_key(&mut app, press(KeyCode::Left)).await;
        assert_eq!(app.state().current_index, 1);
        handle_key(&mut app, press(KeyCode::Char('g'))).await;
        assert_eq!(app.state().current_index, 0);

        handle_key(&mut app, press(KeyCode::Char(' '))).await;
        assert!(app.autoplay);
        handle_key(&mut app, press(KeyCode::Char('j'))).await;
        assert!(!app.autoplay);
    }

    #[tokio::test]
    async fn test_help_swallows_keys_until_closed() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = open_app(dir.path(), &["a", "a b"], 0).await;

        handle_key(&mut app, press(KeyCode::Char('?'))).await;
        assert!(app.show_help);
        handle_key(&mut app, press(KeyCode::Char('l'))).await;
        assert_eq!(app.state().current_index, 0);

        handle_key(&mut app, press(KeyCode::Esc)).await;
        assert!(!app.show_help);
        assert!(!app.should_quit);

        handle_key(&mut app, press(KeyCode::Char('q'))).await;
        assert!(app.should_quit);
    }
}
