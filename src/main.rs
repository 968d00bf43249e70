//! A terminal reader for paged documents.
//!
//! Pages are fetched lazily in both directions as the reader scrolls.
//! Run with a directory or `http(s)://` base URL holding `pages/<n>.json`.
//! Run with `--init-config` to write the effective config file.

mod app;
mod config;
mod core;
mod ui;

use std::io::{self, stderr};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Alignment,
    widgets::{Block, Paragraph},
    Terminal,
};
use tokio::sync::mpsc;

use crate::app::{
    debounce::Debounce,
    event::{spawn_event_reader, AppEvent},
    handler,
    scroller::{EdgeStrategies, FetchOutcome, InfiniteScroller, ScrollOptions},
    state::{ActiveView, AppState},
    title::TitleTracker,
};
use crate::core::page::{PageNumber, TitleTable};
use crate::core::source::{self as page_source, DocumentSource};
use crate::ui::{
    book::{BookView, BookWidget},
    layout::AppLayout,
    popup::JumpPrompt,
    spinner::FetchIndicator,
    theme::Theme,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Bidirectional lazy-loading page reader")]
struct Cli {
    /// Document root: a directory or an http(s):// base URL.
    #[arg(default_value = "build")]
    source: String,

    /// Page to start reading at.
    #[arg(long, default_value_t = 1)]
    page: PageNumber,

    /// Start with annotations shown.
    #[arg(long)]
    annotated: bool,

    /// Write the effective config file and exit.
    #[arg(long = "init-config")]
    init_config: bool,
}

// ───────────────────────────────────────── setup ────────────

/// Build the state for `source`.  Title and section tables are optional;
/// a missing file leaves the corresponding feature inert.
async fn build_state(
    cli: &Cli,
    config: config::AppConfig,
    fetch_tx: mpsc::UnboundedSender<FetchOutcome>,
    title_tx: mpsc::UnboundedSender<u64>,
) -> AppState {
    let source = DocumentSource::from_location(&cli.source);

    let titles = match page_source::load_titles(&source).await {
        Ok(titles) => titles,
        Err(e) => {
            tracing::warn!("titles unavailable: {e}");
            TitleTable::default()
        }
    };
    let sections = match page_source::load_sections(&source).await {
        Ok(sections) => sections,
        Err(e) => {
            tracing::warn!("sections unavailable: {e}");
            Vec::new()
        }
    };
    let last_page = (!titles.is_empty()).then(|| titles.len() as PageNumber);

    let scroller = InfiniteScroller::new(
        BookView::new(),
        source,
        EdgeStrategies::standard(),
        fetch_tx,
        ScrollOptions {
            threshold: config.edge_threshold_rows,
            annotated: cli.annotated || config.annotations,
        },
    );
    let tracker = TitleTracker::new(titles, Debounce::new(config.title_debounce(), title_tx));
    AppState::new(scroller, tracker, sections, config, last_page)
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (only in debug builds / when RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();
    let user_config = config::AppConfig::load();

    if cli.init_config {
        let path = user_config.save().context("writing config")?;
        println!("{}", path.display());
        return Ok(());
    }

    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<FetchOutcome>();
    let (title_tx, mut title_rx) = mpsc::unbounded_channel::<u64>();
    let mut state = build_state(&cli, user_config, fetch_tx, title_tx).await;

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    // Seed at the start page before the viewport has a height, so the
    // first fetch goes to `--page` rather than the default seed.
    state.open_at(cli.page);
    let size = terminal.size()?;
    state.resize(size.width, size.height);

    let mut events = spawn_event_reader(Duration::from_millis(100));

    // ── event loop ────────────────────────────────────────────
    loop {
        terminal.draw(|frame| {
            let layout = AppLayout::from_area(frame.area());

            let title = Paragraph::new(state.titles.title())
                .alignment(Alignment::Center)
                .style(Theme::title_style());
            frame.render_widget(title, layout.title_area);

            let book = BookWidget::new(state.scroller.container())
                .block(Block::default().style(Theme::text_style()));
            frame.render_widget(book, layout.book_area);

            let hint = state.config.status_bar_hint();
            let status_text = match state.active_view {
                ActiveView::Reading => state.status_message.as_deref().unwrap_or(&hint),
                ActiveView::JumpPrompt => "",
            };
            let status = Paragraph::new(status_text).style(Theme::status_bar_style());
            frame.render_widget(status, layout.status_area);
            frame.render_widget(
                FetchIndicator {
                    visible: state.scroller.is_fetching(),
                    tick: state.tick,
                },
                layout.status_area,
            );

            if state.active_view == ActiveView::JumpPrompt {
                frame.render_widget(
                    JumpPrompt {
                        input: &state.jump_input,
                        last_page: state.last_page,
                    },
                    frame.area(),
                );
            }
        })?;

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(&mut state, k),
                    AppEvent::Mouse(m) => handler::handle_mouse(&mut state, m),
                    AppEvent::Resize(w, h) => state.resize(w, h),
                    AppEvent::Tick => state.tick = state.tick.wrapping_add(1),
                }
            }

            Some(outcome) = fetch_rx.recv() => {
                state.apply_fetch(outcome);
                // Drain whatever else settled before redrawing.
                while let Ok(outcome) = fetch_rx.try_recv() {
                    state.apply_fetch(outcome);
                }
            }

            Some(token) = title_rx.recv() => state.settle_title(token),
        }

        if state.should_quit {
            break;
        }
    }

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}
