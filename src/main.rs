//! catalog-browser — browse a book catalog feed and its covers in the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐  PollMsg   ┌──────────┐  draw()  ┌──────────┐
//! │  poll.rs │ ─────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (thread) │  (channel) │ (state)  │          │ (render) │
//! └──────────┘            └──────────┘          └──────────┘
//!      │                       ▲
//!      │ catalog::*            │ handle_key_event()
//!      ▼                  ┌──────────┐
//!  feed + cover cache     │ input.rs │
//!                         └──────────┘
//! ```
//!
//! * **`catalog_browser`** (the library) — feed model, link selection, cover
//!   fetch cache, thumbnail scaling, descriptions, feed sources.
//! * **`poll`** — background thread that fetches the feed and its covers.
//! * **`app`** — owns all UI state (entries, cover states, selection).
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` mutations.
//! * **`config`** — command-line arguments.
//! * **`main`** — wires everything together: parse args, set up logging and
//!   the terminal, and run the event loop.

mod app;
mod config;
mod input;
mod poll;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::App;
use catalog_browser::catalog::{HttpTransport, USER_AGENT};
use catalog_browser::source::{FeedSource, RssSource};
use config::CliArgs;
use poll::{PollMsg, Poller};

// ---------------------------------------------------------------------------
// RAII terminal guard — cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the default panic message is printed.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

/// Send `tracing` output to the log file. `RUST_LOG` overrides `--log-level`.
fn init_logging(args: &CliArgs) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.as_filter()));

    let log_path = args.effective_log_path();
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    info!(path = %log_path.display(), "Logging initialized");
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(&args)?;
    install_panic_hook();

    info!(url = %args.url, "Starting catalog browser");

    // -- configure the feed source and cover transport -----------------------
    let client = reqwest::blocking::Client::builder()
        .timeout(args.timeout())
        .user_agent(USER_AGENT)
        .build()
        .context("building HTTP client")?;
    let transport = HttpTransport::with_client(client.clone());
    let source: Box<dyn FeedSource> = Box::new(RssSource::new(&args.url, "Catalog", client));
    let base_url = args
        .base_url
        .clone()
        .unwrap_or_else(|| source.location().to_string());
    info!(base = %base_url, "Resolving cover links");

    // -- start background loading --------------------------------------------
    let rx = Poller {
        source,
        base_url,
        transport: Box::new(transport),
        interval: args.refresh_interval(),
    }
    .spawn();

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new();

    // -- main event loop -----------------------------------------------------
    // ~10 fps: drain worker messages, render, poll for input.
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(msg) = rx.try_recv() {
            match msg {
                PollMsg::Feed(feed) => {
                    app.set_feed(&feed);
                    app.status = format!("Fetched {} entries", feed.entry_count());
                }
                PollMsg::Cover { index, cover } => app.set_cover(index, cover),
                PollMsg::Error(e) => {
                    app.status = format!("Error: {e}");
                }
            }
        }

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    info!("Exiting");
    Ok(())
}
