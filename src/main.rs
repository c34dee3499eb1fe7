//! news-tracker: keeps a few fresh news snippets per country and hands each
//! one out exactly once.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌────────────┐ fetch() ┌─────────────┐ drain  ┌───────────┐  draw()  ┌──────────┐
//! │ source/    │ ◄────── │  tracker/   │ ◄───── │ respond / │ ───────► │  ui.rs   │
//! │ (MCP HTTP) │         │ (loop+lock) │        │  app.rs   │          │ (render) │
//! └────────────┘         └─────────────┘        └───────────┘          └──────────┘
//!                                                     ▲
//!                                                     │ handle_key_event()
//!                                                ┌──────────┐
//!                                                │ input.rs │
//!                                                └──────────┘
//! ```
//!
//! * **`source/`** — the `Fetcher` trait and the MCP JSON-RPC implementation.
//! * **`tracker/`** — the bounded per-key cache, its background refresh loop
//!   and the atomic drain operations.
//! * **`respond`** — maps a requested key to a drain and renders the reply.
//! * **`app`** / **`ui`** / **`input`** — the terminal console, a local
//!   consumer of the tracker.
//! * **`config`** / **`logging`** — command line, environment and tracing.
//! * **`main`** — wires everything together: parse args, start the tracker,
//!   run the console (or wait headless), shut down.

mod app;
mod config;
mod input;
mod logging;
mod respond;
mod source;
mod tracker;
mod ui;

use std::io;
use std::sync::Arc;
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

use app::App;
use config::Args;
use source::McpFetcher;
use tracker::Tracker;

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
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

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// Run the interactive console until the user quits.
///
/// Runs at ~10 fps (100 ms tick).  Each iteration:
///   1. Re-read pending counts from the tracker.
///   2. Render the UI.
///   3. Poll for keyboard input (non-blocking, up to tick_rate).
fn run_console(tracker: &Tracker) -> Result<()> {
    install_panic_hook();
    let mut guard = TerminalGuard::new().context("failed to set up terminal")?;
    let mut app = App::new();
    let tick_rate = Duration::from_millis(100);

    loop {
        app.sync(tracker);

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, tracker, key);
            }
        }

        if app.quit {
            break;
        }
    }

    // `guard` is dropped here, restoring the terminal.
    Ok(())
}

/// Run without a console until Ctrl+C, then print whatever was never
/// delivered so it is not lost with the process.
async fn run_headless(tracker: &Tracker) -> Result<()> {
    info!(keys = ?tracker.keys(), "running headless; press Ctrl+C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    info!("Ctrl+C received, shutting down");

    tracker.shutdown().await;
    println!("{}", respond::respond_all(tracker));
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard =
        logging::init(args.headless, &args.log_file).context("failed to set up logging")?;

    let tracker_config = args
        .tracker_config()
        .context("invalid tracker configuration")?;
    let mcp_config = args.mcp_config().context("invalid fetcher configuration")?;
    let fetcher = McpFetcher::new(mcp_config).context("failed to build HTTP client")?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let tracker = Tracker::new(tracker_config, Arc::new(fetcher));
    {
        let _enter = runtime.enter();
        tracker.start();
    }

    let result = if args.headless {
        runtime.block_on(run_headless(&tracker))
    } else {
        run_console(&tracker)
    };

    runtime.block_on(tracker.shutdown());
    result
}
