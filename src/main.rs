mod app;
mod cart;
mod catalog;
mod config;
mod haptics;
mod input;
mod logging;
mod session;
mod timer;
mod ui;

use crate::app::action::Action;
use crate::app::event::AppEvent;
use crate::app::handler;
use crate::app::state::AppState;
use crate::cart::storage::{FileStore, KvStore, MemoryStore};
use crate::catalog::Catalog;
use crate::haptics::{Haptics, NoHaptics, TerminalBell};
use crate::session::notify::Severity;
use crate::timer::Scheduler;
use anyhow::{Context, Result};
use crossterm::{
    event::{
        DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        EventStream,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::prelude::*;
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Install panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    // Load config, writing the defaults on first run so they are easy to edit
    let cfg = config::load_config()?;
    let config_file = config::config_path();
    if !config_file.exists() {
        if let Err(e) = config::save_config(&cfg) {
            eprintln!("Could not write default config: {:#}", e);
        }
    }

    let log_file = logging::init(&cfg.logging)?;
    info!(config = %config_file.display(), log = ?log_file, "starting storefront");

    let catalog = Catalog::load(cfg.store.catalog_path.as_deref())?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, cfg, catalog).await;

    // Restore terminal
    restore_terminal()?;

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    Ok(())
}

/// The file-backed store, or an in-memory one when the data directory is
/// unusable. The cart works either way; it just won't survive a restart.
fn open_storage(data_dir: &str) -> (Box<dyn KvStore>, Option<String>) {
    let dir = config::expand_home(data_dir);
    match std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory {}", dir.display()))
    {
        Ok(()) => (Box::new(FileStore::new(dir)), None),
        Err(e) => {
            warn!(error = %format!("{:#}", e), "falling back to in-memory cart");
            (
                Box::new(MemoryStore::new()),
                Some("Cart won't be saved: data directory is not writable".to_string()),
            )
        }
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    cfg: config::AppConfig,
    catalog: Catalog,
) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();

    let (storage, storage_warning) = open_storage(&cfg.storage.data_dir);
    let long_ms = cfg.notifications.long_ms;
    let haptics: Arc<dyn Haptics> = if cfg.ui.bell {
        Arc::new(TerminalBell)
    } else {
        Arc::new(NoHaptics)
    };
    let mut state = AppState::new(
        cfg,
        catalog,
        storage,
        Scheduler::new(event_tx.clone()),
        haptics,
    );
    let restored = state.cart.hydrate();
    info!(lines = restored, "cart restored");
    if let Some(warning) = storage_warning {
        state.session.notify(warning, Severity::Error, Some(long_ms));
    }

    let size = terminal.size()?;
    state.set_screen_size(size.width, size.height);

    // Spawn terminal input task
    let term_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        loop {
            match reader.next().await {
                Some(Ok(event)) => {
                    if term_tx.send(AppEvent::Terminal(event)).is_err() {
                        break;
                    }
                }
                Some(Err(_)) => break,
                None => break,
            }
        }
    });

    // Initial render
    terminal.draw(|f| ui::render(f, &state))?;
    state.dirty = false;

    // Main event loop
    loop {
        let event = event_rx.recv().await;
        let Some(event) = event else { break };

        let actions = handler::handle_event(&mut state, event);

        for action in actions {
            match action {
                Action::PlaceCall { intent } => {
                    // No dialer in a terminal; the notification shows the number
                    info!(%intent, items = state.cart.item_count(), "call to order");
                }
                Action::Quit => {
                    state.should_quit = true;
                }
            }
        }

        if state.should_quit {
            break;
        }

        // Conditional render (only if dirty)
        if state.dirty {
            terminal.draw(|f| ui::render(f, &state))?;
            state.dirty = false;
        }
    }

    info!("storefront exiting");
    Ok(())
}
