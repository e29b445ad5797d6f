mod config;

use std::fs::File;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use adbscope_adb::{AdbSource, resolve_adb};
use adbscope_logs::{IngestState, IngestionSession, StopOutcome};
use adbscope_tui::{
    Action, AppState, Event, EventHandler, HelpOverlay, KeyBindings, KeyContext, LogViewerScreen,
    PAGE_SIZE, Tui,
};

use crate::config::{Cli, Config, load_config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_tracing(config.log_file.as_deref())?;

    // Run the application
    let result = run_app(config).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

/// The UI owns the terminal, so diagnostics go to a file or nowhere
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {:?}", path))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .init();
        }
    }

    Ok(())
}

async fn run_app(config: Config) -> Result<()> {
    let adb = resolve_adb(config.adb.as_deref(), config.sdk_root.as_deref());
    info!(adb = %adb.display(), "Using adb executable");

    let mut session = IngestionSession::new(config.session(), Arc::new(AdbSource::new(adb)))
        .context("Invalid buffer settings")?;
    let mut state = AppState::new(config.tag.clone(), config.tag_filter, config.clear_on_start);

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut tui = Tui::new().context("Failed to set up terminal")?;
    let mut events = EventHandler::new(config.tick_rate());
    let keybindings = KeyBindings::new();

    if config.autostart {
        start_ingestion(&mut session, &mut state).await;
    }

    // Initial render
    render(&mut tui, &mut state, &mut session)?;

    // Main event loop
    loop {
        tokio::select! {
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        let action = if state.ui_state.filter_input_active {
                            keybindings.get_filter_input_action(&key)
                        } else {
                            keybindings.get_action(KeyContext::LogViewer, &key)
                        };
                        if let Some(action) = action {
                            let _ = action_tx.send(action);
                        }
                    }
                    Event::Tick => {
                        let _ = action_tx.send(Action::Tick);
                    }
                    Event::Resize(_, _) => {
                        let _ = action_tx.send(Action::Render);
                    }
                    Event::Error(e) => {
                        let _ = action_tx.send(Action::ShowError(e));
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                handle_action(&mut session, &mut state, action).await;
            }
            else => break,
        }

        if state.should_quit {
            break;
        }

        if state.render_dirty {
            render(&mut tui, &mut state, &mut session)?;
        }
    }

    // Cleanup
    session.stop().await;
    events.shutdown();
    tui.restore()?;

    Ok(())
}

fn render(tui: &mut Tui, state: &mut AppState, session: &mut IngestionSession) -> Result<()> {
    session.refresh_view();
    tui.draw(|frame| {
        LogViewerScreen::render(frame, state, session);
        if state.ui_state.help_visible {
            HelpOverlay::render(frame);
        }
    })?;
    state.render_dirty = false;
    Ok(())
}

async fn handle_action(session: &mut IngestionSession, state: &mut AppState, action: Action) {
    // Ticks only render when something changed
    if action != Action::Tick {
        state.render_dirty = true;
    }

    match action {
        Action::Quit => {
            state.should_quit = true;
        }
        Action::StartIngestion => {
            start_ingestion(session, state).await;
        }
        Action::StopIngestion => {
            stop_ingestion(session, state).await;
        }
        Action::ToggleIngestion => {
            if session.controller().is_running() {
                stop_ingestion(session, state).await;
            } else {
                start_ingestion(session, state).await;
            }
        }
        Action::ClearLogs => {
            session.clear();
            state.reset_scroll();
        }
        Action::ToggleTagFilter => {
            if session.state() == IngestState::Idle {
                state.toggle_tag_filter();
            } else {
                state.show_error("Stop logcat to change the tag filter");
            }
        }
        Action::ToggleSeverity(severity) => {
            session.criteria_mut().toggle_severity(severity);
        }
        Action::ShowAllSeverities => {
            session.criteria_mut().clear_severities();
        }
        Action::OpenFilter => {
            state.open_filter();
        }
        Action::CloseFilter => {
            state.close_filter();
        }
        Action::FilterInput(c) => {
            session.criteria_mut().push_char(c);
        }
        Action::FilterBackspace => {
            session.criteria_mut().pop_char();
        }
        Action::FilterClear => {
            session.criteria_mut().clear_text();
        }
        Action::ClearFilter => {
            session.criteria_mut().clear_text();
            state.close_filter();
        }
        Action::ScrollUp(n) => {
            state.scroll_up(n);
        }
        Action::ScrollDown(n) => {
            state.scroll_down(n);
        }
        Action::PageUp => {
            state.scroll_up(PAGE_SIZE);
        }
        Action::PageDown => {
            state.scroll_down(PAGE_SIZE);
        }
        Action::ScrollToTop => {
            state.scroll_to_top();
        }
        Action::ScrollToBottom => {
            state.scroll_to_bottom();
        }
        Action::ToggleAutoScroll => {
            state.toggle_auto_scroll();
        }
        Action::ToggleTimestamps => {
            state.ui_state.show_timestamps = !state.ui_state.show_timestamps;
        }
        Action::ToggleChannels => {
            state.ui_state.show_channels = !state.ui_state.show_channels;
        }
        Action::ToggleStats => {
            state.ui_state.stats_visible = !state.ui_state.stats_visible;
        }
        Action::ToggleHelp => {
            state.ui_state.help_visible = !state.ui_state.help_visible;
        }
        Action::ShowError(msg) => {
            state.show_error(msg);
        }
        Action::DismissError => {
            state.dismiss_error();
        }
        Action::Tick => {
            // adb went away (device unplugged, server killed): back to Idle
            if session.controller().source_exited() {
                warn!("Log source exited");
                session.stop().await;
                state.show_error("logcat exited; press r to restart");
                state.render_dirty = true;
            }

            let revision = session.buffer().revision();
            if revision != state.last_revision {
                state.last_revision = revision;
                state.render_dirty = true;
            }
        }
        Action::Render => {}
    }
}

async fn start_ingestion(session: &mut IngestionSession, state: &mut AppState) {
    match session.start(&state.start_options()).await {
        Ok(()) => {
            state.dismiss_error();
            state.reset_scroll();
        }
        Err(e) => {
            warn!(error = %e, "Could not start logcat");
            state.show_error(e.to_string());
        }
    }
}

async fn stop_ingestion(session: &mut IngestionSession, state: &mut AppState) {
    if session.stop().await == StopOutcome::TimedOut {
        state.show_error("logcat did not exit in time and was abandoned");
    }
}
