// SPDX-License-Identifier: MIT
// Terminal interface for Gita Bot.

mod app;
mod draw;
mod markdown;
mod view;

use std::io;
use std::sync::atomic::Ordering;
use std::time::Duration;

use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::prelude::*;
use tokio::time::interval;

use crate::api::BotClient;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::Session;

use app::{App, ChatOutcome, OutboundRequest};
use draw::draw;
use view::View;

pub(crate) async fn run(client: BotClient, session: Option<Session>, config: &Config) -> Result<()> {
    setup_terminal()?;

    // Restore the terminal on panic so the shell is not left in raw mode.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(client, session, config);
    let result = run_app(&mut terminal, app).await;

    restore_terminal()?;
    result
}

fn setup_terminal() -> io::Result<()> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    Ok(())
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
) -> Result<()> {
    let mut event_stream = EventStream::new();
    let mut tick_interval = interval(Duration::from_millis(100));
    let (outcome_tx, mut outcome_rx) = tokio::sync::mpsc::unbounded_channel::<ChatOutcome>();
    let mut needs_redraw = true;

    loop {
        if app.should_exit {
            return Ok(());
        }

        if needs_redraw {
            terminal.draw(|frame| draw(frame, &mut app))?;
            needs_redraw = false;
        }

        tokio::select! {
            _ = tick_interval.tick() => {
                if app.tick() {
                    needs_redraw = true;
                }
            }
            Some(outcome) = outcome_rx.recv() => {
                app.on_outcome(outcome);
                needs_redraw = true;
            }
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        handle_key(&mut app, key.code, key.modifiers);
                        needs_redraw = true;
                    }
                    Some(Ok(Event::Resize(..))) => {
                        needs_redraw = true;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err.into()),
                    None => return Ok(()),
                }
            }
        }

        // Submission handed off by the app: spawn the network task here so
        // the state machine itself never touches the runtime.
        if let Some(request) = app.take_outbound() {
            spawn_request(&app, request, outcome_tx.clone());
            needs_redraw = true;
        }
    }
}

/// Race the HTTP call against the token's cancel flag. The stop affordance
/// flips the flag; the loser's result is discarded by the stale-completion
/// guard on the other end either way.
fn spawn_request(
    app: &App,
    request: OutboundRequest,
    outcome_tx: tokio::sync::mpsc::UnboundedSender<ChatOutcome>,
) {
    let client = app.client.clone();
    let user_id = app.session.as_ref().map(|s| s.user_id.clone());

    tokio::spawn(async move {
        let cancelled = request.cancelled.clone();
        let watch_cancel = async {
            loop {
                if cancelled.load(Ordering::SeqCst) {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        };

        let result = tokio::select! {
            biased;
            _ = watch_cancel => Err(Error::Interrupted),
            result = client.ask(&request.question, user_id.as_deref()) => result,
        };

        let _ = outcome_tx.send(ChatOutcome {
            seq: request.seq,
            result,
        });
    });
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    // The exit prompt is modal.
    if app.guard.exit_prompt_open() {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_exit(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_exit(),
            _ => {}
        }
        return;
    }

    if modifiers.contains(KeyModifiers::CONTROL) {
        match code {
            KeyCode::Char('c') => {
                if app.lifecycle.is_pending() {
                    app.stop_response();
                } else {
                    app.handle_back();
                }
            }
            KeyCode::Char('a') => app.move_to_start(),
            KeyCode::Char('e') => app.move_to_end(),
            KeyCode::Char('l') => app.delete_chats(),
            KeyCode::Char('t') => app.toggle_theme(),
            _ => {}
        }
        return;
    }

    match code {
        KeyCode::Enter => {
            if app.guard.view() == View::Home && app.input.trim().is_empty() {
                app.submit_suggestion();
            } else {
                app.submit_message();
            }
        }
        KeyCode::Esc => app.handle_back(),
        KeyCode::Up => {
            if app.guard.view() == View::Home {
                app.suggestion_up();
            } else {
                app.scroll_up();
            }
        }
        KeyCode::Down => {
            if app.guard.view() == View::Home {
                app.suggestion_down();
            } else {
                app.scroll_down();
            }
        }
        KeyCode::PageUp => {
            for _ in 0..10 {
                app.scroll_up();
            }
        }
        KeyCode::PageDown => {
            for _ in 0..10 {
                app.scroll_down();
            }
        }
        KeyCode::Left => app.move_left(),
        KeyCode::Right => app.move_right(),
        KeyCode::Home => app.move_to_start(),
        KeyCode::End => app.move_to_end(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Char(ch) => app.insert_char(ch),
        _ => {}
    }
}
