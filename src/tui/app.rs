// SPDX-License-Identifier: MIT
//
// Application state for the TUI: the controller that wires the input box,
// the transcript, the attachment slot, the request lifecycle and the
// view/history guard together. The event loop in `tui::mod` feeds it key
// events, ticks, and request completions.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::api::BotClient;
use crate::attachment::AttachmentStore;
use crate::config::{Config, Theme};
use crate::error::Result;
use crate::lifecycle::RequestLifecycle;
use crate::session::{DEFAULT_USER_NAME, Session};
use crate::transcript::Transcript;

use super::view::{BackAction, View, ViewHistoryGuard};

/// Home-view prompts, the suggestion tiles of the original interface.
pub(crate) const SUGGESTIONS: &[&str] = &[
    "What is dharma?",
    "How can I find inner peace?",
    "What does Krishna say about duty?",
    "How should I deal with failure?",
];

/// A request handed to the event loop to spawn. Carries the lifecycle
/// token so the completion can be matched against the active request.
pub(crate) struct OutboundRequest {
    pub seq: u64,
    pub cancelled: Arc<AtomicBool>,
    pub question: String,
}

/// Completion notification sent back from the request task.
pub(crate) struct ChatOutcome {
    pub seq: u64,
    pub result: Result<String>,
}

enum SlashCommand {
    Quit,
    Clear,
    Theme,
    Attach(PathBuf),
    Detach,
}

pub(crate) struct App {
    pub input: String,
    pub cursor: usize, // byte index in input
    pub transcript: Transcript,
    pub attachments: AttachmentStore,
    pub lifecycle: RequestLifecycle,
    pub guard: ViewHistoryGuard,
    pub client: BotClient,
    pub session: Option<Session>,
    pub config: Config,
    pub theme: Theme,
    pub suggestion_index: usize,
    pub spinner_frame: usize,
    pub scroll: u16,
    pub stick_to_bottom: bool,
    pub status_note: Option<String>,
    pub should_exit: bool,
    outbound: Option<OutboundRequest>,
    pending_handle: Option<crate::transcript::BotHandle>,
}

impl App {
    pub(crate) fn new(client: BotClient, session: Option<Session>, config: &Config) -> Self {
        Self {
            input: String::new(),
            cursor: 0,
            transcript: Transcript::new(),
            attachments: AttachmentStore::new(),
            lifecycle: RequestLifecycle::new(),
            guard: ViewHistoryGuard::new(),
            client,
            session,
            config: config.clone(),
            theme: config.theme,
            suggestion_index: 0,
            spinner_frame: 0,
            scroll: 0,
            stick_to_bottom: true,
            status_note: None,
            should_exit: false,
            outbound: None,
            pending_handle: None,
        }
    }

    pub(crate) fn greeting(&self) -> String {
        let name = self
            .session
            .as_ref()
            .map(|s| s.user_name.as_str())
            .unwrap_or(DEFAULT_USER_NAME);
        format!("Hello {name}! Welcome to Gita Bot!")
    }

    /// Hand the prepared request to the event loop, which spawns the
    /// network task. Requests cancelled before pickup are discarded.
    pub(crate) fn take_outbound(&mut self) -> Option<OutboundRequest> {
        let request = self.outbound.take()?;
        if request.cancelled.load(std::sync::atomic::Ordering::SeqCst) {
            return None;
        }
        Some(request)
    }

    // ---- submission ----

    pub(crate) fn submit_message(&mut self) {
        self.status_note = None;

        let trimmed = self.input.trim().to_string();
        if trimmed.is_empty() {
            return;
        }

        if let Some(cmd_str) = trimmed.strip_prefix('/') {
            match parse_slash_command(cmd_str) {
                Some(cmd) => self.handle_slash_command(cmd),
                None => self.status_note = Some(format!("Unknown command: /{cmd_str}")),
            }
            self.clear_input();
            return;
        }

        // One request at a time: the lifecycle precondition is the source
        // of truth, the disabled send affordance is only cosmetics.
        let Some(token) = self.lifecycle.start() else {
            return;
        };

        let snapshot = self.attachments.take();
        self.transcript.append_user(&trimmed, snapshot);
        self.guard.enter_chat();
        self.pending_handle = Some(self.transcript.append_pending_bot());
        debug_assert!(self.transcript.has_pending());
        self.outbound = Some(OutboundRequest {
            seq: token.seq,
            cancelled: token.cancelled,
            question: trimmed,
        });

        self.clear_input();
        self.scroll_to_bottom();
    }

    /// Enter on the Home view with an empty input submits the highlighted
    /// suggestion, like clicking a suggestion tile.
    pub(crate) fn submit_suggestion(&mut self) {
        if let Some(text) = SUGGESTIONS.get(self.suggestion_index) {
            self.input = text.to_string();
            self.cursor = self.input.len();
            self.submit_message();
        }
    }

    /// Deliver a request completion. Stale completions (cancelled or
    /// superseded tokens) are dropped without touching the transcript.
    pub(crate) fn on_outcome(&mut self, outcome: ChatOutcome) {
        if !self.lifecycle.try_settle(outcome.seq) {
            return;
        }
        let Some(handle) = self.pending_handle.take() else {
            return;
        };

        match outcome.result {
            Ok(text) => self.transcript.settle(handle, &text),
            Err(err) => self.transcript.fail(handle, &err.tui_message()),
        };

        // Terminal transition: the attachment slot must be empty.
        self.attachments.clear();
        self.scroll_to_bottom();
    }

    /// Stop affordance: abort the in-flight request, leaving the bot
    /// entry unresolved. No-op when nothing is pending.
    pub(crate) fn stop_response(&mut self) {
        if !self.lifecycle.cancel() {
            return;
        }
        if let Some(handle) = self.pending_handle.take() {
            self.transcript.release(handle);
        }
        self.attachments.clear();
    }

    // ---- view / history ----

    pub(crate) fn handle_back(&mut self) {
        if self.guard.exit_prompt_open() {
            // Esc inside the prompt reads as "stay".
            self.guard.cancel_exit();
            return;
        }
        match self.guard.pop_notification() {
            BackAction::ExitedChat => self.scroll_to_top(),
            BackAction::ConfirmExit => {}
        }
    }

    pub(crate) fn confirm_exit(&mut self) {
        self.guard.confirm_exit();
        self.should_exit = true;
    }

    pub(crate) fn cancel_exit(&mut self) {
        self.guard.cancel_exit();
    }

    // ---- commands ----

    fn handle_slash_command(&mut self, cmd: SlashCommand) {
        match cmd {
            SlashCommand::Quit => self.should_exit = true,
            SlashCommand::Clear => self.delete_chats(),
            SlashCommand::Theme => self.toggle_theme(),
            SlashCommand::Attach(path) => match self.attachments.attach(&path) {
                Ok(()) => {
                    if let Some(pending) = self.attachments.pending() {
                        self.status_note = Some(format!("Attached {}", pending.file_name));
                    }
                }
                Err(err) => self.status_note = Some(format!("Attach failed: {err}")),
            },
            SlashCommand::Detach => {
                self.attachments.clear();
                self.status_note = Some("Attachment removed".into());
            }
        }
    }

    /// Delete-chats action. Cancels any in-flight request first so the
    /// lifecycle never points at a cleared entry.
    pub(crate) fn delete_chats(&mut self) {
        if self.lifecycle.is_pending() {
            self.stop_response();
        }
        self.transcript.clear_all();
        if self.guard.view() == View::Chat {
            self.guard.exit_chat();
        }
        self.scroll_to_top();
    }

    /// Saves through the config captured at startup; only the theme field
    /// changes, the endpoint is never rewritten.
    pub(crate) fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
        self.config.theme = self.theme;
        if let Err(err) = self.config.save() {
            self.status_note = Some(format!("Could not save theme: {err}"));
        } else {
            self.status_note = Some(format!("Theme: {}", self.theme.as_str()));
        }
    }

    // ---- ticking / scrolling ----

    /// Advance the waiting spinner. Returns true when a redraw is needed.
    pub(crate) fn tick(&mut self) -> bool {
        if self.lifecycle.is_pending() {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
            true
        } else {
            false
        }
    }

    pub(crate) fn scroll_up(&mut self) {
        self.stick_to_bottom = false;
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub(crate) fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub(crate) fn scroll_to_bottom(&mut self) {
        self.stick_to_bottom = true;
    }

    pub(crate) fn scroll_to_top(&mut self) {
        self.stick_to_bottom = false;
        self.scroll = 0;
    }

    pub(crate) fn suggestion_up(&mut self) {
        self.suggestion_index = self.suggestion_index.saturating_sub(1);
    }

    pub(crate) fn suggestion_down(&mut self) {
        self.suggestion_index = (self.suggestion_index + 1).min(SUGGESTIONS.len() - 1);
    }

    // ---- input editing ----

    pub(crate) fn insert_char(&mut self, ch: char) {
        self.input.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub(crate) fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_char_boundary(&self.input, self.cursor);
        self.input.drain(prev..self.cursor);
        self.cursor = prev;
    }

    pub(crate) fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = prev_char_boundary(&self.input, self.cursor);
        }
    }

    pub(crate) fn move_right(&mut self) {
        if self.cursor < self.input.len() {
            self.cursor = next_char_boundary(&self.input, self.cursor);
        }
    }

    pub(crate) fn move_to_start(&mut self) {
        self.cursor = 0;
    }

    pub(crate) fn move_to_end(&mut self) {
        self.cursor = self.input.len();
    }

    pub(crate) fn clear_input(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }
}

fn prev_char_boundary(text: &str, offset: usize) -> usize {
    let mut i = offset.saturating_sub(1);
    while i > 0 && !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn next_char_boundary(text: &str, offset: usize) -> usize {
    let mut i = (offset + 1).min(text.len());
    while i < text.len() && !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

fn parse_slash_command(cmd: &str) -> Option<SlashCommand> {
    let mut parts = cmd.splitn(2, char::is_whitespace);
    let name = parts.next()?;
    let arg = parts.next().map(str::trim).unwrap_or_default();

    match name {
        "quit" | "q" => Some(SlashCommand::Quit),
        "clear" => Some(SlashCommand::Clear),
        "theme" => Some(SlashCommand::Theme),
        "attach" if !arg.is_empty() => Some(SlashCommand::Attach(PathBuf::from(arg))),
        "detach" => Some(SlashCommand::Detach),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::transcript::{EntryStatus, PLACEHOLDER, Role};
    use std::io::Write;

    fn test_app() -> App {
        App::new(
            BotClient::new("http://127.0.0.1:8000"),
            None,
            &Config::default(),
        )
    }

    fn type_and_submit(app: &mut App, text: &str) {
        app.input = text.to_string();
        app.cursor = app.input.len();
        app.submit_message();
    }

    #[test]
    fn submit_appends_user_and_pending_bot_entries() {
        let mut app = test_app();
        type_and_submit(&mut app, "What is dharma?");

        let entries = app.transcript.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, Role::User);
        assert_eq!(entries[0].text, "What is dharma?");
        assert_eq!(entries[0].status, EntryStatus::Complete);
        assert_eq!(entries[1].role, Role::Bot);
        assert_eq!(entries[1].status, EntryStatus::Pending);
        assert_eq!(entries[1].text, PLACEHOLDER);

        assert_eq!(app.guard.view(), View::Chat);
        assert!(app.lifecycle.is_pending());
        assert!(app.input.is_empty());

        let request = app.take_outbound().unwrap();
        assert_eq!(request.question, "What is dharma?");

        // Success completion renders the answer into the pending entry.
        app.on_outcome(ChatOutcome {
            seq: request.seq,
            result: Ok("Dharma means duty.".into()),
        });
        assert_eq!(app.transcript.entries()[1].text, "Dharma means duty.");
        assert_eq!(app.transcript.entries()[1].status, EntryStatus::Complete);
        assert!(!app.lifecycle.is_pending());
    }

    #[test]
    fn submission_is_rejected_while_a_request_is_pending() {
        let mut app = test_app();
        type_and_submit(&mut app, "first");
        let first = app.take_outbound().unwrap();

        type_and_submit(&mut app, "second");
        assert_eq!(app.transcript.entries().len(), 2);
        assert!(app.take_outbound().is_none());

        // After the first settles, submissions are accepted again.
        app.on_outcome(ChatOutcome {
            seq: first.seq,
            result: Ok("answer".into()),
        });
        type_and_submit(&mut app, "second again");
        assert_eq!(app.transcript.entries().len(), 4);
    }

    #[test]
    fn cancel_leaves_entry_unresolved_and_drops_the_late_response() {
        let mut app = test_app();
        type_and_submit(&mut app, "question");
        let request = app.take_outbound().unwrap();

        app.stop_response();
        assert!(!app.lifecycle.is_pending());
        assert_eq!(app.transcript.entries()[1].text, PLACEHOLDER);
        assert_eq!(app.transcript.entries()[1].status, EntryStatus::Pending);

        // Late success for the cancelled token never mutates the log.
        app.on_outcome(ChatOutcome {
            seq: request.seq,
            result: Ok("too late".into()),
        });
        assert_eq!(app.transcript.entries()[1].text, PLACEHOLDER);
    }

    #[test]
    fn cancelled_request_is_not_handed_to_the_event_loop() {
        let mut app = test_app();
        type_and_submit(&mut app, "question");
        app.stop_response();
        assert!(app.take_outbound().is_none());
    }

    #[test]
    fn failure_renders_the_error_message_and_clears_attachments() {
        let mut app = test_app();
        type_and_submit(&mut app, "question");
        let request = app.take_outbound().unwrap();

        app.on_outcome(ChatOutcome {
            seq: request.seq,
            result: Err(Error::Api {
                status: 500,
                message: "Model overloaded".into(),
            }),
        });
        assert_eq!(app.transcript.entries()[1].status, EntryStatus::Errored);
        assert_eq!(app.transcript.entries()[1].text, "Model overloaded");
        assert!(!app.attachments.is_active());
        assert!(!app.lifecycle.is_pending());
    }

    #[test]
    fn submitted_message_carries_the_attachment_and_empties_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gita.png");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"\x89PNG").unwrap();

        let mut app = test_app();
        app.attachments.attach(&path).unwrap();
        type_and_submit(&mut app, "What is this verse?");

        let entries = app.transcript.entries();
        let attachment = entries[0].attachment.as_ref().unwrap();
        assert_eq!(attachment.file_name, "gita.png");
        assert!(attachment.is_image);
        // Empty immediately after submission, not only at settle time.
        assert!(!app.attachments.is_active());
    }

    #[test]
    fn attachment_slot_is_empty_after_cancel_and_error_transitions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verse.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"dharma").unwrap();

        // Attached while a request is in flight, then cancelled.
        let mut app = test_app();
        type_and_submit(&mut app, "question");
        app.attachments.attach(&path).unwrap();
        assert!(app.attachments.is_active());
        app.stop_response();
        assert!(!app.attachments.is_active());

        // Attached while in flight, then the request errors out.
        type_and_submit(&mut app, "another question");
        let request = app.take_outbound().unwrap();
        app.attachments.attach(&path).unwrap();
        assert!(app.attachments.is_active());
        app.on_outcome(ChatOutcome {
            seq: request.seq,
            result: Err(Error::Api {
                status: 500,
                message: "Down for maintenance".into(),
            }),
        });
        assert!(!app.attachments.is_active());
    }

    #[test]
    fn theme_toggle_keeps_the_configured_endpoint() {
        let config = Config {
            endpoint: "http://gita.example.com".into(),
            theme: Theme::Dark,
        };
        let mut app = App::new(BotClient::new(&config.endpoint), None, &config);

        app.toggle_theme();
        assert_eq!(app.theme, Theme::Light);
        assert_eq!(app.config.theme, Theme::Light);
        assert_eq!(app.config.endpoint, "http://gita.example.com");
    }

    #[test]
    fn delete_chats_cancels_first_and_returns_home() {
        let mut app = test_app();
        type_and_submit(&mut app, "question");
        assert!(app.lifecycle.is_pending());

        app.delete_chats();
        assert!(app.transcript.is_empty());
        assert!(!app.lifecycle.is_pending());
        assert_eq!(app.guard.view(), View::Home);
    }

    #[test]
    fn unknown_slash_command_leaves_a_status_note() {
        let mut app = test_app();
        type_and_submit(&mut app, "/nonsense");
        assert!(app.status_note.as_ref().unwrap().contains("/nonsense"));
        assert!(app.transcript.is_empty());
    }

    #[test]
    fn input_editing_respects_char_boundaries() {
        let mut app = test_app();
        app.insert_char('क');
        app.insert_char('a');
        assert_eq!(app.input, "कa");
        app.backspace();
        app.backspace();
        assert!(app.input.is_empty());
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn greeting_uses_session_name_with_fallback() {
        let mut app = test_app();
        assert_eq!(app.greeting(), "Hello Parth! Welcome to Gita Bot!");
        app.session = Some(Session::new("65f2".into(), "Arjun".into()));
        assert_eq!(app.greeting(), "Hello Arjun! Welcome to Gita Bot!");
    }
}
