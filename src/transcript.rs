// SPDX-License-Identifier: MIT
//
// Append-only message log with a single mutable pending-bot slot. Settled
// entries are never touched again; operations against a handle that no
// longer owns the slot are ignored.

use crate::attachment::PendingAttachment;

/// Placeholder shown while a bot reply is in flight.
pub(crate) const PLACEHOLDER: &str = "Just a sec...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    User,
    Bot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryStatus {
    Pending,
    Complete,
    Errored,
}

#[derive(Debug, Clone)]
pub(crate) struct ChatEntry {
    pub role: Role,
    pub text: String,
    pub attachment: Option<PendingAttachment>,
    pub status: EntryStatus,
}

/// Handle to the pending bot entry issued by `append_pending_bot`. Stale
/// handles (cancelled or superseded) fail the slot check and settle/fail
/// become no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BotHandle(u64);

#[derive(Default)]
pub(crate) struct Transcript {
    entries: Vec<ChatEntry>,
    pending: Option<(BotHandle, usize)>,
    next_handle: u64,
}

impl Transcript {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// User entries are complete the moment they are appended.
    pub(crate) fn append_user(&mut self, text: &str, attachment: Option<PendingAttachment>) {
        self.entries.push(ChatEntry {
            role: Role::User,
            text: text.to_string(),
            attachment,
            status: EntryStatus::Complete,
        });
    }

    /// Append the placeholder bot entry and take the pending slot. The
    /// no-other-pending precondition is the lifecycle's to enforce; if it
    /// is ever violated the previous pending entry is frozen in place.
    pub(crate) fn append_pending_bot(&mut self) -> BotHandle {
        let handle = BotHandle(self.next_handle);
        self.next_handle += 1;

        self.entries.push(ChatEntry {
            role: Role::Bot,
            text: PLACEHOLDER.to_string(),
            attachment: None,
            status: EntryStatus::Pending,
        });
        self.pending = Some((handle, self.entries.len() - 1));
        handle
    }

    /// Fill in the answer. Returns false (and changes nothing) for a stale
    /// handle.
    pub(crate) fn settle(&mut self, handle: BotHandle, text: &str) -> bool {
        self.resolve(handle, text, EntryStatus::Complete)
    }

    /// Record a failure message in error style. Stale handles are ignored.
    pub(crate) fn fail(&mut self, handle: BotHandle, message: &str) -> bool {
        self.resolve(handle, message, EntryStatus::Errored)
    }

    /// Cancel path: detach the pending entry without writing final text.
    /// The placeholder stays visible and the entry can never settle later.
    pub(crate) fn release(&mut self, handle: BotHandle) -> bool {
        match self.pending {
            Some((current, _)) if current == handle => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Delete-chats action. Callers cancel any in-flight request first.
    pub(crate) fn clear_all(&mut self) {
        self.entries.clear();
        self.pending = None;
    }

    fn resolve(&mut self, handle: BotHandle, text: &str, status: EntryStatus) -> bool {
        let Some((current, idx)) = self.pending else {
            return false;
        };
        if current != handle {
            return false;
        }

        let entry = &mut self.entries[idx];
        entry.text = text.to_string();
        entry.status = status;
        self.pending = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_entries_are_complete_immediately() {
        let mut log = Transcript::new();
        log.append_user("What is dharma?", None);
        assert_eq!(log.entries().len(), 1);
        assert_eq!(log.entries()[0].status, EntryStatus::Complete);
        assert!(!log.has_pending());
    }

    #[test]
    fn settle_fills_the_pending_entry_once() {
        let mut log = Transcript::new();
        let handle = log.append_pending_bot();
        assert!(log.has_pending());
        assert_eq!(log.entries()[0].text, PLACEHOLDER);

        assert!(log.settle(handle, "Dharma means duty."));
        assert_eq!(log.entries()[0].status, EntryStatus::Complete);
        assert_eq!(log.entries()[0].text, "Dharma means duty.");
        assert!(!log.has_pending());

        // A second settle against the same handle is a stale no-op.
        assert!(!log.settle(handle, "again"));
        assert_eq!(log.entries()[0].text, "Dharma means duty.");
    }

    #[test]
    fn fail_marks_the_entry_errored() {
        let mut log = Transcript::new();
        let handle = log.append_pending_bot();
        assert!(log.fail(handle, "Something went wrong."));
        assert_eq!(log.entries()[0].status, EntryStatus::Errored);
        assert_eq!(log.entries()[0].text, "Something went wrong.");
    }

    #[test]
    fn stale_handle_never_mutates_a_newer_pending_entry() {
        let mut log = Transcript::new();
        let old = log.append_pending_bot();
        log.release(old);
        let new = log.append_pending_bot();

        assert!(!log.settle(old, "late answer"));
        assert_eq!(log.entries()[1].text, PLACEHOLDER);
        assert!(log.has_pending());

        assert!(log.settle(new, "fresh answer"));
        assert_eq!(log.entries()[1].text, "fresh answer");
    }

    #[test]
    fn release_leaves_the_placeholder_unresolved() {
        let mut log = Transcript::new();
        let handle = log.append_pending_bot();
        assert!(log.release(handle));
        assert!(!log.has_pending());
        assert_eq!(log.entries()[0].text, PLACEHOLDER);
        assert_eq!(log.entries()[0].status, EntryStatus::Pending);
        // Released handles cannot settle afterwards.
        assert!(!log.settle(handle, "too late"));
    }

    #[test]
    fn clear_all_empties_log_and_slot() {
        let mut log = Transcript::new();
        log.append_user("hello", None);
        let _ = log.append_pending_bot();
        log.clear_all();
        assert!(log.is_empty());
        assert!(!log.has_pending());
    }
}
