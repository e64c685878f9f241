// SPDX-License-Identifier: MIT
//
// State machine for the single in-flight chat request. `start` issues a
// token (sequence number + cooperative cancel flag); the task racing the
// network call reports back with that token, and completions whose token
// is no longer active are dropped without touching any UI state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LifecycleState {
    Idle,
    Pending,
}

/// Identifies one outstanding request. The cancel flag is shared with the
/// spawned task, which polls it while the HTTP call is in flight.
#[derive(Debug, Clone)]
pub(crate) struct RequestToken {
    pub seq: u64,
    pub cancelled: Arc<AtomicBool>,
}

pub(crate) struct RequestLifecycle {
    state: LifecycleState,
    next_seq: u64,
    active: Option<RequestToken>,
}

impl RequestLifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: LifecycleState::Idle,
            next_seq: 0,
            active: None,
        }
    }

    pub(crate) fn state(&self) -> LifecycleState {
        self.state
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.state == LifecycleState::Pending
    }

    /// Begin a request. Rejected (None, no state change) unless Idle.
    pub(crate) fn start(&mut self) -> Option<RequestToken> {
        if self.state != LifecycleState::Idle {
            return None;
        }

        let token = RequestToken {
            seq: self.next_seq,
            cancelled: Arc::new(AtomicBool::new(false)),
        };
        self.next_seq += 1;
        self.active = Some(token.clone());
        self.state = LifecycleState::Pending;
        Some(token)
    }

    /// Accept a completion for `seq`. True only when it belongs to the
    /// active request; the lifecycle then returns to Idle. Anything else
    /// is a stale completion and is reported unaccepted.
    pub(crate) fn try_settle(&mut self, seq: u64) -> bool {
        match &self.active {
            Some(token) if token.seq == seq && self.state == LifecycleState::Pending => {
                self.active = None;
                self.state = LifecycleState::Idle;
                true
            }
            _ => false,
        }
    }

    /// User-triggered cancellation. Flags the active token so the task
    /// aborts, invalidates it so a late completion is dropped, and returns
    /// to Idle. No-op unless Pending.
    pub(crate) fn cancel(&mut self) -> bool {
        if self.state != LifecycleState::Pending {
            return false;
        }

        if let Some(token) = self.active.take() {
            token.cancelled.store(true, Ordering::SeqCst);
        }
        self.state = LifecycleState::Idle;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_is_rejected_while_pending() {
        let mut lifecycle = RequestLifecycle::new();
        let first = lifecycle.start().unwrap();
        assert_eq!(lifecycle.state(), LifecycleState::Pending);

        assert!(lifecycle.start().is_none());
        assert_eq!(lifecycle.state(), LifecycleState::Pending);

        assert!(lifecycle.try_settle(first.seq));
        assert_eq!(lifecycle.state(), LifecycleState::Idle);
    }

    #[test]
    fn tokens_are_unique_across_requests() {
        let mut lifecycle = RequestLifecycle::new();
        let first = lifecycle.start().unwrap();
        lifecycle.try_settle(first.seq);
        let second = lifecycle.start().unwrap();
        assert_ne!(first.seq, second.seq);
    }

    #[test]
    fn cancel_outside_pending_is_a_noop() {
        let mut lifecycle = RequestLifecycle::new();
        assert!(!lifecycle.cancel());
        assert_eq!(lifecycle.state(), LifecycleState::Idle);
    }

    #[test]
    fn cancel_flags_the_token_and_returns_to_idle() {
        let mut lifecycle = RequestLifecycle::new();
        let token = lifecycle.start().unwrap();
        assert!(lifecycle.cancel());
        assert!(token.cancelled.load(Ordering::SeqCst));
        assert_eq!(lifecycle.state(), LifecycleState::Idle);
    }

    #[test]
    fn completion_for_a_cancelled_token_is_stale() {
        let mut lifecycle = RequestLifecycle::new();
        let token = lifecycle.start().unwrap();
        lifecycle.cancel();
        assert!(!lifecycle.try_settle(token.seq));
    }

    #[test]
    fn completion_for_a_superseded_token_is_stale() {
        let mut lifecycle = RequestLifecycle::new();
        let old = lifecycle.start().unwrap();
        lifecycle.cancel();
        let new = lifecycle.start().unwrap();

        assert!(!lifecycle.try_settle(old.seq));
        assert_eq!(lifecycle.state(), LifecycleState::Pending);
        assert!(lifecycle.try_settle(new.seq));
    }
}
