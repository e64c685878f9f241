// SPDX-License-Identifier: MIT
//
// Two-state view navigation layered over a synthetic history stack. The
// stack mirrors what a browser history would hold: entering chat pushes a
// Chat entry, leaving pushes a Home entry (never pops), and a back
// notification pops before the guard reacts. From Home, back opens the
// exit-confirmation gate instead of leaving silently.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum View {
    Home,
    Chat,
}

/// What the caller should do after a back notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BackAction {
    /// Was in chat: now back on Home, scroll the viewport to the top.
    ExitedChat,
    /// Was on Home: the exit-confirmation prompt is now showing.
    ConfirmExit,
}

pub(crate) struct ViewHistoryGuard {
    view: View,
    stack: Vec<View>,
    exit_prompt: bool,
}

impl ViewHistoryGuard {
    /// Starts on Home with the initial history entry tagged Home, the
    /// equivalent of replacing the landing entry.
    pub(crate) fn new() -> Self {
        Self {
            view: View::Home,
            stack: vec![View::Home],
            exit_prompt: false,
        }
    }

    pub(crate) fn view(&self) -> View {
        self.view
    }

    pub(crate) fn exit_prompt_open(&self) -> bool {
        self.exit_prompt
    }

    /// Submission always forces chat view; re-entering from Chat leaves
    /// the stack alone.
    pub(crate) fn enter_chat(&mut self) {
        if self.view == View::Chat {
            return;
        }
        self.view = View::Chat;
        self.stack.push(View::Chat);
    }

    /// Programmatic back affordance: pushes (never pops) a Home entry.
    pub(crate) fn exit_chat(&mut self) {
        self.view = View::Home;
        self.stack.push(View::Home);
    }

    /// Handle an external back navigation. The environment has already
    /// popped the current history entry; react so the stack top and the
    /// view agree again before this call returns.
    pub(crate) fn pop_notification(&mut self) -> BackAction {
        self.stack.pop();
        if self.view == View::Chat {
            self.exit_chat();
            BackAction::ExitedChat
        } else {
            self.exit_prompt = true;
            BackAction::ConfirmExit
        }
    }

    /// Close the exit prompt; the caller tears the session down.
    pub(crate) fn confirm_exit(&mut self) {
        self.exit_prompt = false;
    }

    /// Stay: re-push a Home entry so the stack top matches the view again.
    pub(crate) fn cancel_exit(&mut self) {
        self.exit_prompt = false;
        self.stack.push(View::Home);
    }

    /// Invariant check: the current history entry's tag equals the view.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        self.stack.last() == Some(&self.view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_chat_pushes_once_and_is_idempotent() {
        let mut guard = ViewHistoryGuard::new();
        assert_eq!(guard.view(), View::Home);
        assert!(guard.is_consistent());

        guard.enter_chat();
        assert_eq!(guard.view(), View::Chat);
        assert!(guard.is_consistent());

        // Submitting again from chat view leaves the stack alone.
        guard.enter_chat();
        assert_eq!(guard.stack.len(), 2);
    }

    #[test]
    fn back_from_chat_returns_home_without_prompt() {
        let mut guard = ViewHistoryGuard::new();
        guard.enter_chat();

        let action = guard.pop_notification();
        assert_eq!(action, BackAction::ExitedChat);
        assert_eq!(guard.view(), View::Home);
        assert!(!guard.exit_prompt_open());
        assert!(guard.is_consistent());
    }

    #[test]
    fn back_from_home_opens_the_exit_prompt() {
        let mut guard = ViewHistoryGuard::new();
        let action = guard.pop_notification();
        assert_eq!(action, BackAction::ConfirmExit);
        assert!(guard.exit_prompt_open());
        assert_eq!(guard.view(), View::Home);
    }

    #[test]
    fn cancelling_the_exit_prompt_restores_stack_consistency() {
        let mut guard = ViewHistoryGuard::new();
        guard.pop_notification();
        guard.cancel_exit();
        assert!(!guard.exit_prompt_open());
        assert_eq!(guard.view(), View::Home);
        assert!(guard.is_consistent());
    }

    #[test]
    fn confirming_just_closes_the_prompt() {
        let mut guard = ViewHistoryGuard::new();
        guard.pop_notification();
        guard.confirm_exit();
        assert!(!guard.exit_prompt_open());
    }

    #[test]
    fn explicit_exit_pushes_home_rather_than_popping() {
        let mut guard = ViewHistoryGuard::new();
        guard.enter_chat();
        let depth = guard.stack.len();
        guard.exit_chat();
        assert_eq!(guard.stack.len(), depth + 1);
        assert_eq!(guard.view(), View::Home);
        assert!(guard.is_consistent());
    }
}
