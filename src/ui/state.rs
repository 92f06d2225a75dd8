use std::time::{Duration, Instant};

use crate::common::{ChatMessage, UserIdentity};

/// How long an error notification stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Chat,
}

/// A transient error notification.
#[derive(Debug, Clone)]
pub struct Toast {
    pub text: String,
    pub created: Instant,
}

/// Login form contents and request status.
#[derive(Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub username: String,
    /// False = sign in, true = register a new account.
    pub registering: bool,
    /// An auth request is in flight; the form is locked meanwhile.
    pub pending: bool,
    pub error: Option<String>,
}

/// Local UI state. Mutated only on the UI thread, either from user
/// gestures or from drained backend events.
pub struct AppState {
    pub view: View,
    pub user: Option<UserIdentity>,
    pub messages: Vec<ChatMessage>,
    pub input_text: String,
    pub login: LoginForm,
    pub toasts: Vec<Toast>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            view: View::Login,
            user: None,
            messages: Vec::new(),
            input_text: String::new(),
            login: LoginForm::default(),
            toasts: Vec::new(),
        }
    }

    pub fn signed_in(&mut self, user: UserIdentity) {
        self.user = Some(user);
        self.view = View::Chat;
        self.login.pending = false;
        self.login.error = None;
        self.login.password.clear();
    }

    pub fn sign_in_failed(&mut self, reason: String) {
        self.login.pending = false;
        self.login.error = Some(reason);
    }

    /// Replace the list wholesale with the fetched history. A fetch
    /// that resolves after live events have already arrived overwrites
    /// them; the next live event still appends on top.
    pub fn history_loaded(&mut self, mut history: Vec<ChatMessage>) {
        history.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        self.messages = history;
    }

    pub fn history_fetch_failed(&mut self) {
        self.push_toast("Error fetching messages");
    }

    /// Append a pushed insert. No deduplication, no reordering.
    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn message_sent(&mut self) {
        self.input_text.clear();
    }

    pub fn message_send_failed(&mut self) {
        self.push_toast("Error sending message");
    }

    pub fn signed_out(&mut self) {
        self.view = View::Login;
        self.user = None;
        self.messages.clear();
        self.input_text.clear();
    }

    /// A message is "mine" only once the identity has resolved and
    /// matches the author.
    pub fn is_own_message(&self, message: &ChatMessage) -> bool {
        self.user
            .as_ref()
            .is_some_and(|user| user.id == message.user_id)
    }

    pub fn push_toast(&mut self, text: &str) {
        self.toasts.push(Toast {
            text: text.to_string(),
            created: Instant::now(),
        });
    }

    pub fn prune_toasts(&mut self, now: Instant) {
        self.toasts
            .retain(|toast| now.duration_since(toast.created) < TOAST_TTL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn message(id: &str, content: &str, user_id: &str, created_at: &str) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            content: content.to_string(),
            username: format!("user-{user_id}"),
            user_id: user_id.to_string(),
            created_at: created_at.parse::<DateTime<Utc>>().unwrap(),
        }
    }

    fn identity(id: &str) -> UserIdentity {
        UserIdentity {
            id: id.to_string(),
            email: None,
            username: format!("user-{id}"),
        }
    }

    #[test]
    fn history_is_sorted_by_creation_time() {
        let mut state = AppState::new();
        state.history_loaded(vec![
            message("m2", "second", "a", "2026-08-01T10:01:00Z"),
            message("m1", "first", "b", "2026-08-01T10:00:00Z"),
        ]);

        let contents: Vec<&str> = state.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second"]);
    }

    #[test]
    fn live_event_appends_after_history() {
        // History [hi by A, yo by B], then a live "sup" by A.
        let mut state = AppState::new();
        state.history_loaded(vec![
            message("m1", "hi", "a", "2026-08-01T10:00:00Z"),
            message("m2", "yo", "b", "2026-08-01T10:00:30Z"),
        ]);
        state.push_message(message("m3", "sup", "a", "2026-08-01T10:01:00Z"));

        let contents: Vec<&str> = state.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["hi", "yo", "sup"]);
    }

    #[test]
    fn successful_send_clears_input_before_live_event_arrives() {
        let mut state = AppState::new();
        state.input_text = "hello".to_string();

        state.message_sent();

        assert!(state.input_text.is_empty());
        assert!(state.messages.is_empty());
    }

    #[test]
    fn failed_send_keeps_input_and_raises_one_toast() {
        let mut state = AppState::new();
        state.input_text = "hello".to_string();

        state.message_send_failed();

        assert_eq!(state.input_text, "hello");
        assert_eq!(state.toasts.len(), 1);
    }

    #[test]
    fn failed_history_fetch_leaves_messages_and_raises_one_toast() {
        let mut state = AppState::new();
        state.push_message(message("m1", "hi", "a", "2026-08-01T10:00:00Z"));

        state.history_fetch_failed();

        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.toasts.len(), 1);
    }

    #[test]
    fn no_message_is_own_before_identity_resolves() {
        let mut state = AppState::new();
        let mine = message("m1", "hi", "a", "2026-08-01T10:00:00Z");

        assert!(!state.is_own_message(&mine));

        state.signed_in(identity("a"));
        assert!(state.is_own_message(&mine));
        assert!(!state.is_own_message(&message("m2", "yo", "b", "2026-08-01T10:00:30Z")));
    }

    #[test]
    fn sign_out_returns_to_login_and_clears_chat_state() {
        let mut state = AppState::new();
        state.signed_in(identity("a"));
        state.push_message(message("m1", "hi", "a", "2026-08-01T10:00:00Z"));
        state.input_text = "draft".to_string();

        state.signed_out();

        assert_eq!(state.view, View::Login);
        assert!(state.user.is_none());
        assert!(state.messages.is_empty());
        assert!(state.input_text.is_empty());
    }

    #[test]
    fn expired_toasts_are_pruned() {
        let mut state = AppState::new();
        state.push_toast("stale");
        state.push_toast("fresh");

        state.prune_toasts(Instant::now());
        assert_eq!(state.toasts.len(), 2);

        state.prune_toasts(Instant::now() + TOAST_TTL);
        assert!(state.toasts.is_empty());
    }
}
