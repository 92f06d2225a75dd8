use crate::common::types::{ChatMessage, UserIdentity};

/// Events the backend task pushes up to the UI.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    SignedIn(UserIdentity),
    SignInFailed(String),
    /// Full history fetch finished; replaces whatever the UI holds.
    HistoryLoaded(Vec<ChatMessage>),
    HistoryFetchFailed(String),
    /// A row pushed over the live subscription.
    MessageInserted(ChatMessage),
    /// Our own insert was accepted (the row itself arrives as
    /// `MessageInserted` once the change feed delivers it).
    MessageSent,
    MessageSendFailed(String),
    SignedOut,
}
