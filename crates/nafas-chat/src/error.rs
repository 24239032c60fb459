//! Error types for the chat layer.

/// Errors from transcript operations and the send protocol.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The message text was empty or whitespace. Rejected locally; no
    /// request is issued.
    #[error("message text is empty")]
    EmptyMessage,

    /// A message is already awaiting its reply. One exchange at a time.
    #[error("a message is already in flight")]
    SendInFlight,

    /// The operation requires a credential and none is held.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The service rejected the token; the implicit logout has already
    /// happened by the time the caller sees this.
    #[error("session rejected by the service")]
    SessionRejected,

    /// The credential changed while the request was in flight; the response
    /// was discarded.
    #[error("logged out while the request was in flight")]
    LoggedOut,

    /// The requested session does not exist (or belongs to someone else).
    #[error("unknown chat session: {0}")]
    UnknownSession(String),

    /// Transient transport or service failure; the user may retry the send
    /// themselves. The chat layer never retries automatically.
    #[error("network error: {0}")]
    Network(String),
}
