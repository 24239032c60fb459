//! Error types for the auth layer.

use crate::credential::AuthState;

/// Errors that can occur during credential lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The service rejected the username/password pair.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A login of the other kind is already active. User and admin
    /// sessions are mutually exclusive; an explicit logout is required
    /// to switch.
    #[error("already authenticated as {0}; log out first")]
    AlreadyAuthenticated(AuthState),

    /// The operation requires a credential and none is held.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The service rejected the current token on a protected call.
    /// By the time the caller sees this, the implicit logout has already
    /// happened — the credential is gone.
    #[error("session rejected by the service")]
    SessionRejected,

    /// Field-level input rejection from the service (no state changed).
    #[error("validation failed: {message}")]
    Validation {
        field: Option<String>,
        message: String,
    },

    /// The requested username is already taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Transient transport or service failure; the user may retry.
    #[error("network error: {0}")]
    Network(String),
}
