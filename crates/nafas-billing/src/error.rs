//! Error types for the billing layer.

/// Errors from checkout creation and confirmation polling.
///
/// Note what is *not* here: `Paid`, `Expired`, and `TimedOut` are outcomes
/// of a confirmation, not errors, and are reported through
/// [`PaymentCheckoutAttempt`](crate::PaymentCheckoutAttempt).
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    /// The operation requires a credential and none is held.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The service rejected the token; the implicit logout has already
    /// happened by the time the caller sees this.
    #[error("session rejected by the service")]
    SessionRejected,

    /// The credential changed while a status check was in flight; the
    /// response was discarded.
    #[error("logged out while the request was in flight")]
    LoggedOut,

    /// A newer confirmation replaced this loop, or `cancel` was called.
    /// Nothing from this loop was applied.
    #[error("confirmation superseded")]
    Superseded,

    /// Transient transport or service failure outside the polling loop
    /// (inside it, transient failures just consume attempts).
    #[error("network error: {0}")]
    Network(String),
}
