//! Error taxonomy for API calls.
//!
//! Each crate in Nafas defines its own error enum; this one covers the
//! request/response boundary. The orchestrator crates translate these into
//! their own vocabularies, with one cross-cutting rule: [`ApiError::Auth`]
//! on a protected call must force a logout, no matter which component
//! observed it.

/// Errors that can occur when talking to the service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The service rejected the input (HTTP 400). `field` is populated when
    /// the error body names the offending field.
    #[error("validation failed: {message}")]
    Validation {
        field: Option<String>,
        message: String,
    },

    /// The credential was missing, invalid, or expired (HTTP 401).
    ///
    /// On a protected call this is a logout trigger: the session the token
    /// belonged to is gone, and keeping local "authenticated" state would
    /// leave the client stuck issuing requests the service rejects.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// The credential is valid but lacks the required role (HTTP 403),
    /// e.g. a user token on an admin endpoint.
    #[error("access denied: {0}")]
    Forbidden(String),

    /// The request conflicts with existing state (duplicate username).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The referenced resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The service failed internally (HTTP 5xx). Transient from the
    /// client's point of view; the user may retry.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The request never produced an HTTP response: DNS, connect, TLS,
    /// or a malformed body. Also transient.
    #[error("network error: {0}")]
    Network(String),
}

impl ApiError {
    /// Maps an HTTP status and the service's `detail` string to a variant.
    ///
    /// Statuses the service never emits fall through to [`Self::Unavailable`]
    /// so that an unexpected response degrades into "try again" rather than
    /// a misleading specific error.
    pub fn from_status(status: u16, detail: String) -> Self {
        match status {
            400 => ApiError::Validation {
                field: None,
                message: detail,
            },
            401 => ApiError::Auth(detail),
            403 => ApiError::Forbidden(detail),
            404 => ApiError::NotFound(detail),
            409 => ApiError::Conflict(detail),
            _ => ApiError::Unavailable(detail),
        }
    }

    /// Whether this error must trigger the implicit-logout rule.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }

    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Unavailable(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}
