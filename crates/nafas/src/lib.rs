//! # Nafas
//!
//! Client toolkit for a mood-tracking and wellness service: credential and
//! session lifecycle, the optimistic venting chat, and bounded
//! payment-confirmation polling.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use nafas::prelude::*;
//!
//! # async fn run() -> Result<(), NafasError> {
//! let client = NafasClient::connect("https://api.example.com", "/var/lib/nafas")?;
//! client.auth().login("lina", "secret").await?;
//! client.chat().send("rough day today").await?;
//! # Ok(())
//! # }
//! ```
//!
//! Every component shares one credential store; a 401 anywhere logs the
//! whole client out, and in-flight responses for a replaced credential are
//! discarded rather than applied.

mod client;
mod error;

pub use client::NafasClient;
pub use error::NafasError;

pub use nafas_api::{ApiError, HttpApi, VentApi};
pub use nafas_auth::{AuthError, AuthState, CredentialStore, Identity};
pub use nafas_billing::{
    BillingError, ConfirmationOutcome, PaymentCheckoutAttempt, PollConfig,
};
pub use nafas_chat::{ChatError, ChatMessage, MessageId, ReplyState, Transcript};

/// Installs a process-wide `tracing` subscriber reading the filter from
/// `RUST_LOG`. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

pub mod prelude {
    pub use crate::{
        AuthState, ConfirmationOutcome, NafasClient, NafasError, VentApi,
    };
    pub use nafas_api::{Gender, Language, NewUser, UserProfile};
}
