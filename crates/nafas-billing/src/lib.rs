//! Subscription checkout and payment confirmation.
//!
//! The checkout itself happens on an external payment page; this crate
//! creates the session, then confirms the result with a strictly bounded
//! polling loop (see [`PaymentConfirmationPoller`]). The loop never spins
//! forever and never reports a guess: it ends in `Paid`, `Expired`, or
//! `TimedOut`.

mod config;
mod error;
mod poller;

pub use config::PollConfig;
pub use error::BillingError;
pub use poller::{ConfirmationOutcome, PaymentCheckoutAttempt, PaymentConfirmationPoller};
