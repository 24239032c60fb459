//! The venting conversation: an optimistic, reconciling chat transcript.
//!
//! A send is visible in the transcript before the network is touched, then
//! reconciled when the reply arrives (resolved by message id) or rolled
//! back if the send fails. The [`Transcript`] holds the rules; the
//! [`ChatOrchestrator`] drives the network and the cross-cutting auth
//! checks around them.

mod error;
mod message;
mod orchestrator;
mod transcript;

pub use error::ChatError;
pub use message::{ChatMessage, MessageId, ReplyState};
pub use orchestrator::ChatOrchestrator;
pub use transcript::Transcript;
