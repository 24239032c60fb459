//! API layer for the Nafas client.
//!
//! This crate defines the "language" the client and the service speak:
//!
//! - **Types** ([`UserProfile`], [`ChatReply`], [`CheckoutStatus`], …) —
//!   the JSON payloads on the wire.
//! - **Seam** ([`VentApi`]) — the trait the orchestrator crates program
//!   against, implemented by [`HttpApi`] in production and by scripted
//!   fakes in tests.
//! - **Errors** ([`ApiError`]) — the shared taxonomy every protocol maps
//!   from.
//!
//! # How it fits in the stack
//!
//! ```text
//! Orchestrators (above)  ← auth sessions, chat, payment polling
//!     ↕
//! API layer (this crate) ← endpoints, payloads, status → error mapping
//!     ↕
//! HTTP (below)           ← reqwest
//! ```

mod api;
mod error;
mod http;
mod types;

pub use api::VentApi;
pub use error::ApiError;
pub use http::HttpApi;
pub use types::{
    AdminIdentity, AdminLoginResponse, ChatHistory, ChatReply, ChatSendRequest,
    CheckoutCreateRequest, CheckoutRedirect, CheckoutStatus, Gender, HistoryMessage, Language,
    LanguageAck, LanguageUpdate, LoginRequest, LoginResponse, MeResponse, NewUser, SessionList,
    SessionSummary, UserProfile,
};
