//! Credential and session lifecycle for the venting client.
//!
//! This crate owns everything about "who is logged in": the
//! [`CredentialStore`] (single source of truth, restored from disk at
//! startup), the [`AuthSessionManager`] (the only component allowed to
//! change it), and the persistence seam behind both.
//!
//! Downstream crates (chat, billing) hold an `Arc<CredentialStore>` for
//! reads and epoch checks, and an `Arc<AuthSessionManager>` solely to
//! report rejected tokens.

mod credential;
mod error;
mod manager;
mod persist;
mod store;

pub use credential::{AuthState, Credential, Epoch, Identity};
pub use error::AuthError;
pub use manager::AuthSessionManager;
pub use persist::{CredentialPersistence, FilePersistence, MemoryPersistence, PersistError};
pub use store::CredentialStore;
