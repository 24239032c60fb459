//! Credential types: who the client is logged in as, if anyone.
//!
//! A "credential" is the token plus the identity claims that came with it.
//! There is at most one credential at a time, and the user/admin split is a
//! tagged variant rather than a boolean flag — a credential simply cannot
//! be both, so mutual exclusivity holds by construction.

use std::fmt;

use nafas_api::UserProfile;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The identity claims attached to a credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Identity {
    /// A regular user with a full profile.
    User(UserProfile),
    /// The service administrator. Admin logins carry no profile.
    Admin { username: String },
}

impl Identity {
    /// The username, for either kind of identity.
    pub fn username(&self) -> &str {
        match self {
            Identity::User(profile) => &profile.username,
            Identity::Admin { username } => username,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Identity::Admin { .. })
    }

    /// The user profile, if this is a user identity.
    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            Identity::User(profile) => Some(profile),
            Identity::Admin { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// An authentication token plus the identity it belongs to.
///
/// Created on successful login/register, replaced on re-login, destroyed on
/// logout or when the service rejects the token with a 401. Owned by the
/// [`CredentialStore`](crate::CredentialStore); everything else reads a
/// clone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Opaque bearer token. Never logged.
    pub token: String,
    pub identity: Identity,
}

// ---------------------------------------------------------------------------
// AuthState
// ---------------------------------------------------------------------------

/// The authentication state machine, as route guards and orchestrators
/// observe it:
///
/// ```text
///                ┌──(login / register)──→ User ──┐
/// Unauthenticated                                ├──(logout | 401)──→ Unauthenticated
///                └──(admin login)───────→ Admin ─┘
/// ```
///
/// `User` and `Admin` are not reachable from each other — switching
/// requires an explicit logout in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    User,
    Admin,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, AuthState::Unauthenticated)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, AuthState::Admin)
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthState::Unauthenticated => write!(f, "unauthenticated"),
            AuthState::User => write!(f, "user"),
            AuthState::Admin => write!(f, "admin"),
        }
    }
}

// ---------------------------------------------------------------------------
// Epoch
// ---------------------------------------------------------------------------

/// A monotonically increasing counter the store bumps every time the
/// credential changes (installed, replaced, or cleared).
///
/// In-flight work captures the epoch when it issues a request and compares
/// before applying the response. A response whose epoch is stale belongs to
/// a credential that no longer exists and must be discarded — matching by
/// "most recent" would let a slow response for a dead login mutate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epoch(pub(crate) u64);
