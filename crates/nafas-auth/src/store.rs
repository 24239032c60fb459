//! The credential store: single source of truth for authentication state.
//!
//! Every request-issuing component reads this store immediately before
//! going to the network, and checks it again (via the epoch) before
//! applying a response. The store is explicit and injectable — constructed
//! once at startup and handed to each component — not a process-wide
//! global, so tests can swap in a fresh store per case.
//!
//! # Mutation policy
//!
//! Only the [`AuthSessionManager`](crate::AuthSessionManager) mutates the
//! credential; the mutating methods are `pub(crate)` to make that a
//! compile-time rule rather than a convention. Everything outside this
//! crate gets a read-only view plus the epoch.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use nafas_api::{Language, UserProfile};

use crate::credential::{AuthState, Credential, Epoch, Identity};
use crate::persist::CredentialPersistence;

/// Process-wide holder of the current credential and language preference.
pub struct CredentialStore {
    current: RwLock<Option<Credential>>,
    language: RwLock<Language>,
    /// Bumped on every install/replace/clear. See [`Epoch`].
    epoch: AtomicU64,
    persistence: Box<dyn CredentialPersistence>,
}

impl CredentialStore {
    /// Creates a store, synchronously restoring any persisted credential
    /// and language preference before returning.
    ///
    /// Restoration happens here, in the constructor, so the store is never
    /// observable in a half-initialized state: by the time any protected
    /// surface can ask, the answer is already correct. A corrupt or
    /// unreadable backing store degrades to "not logged in" with a warning
    /// rather than failing startup.
    pub fn new(persistence: impl CredentialPersistence) -> Self {
        let persistence = Box::new(persistence);

        let current = match persistence.load_credential() {
            Ok(credential) => credential,
            Err(err) => {
                tracing::warn!(%err, "failed to restore credential; starting unauthenticated");
                None
            }
        };
        let language = match persistence.load_language() {
            Ok(language) => language.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(%err, "failed to restore language preference; using default");
                Language::default()
            }
        };

        if let Some(credential) = &current {
            tracing::info!(
                username = credential.identity.username(),
                admin = credential.identity.is_admin(),
                "restored persisted session"
            );
        }

        Self {
            current: RwLock::new(current),
            language: RwLock::new(language),
            epoch: AtomicU64::new(0),
            persistence,
        }
    }

    /// Convenience constructor with throwaway in-memory persistence.
    pub fn in_memory() -> Self {
        Self::new(crate::persist::MemoryPersistence::default())
    }

    // -- Read side ---------------------------------------------------------

    /// A clone of the current credential, if authenticated.
    pub fn credential(&self) -> Option<Credential> {
        self.current.read().expect("poisoned").clone()
    }

    /// The current bearer token, if authenticated.
    pub fn token(&self) -> Option<String> {
        self.current
            .read()
            .expect("poisoned")
            .as_ref()
            .map(|credential| credential.token.clone())
    }

    /// The current state of the auth state machine.
    pub fn state(&self) -> AuthState {
        match self.current.read().expect("poisoned").as_ref() {
            None => AuthState::Unauthenticated,
            Some(credential) if credential.identity.is_admin() => AuthState::Admin,
            Some(_) => AuthState::User,
        }
    }

    /// A clone of the cached user profile, if authenticated as a user.
    pub fn profile(&self) -> Option<UserProfile> {
        self.current
            .read()
            .expect("poisoned")
            .as_ref()
            .and_then(|credential| credential.identity.profile().cloned())
    }

    /// The epoch to capture before issuing a request on behalf of the
    /// current credential.
    pub fn epoch(&self) -> Epoch {
        Epoch(self.epoch.load(Ordering::Acquire))
    }

    /// Whether a captured epoch still refers to the live credential.
    /// `false` means any response in hand must be discarded.
    pub fn is_current(&self, epoch: Epoch) -> bool {
        self.epoch() == epoch
    }

    /// The current token together with the epoch to check before applying
    /// the response.
    ///
    /// The epoch is read before the token, so a credential change landing
    /// between the two reads can only make a later `is_current` check fail,
    /// never pass for a token that was already dead when captured.
    pub fn token_with_epoch(&self) -> Option<(String, Epoch)> {
        let epoch = self.epoch();
        self.token().map(|token| (token, epoch))
    }

    /// The UI language preference. Survives logout.
    pub fn language(&self) -> Language {
        *self.language.read().expect("poisoned")
    }

    // -- Write side (auth crate only) --------------------------------------

    /// Installs a credential, replacing any existing one and invalidating
    /// all work in flight for it.
    pub(crate) fn install(&self, credential: Credential) {
        if let Err(err) = self.persistence.save_credential(&credential) {
            // The login itself succeeded; a persistence failure only costs
            // the session its restart survival.
            tracing::warn!(%err, "failed to persist credential");
        }
        *self.current.write().expect("poisoned") = Some(credential);
        self.epoch.fetch_add(1, Ordering::AcqRel);
    }

    /// Clears the credential. Idempotent: clearing an empty store is a
    /// no-op and does not invalidate anything.
    pub(crate) fn clear(&self) {
        let mut current = self.current.write().expect("poisoned");
        if current.take().is_none() {
            return;
        }
        drop(current);

        self.epoch.fetch_add(1, Ordering::AcqRel);
        if let Err(err) = self.persistence.clear_credential() {
            tracing::warn!(%err, "failed to clear persisted credential");
        }
    }

    /// Replaces the cached profile of a user credential (e.g. after
    /// `/auth/me` reports a subscription change). Does not bump the epoch:
    /// the token — what requests are keyed on — is unchanged.
    pub(crate) fn replace_profile(&self, profile: UserProfile) {
        let mut current = self.current.write().expect("poisoned");
        let Some(credential) = current.as_mut() else {
            return;
        };
        if !matches!(credential.identity, Identity::User(_)) {
            return;
        }
        credential.identity = Identity::User(profile);

        let snapshot = credential.clone();
        drop(current);
        if let Err(err) = self.persistence.save_credential(&snapshot) {
            tracing::warn!(%err, "failed to persist refreshed profile");
        }
    }

    /// Updates the language preference, persisting it independently of the
    /// credential, and mirrors it into the cached profile if present.
    pub(crate) fn set_language(&self, language: Language) {
        *self.language.write().expect("poisoned") = language;
        if let Err(err) = self.persistence.save_language(language) {
            tracing::warn!(%err, "failed to persist language preference");
        }

        let snapshot = {
            let mut current = self.current.write().expect("poisoned");
            match current.as_mut() {
                Some(credential) => match &mut credential.identity {
                    Identity::User(profile) => {
                        profile.language = language;
                        Some(credential.clone())
                    }
                    Identity::Admin { .. } => None,
                },
                None => None,
            }
        };
        if let Some(snapshot) = snapshot {
            if let Err(err) = self.persistence.save_credential(&snapshot) {
                tracing::warn!(%err, "failed to persist updated profile");
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
