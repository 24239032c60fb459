//! The auth session manager: owns every transition of the credential
//! lifecycle.
//!
//! This is the only component allowed to mutate authentication state.
//! Chat and billing observe 401s too, but they report them here
//! (via [`AuthSessionManager::force_logout`]) instead of touching the
//! store themselves.
//!
//! ## Lifecycle
//!
//! ```text
//! login()/register() ──→ [User] ──┐
//!                                 ├── logout() / 401 ──→ [Unauthenticated]
//! admin_login() ─────→ [Admin] ───┘
//! ```
//!
//! User and admin sessions never replace each other directly; the manager
//! rejects the cross-over login until an explicit `logout()`.

use std::sync::Arc;

use nafas_api::{ApiError, Language, MeResponse, NewUser, UserProfile, VentApi};

use crate::credential::{AuthState, Credential, Identity};
use crate::error::AuthError;
use crate::store::CredentialStore;

/// Drives login, registration, profile updates, and logout against the
/// service, keeping the [`CredentialStore`] as the single source of truth.
pub struct AuthSessionManager<A: VentApi> {
    api: Arc<A>,
    store: Arc<CredentialStore>,
}

impl<A: VentApi> AuthSessionManager<A> {
    pub fn new(api: Arc<A>, store: Arc<CredentialStore>) -> Self {
        Self { api, store }
    }

    /// The shared credential store (read-only outside this crate).
    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Current state of the auth state machine.
    pub fn state(&self) -> AuthState {
        self.store.state()
    }

    /// Logs in as a regular user. On success the credential is installed
    /// and persisted; on failure nothing changes.
    ///
    /// # Errors
    /// - [`AuthError::AlreadyAuthenticated`] — an admin session is active
    /// - [`AuthError::InvalidCredentials`] — the service said 401
    /// - [`AuthError::Network`] — transient failure, retryable
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile, AuthError> {
        if self.store.state() == AuthState::Admin {
            return Err(AuthError::AlreadyAuthenticated(AuthState::Admin));
        }

        let resp = self
            .api
            .login(username, password)
            .await
            .map_err(map_login_err)?;

        let profile = resp.user.clone();
        self.store.install(Credential {
            token: resp.token,
            identity: Identity::User(resp.user),
        });
        tracing::info!(username = %profile.username, "logged in");
        Ok(profile)
    }

    /// Logs in as the administrator. Same contract as [`Self::login`], but
    /// the resulting identity carries no profile.
    pub async fn admin_login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if self.store.state() == AuthState::User {
            return Err(AuthError::AlreadyAuthenticated(AuthState::User));
        }

        let resp = self
            .api
            .admin_login(username, password)
            .await
            .map_err(map_login_err)?;

        self.store.install(Credential {
            token: resp.token,
            identity: Identity::Admin {
                username: username.to_owned(),
            },
        });
        tracing::info!(username, "admin logged in");
        Ok(())
    }

    /// Registers a new account. Registration implies immediate
    /// authentication: on success the new credential is installed exactly
    /// as if the user had logged in.
    ///
    /// # Errors
    /// - [`AuthError::Validation`] — the service rejected a field
    /// - [`AuthError::Conflict`] — the username is taken
    pub async fn register(&self, new_user: &NewUser) -> Result<UserProfile, AuthError> {
        if self.store.state() == AuthState::Admin {
            return Err(AuthError::AlreadyAuthenticated(AuthState::Admin));
        }

        let resp = self.api.register(new_user).await.map_err(map_login_err)?;

        let profile = resp.user.clone();
        self.store.install(Credential {
            token: resp.token,
            identity: Identity::User(resp.user),
        });
        tracing::info!(username = %profile.username, "registered and logged in");
        Ok(profile)
    }

    /// Updates the UI language, pushing it to the user's profile on the
    /// service and persisting it locally.
    ///
    /// Failures are surfaced, not swallowed: when the call fails, neither
    /// the cached identity nor the persisted preference changes, so the
    /// caller knows local and remote state still agree.
    pub async fn update_language(&self, language: Language) -> Result<(), AuthError> {
        let credential = self
            .store
            .credential()
            .ok_or(AuthError::NotAuthenticated)?;

        if credential.identity.profile().is_some() {
            self.api
                .update_language(&credential.token, language)
                .await
                .map_err(|err| self.map_protected_err(err))?;
        }
        // Admin identities have no server-side profile; the preference is
        // purely local for them.
        self.store.set_language(language);
        Ok(())
    }

    /// Re-reads the profile from the service and replaces the cached copy.
    /// Used after a paid checkout to pick up the subscription change.
    pub async fn refresh_profile(&self) -> Result<(), AuthError> {
        let (token, epoch) = self
            .store
            .token_with_epoch()
            .ok_or(AuthError::NotAuthenticated)?;

        match self.api.me(&token).await {
            Ok(MeResponse::User(profile)) => {
                // The credential may have been replaced while the request
                // was in flight; a stale profile must not be applied.
                if self.store.is_current(epoch) {
                    self.store.replace_profile(*profile);
                }
                Ok(())
            }
            Ok(MeResponse::Admin(_)) => Ok(()),
            Err(err) => Err(self.map_protected_err(err)),
        }
    }

    /// Clears the credential and returns to `Unauthenticated`.
    /// Synchronous and idempotent; the language preference survives.
    pub fn logout(&self) {
        if self.store.state().is_authenticated() {
            tracing::info!("logged out");
        }
        self.store.clear();
    }

    /// The implicit-logout hook for the cross-cutting 401 rule. Any
    /// component that sees [`ApiError::Auth`] on a protected call reports
    /// it here; the credential is destroyed so the client cannot get stuck
    /// "authenticated but rejected".
    pub fn force_logout(&self, reason: &str) {
        if self.store.state().is_authenticated() {
            tracing::warn!(reason, "forcing logout");
        }
        self.store.clear();
    }

    /// Maps an error from a protected call, applying the implicit-logout
    /// rule for 401s.
    fn map_protected_err(&self, err: ApiError) -> AuthError {
        if err.is_auth() {
            self.force_logout("service rejected the session token");
            return AuthError::SessionRejected;
        }
        map_api_err(err)
    }
}

/// Maps errors from unauthenticated calls (login/register), where a 401
/// means "wrong credentials", not "dead session".
fn map_login_err(err: ApiError) -> AuthError {
    match err {
        ApiError::Auth(_) => AuthError::InvalidCredentials,
        other => map_api_err(other),
    }
}

fn map_api_err(err: ApiError) -> AuthError {
    match err {
        ApiError::Validation { field, message } => AuthError::Validation { field, message },
        ApiError::Conflict(message) => AuthError::Conflict(message),
        other => AuthError::Network(other.to_string()),
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `AuthSessionManager`, following the
    //! `test_{function}_{scenario}_{expected}` convention.
    //!
    //! The service is replaced by a scripted fake: each endpoint pops its
    //! next response from a queue. A test that scripts nothing for an
    //! endpoint asserts, implicitly, that the endpoint is never called.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use nafas_api::{
        AdminLoginResponse, ChatReply, CheckoutRedirect, CheckoutStatus, Gender, HistoryMessage,
        LoginResponse, SessionSummary,
    };

    use super::*;

    // -- Scripted fake service --------------------------------------------

    #[derive(Default)]
    struct FakeApi {
        login: Mutex<VecDeque<Result<LoginResponse, ApiError>>>,
        admin_login: Mutex<VecDeque<Result<AdminLoginResponse, ApiError>>>,
        register: Mutex<VecDeque<Result<LoginResponse, ApiError>>>,
        update_language: Mutex<VecDeque<Result<(), ApiError>>>,
        me: Mutex<VecDeque<Result<MeResponse, ApiError>>>,
    }

    impl VentApi for FakeApi {
        async fn login(&self, _: &str, _: &str) -> Result<LoginResponse, ApiError> {
            self.login
                .lock()
                .unwrap()
                .pop_front()
                .expect("unscripted login call")
        }

        async fn admin_login(&self, _: &str, _: &str) -> Result<AdminLoginResponse, ApiError> {
            self.admin_login
                .lock()
                .unwrap()
                .pop_front()
                .expect("unscripted admin_login call")
        }

        async fn register(&self, _: &NewUser) -> Result<LoginResponse, ApiError> {
            self.register
                .lock()
                .unwrap()
                .pop_front()
                .expect("unscripted register call")
        }

        async fn update_language(&self, _: &str, _: Language) -> Result<(), ApiError> {
            self.update_language
                .lock()
                .unwrap()
                .pop_front()
                .expect("unscripted update_language call")
        }

        async fn me(&self, _: &str) -> Result<MeResponse, ApiError> {
            self.me.lock().unwrap().pop_front().expect("unscripted me call")
        }

        async fn list_sessions(&self, _: &str) -> Result<Vec<SessionSummary>, ApiError> {
            panic!("chat endpoints are not used in auth tests")
        }

        async fn session_history(
            &self,
            _: &str,
            _: &str,
        ) -> Result<Vec<HistoryMessage>, ApiError> {
            panic!("chat endpoints are not used in auth tests")
        }

        async fn send_message(
            &self,
            _: &str,
            _: &str,
            _: Option<&str>,
        ) -> Result<ChatReply, ApiError> {
            panic!("chat endpoints are not used in auth tests")
        }

        async fn create_checkout(&self, _: &str, _: &str) -> Result<CheckoutRedirect, ApiError> {
            panic!("payment endpoints are not used in auth tests")
        }

        async fn checkout_status(&self, _: &str, _: &str) -> Result<CheckoutStatus, ApiError> {
            panic!("payment endpoints are not used in auth tests")
        }
    }

    // -- Helpers ----------------------------------------------------------

    fn profile() -> UserProfile {
        UserProfile {
            id: "u-1".into(),
            username: "lina".into(),
            birthdate: "1994-03-11".into(),
            country: "EG".into(),
            city: "Cairo".into(),
            occupation: "teacher".into(),
            gender: Gender::Female,
            language: Language::En,
            subscription_tier: Some("standard".into()),
            subscription_status: "inactive".into(),
            subscription_price: 5.0,
        }
    }

    fn login_ok() -> Result<LoginResponse, ApiError> {
        Ok(LoginResponse {
            token: "tok-user".into(),
            user: profile(),
        })
    }

    fn admin_ok() -> Result<AdminLoginResponse, ApiError> {
        Ok(AdminLoginResponse {
            token: "tok-admin".into(),
            is_admin: true,
        })
    }

    fn manager() -> (Arc<FakeApi>, AuthSessionManager<FakeApi>) {
        let api = Arc::new(FakeApi::default());
        let store = Arc::new(CredentialStore::in_memory());
        (api.clone(), AuthSessionManager::new(api, store))
    }

    // =====================================================================
    // login()
    // =====================================================================

    #[tokio::test]
    async fn test_login_success_transitions_to_user() {
        let (api, mgr) = manager();
        api.login.lock().unwrap().push_back(login_ok());

        let profile = mgr.login("lina", "pw").await.expect("should succeed");

        assert_eq!(profile.username, "lina");
        assert_eq!(mgr.state(), AuthState::User);
        assert_eq!(mgr.store().token().as_deref(), Some("tok-user"));
    }

    #[tokio::test]
    async fn test_login_invalid_credentials_leaves_state_unchanged() {
        let (api, mgr) = manager();
        api.login
            .lock()
            .unwrap()
            .push_back(Err(ApiError::Auth("Invalid credentials".into())));

        let result = mgr.login("lina", "wrong").await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert_eq!(mgr.state(), AuthState::Unauthenticated);
        assert!(mgr.store().token().is_none());
    }

    #[tokio::test]
    async fn test_login_network_failure_maps_to_network() {
        let (api, mgr) = manager();
        api.login
            .lock()
            .unwrap()
            .push_back(Err(ApiError::Network("connection reset".into())));

        let result = mgr.login("lina", "pw").await;

        assert!(matches!(result, Err(AuthError::Network(_))));
        assert_eq!(mgr.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_login_while_admin_rejected_without_network_call() {
        let (api, mgr) = manager();
        api.admin_login.lock().unwrap().push_back(admin_ok());
        mgr.admin_login("admin", "pw").await.unwrap();
        // No user-login response scripted: if the guard were missing, the
        // fake would panic on the unscripted call.

        let result = mgr.login("lina", "pw").await;

        assert!(matches!(
            result,
            Err(AuthError::AlreadyAuthenticated(AuthState::Admin))
        ));
        assert_eq!(mgr.state(), AuthState::Admin);
    }

    #[tokio::test]
    async fn test_login_twice_replaces_credential_and_epoch() {
        let (api, mgr) = manager();
        api.login.lock().unwrap().push_back(login_ok());
        api.login.lock().unwrap().push_back(Ok(LoginResponse {
            token: "tok-user-2".into(),
            user: profile(),
        }));

        mgr.login("lina", "pw").await.unwrap();
        let first_epoch = mgr.store().epoch();
        mgr.login("lina", "pw").await.unwrap();

        assert_eq!(mgr.store().token().as_deref(), Some("tok-user-2"));
        assert!(!mgr.store().is_current(first_epoch));
    }

    // =====================================================================
    // admin_login()
    // =====================================================================

    #[tokio::test]
    async fn test_admin_login_success_transitions_to_admin() {
        let (api, mgr) = manager();
        api.admin_login.lock().unwrap().push_back(admin_ok());

        mgr.admin_login("admin", "pw").await.expect("should succeed");

        assert_eq!(mgr.state(), AuthState::Admin);
        assert!(mgr.state().is_admin());
        assert!(mgr.store().profile().is_none());
    }

    #[tokio::test]
    async fn test_admin_login_while_user_rejected() {
        let (api, mgr) = manager();
        api.login.lock().unwrap().push_back(login_ok());
        mgr.login("lina", "pw").await.unwrap();

        let result = mgr.admin_login("admin", "pw").await;

        assert!(matches!(
            result,
            Err(AuthError::AlreadyAuthenticated(AuthState::User))
        ));
        assert_eq!(mgr.state(), AuthState::User);
    }

    #[tokio::test]
    async fn test_admin_login_invalid_credentials_maps_correctly() {
        let (api, mgr) = manager();
        api.admin_login
            .lock()
            .unwrap()
            .push_back(Err(ApiError::Auth("Invalid admin credentials".into())));

        let result = mgr.admin_login("admin", "wrong").await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert_eq!(mgr.state(), AuthState::Unauthenticated);
    }

    // =====================================================================
    // register()
    // =====================================================================

    fn new_user() -> NewUser {
        NewUser {
            username: "lina".into(),
            password: "secret".into(),
            birthdate: "1994-03-11".into(),
            country: "EG".into(),
            city: "Cairo".into(),
            occupation: "teacher".into(),
            gender: Gender::Female,
            language: Language::Ar,
        }
    }

    #[tokio::test]
    async fn test_register_success_authenticates_immediately() {
        let (api, mgr) = manager();
        api.register.lock().unwrap().push_back(login_ok());

        let profile = mgr.register(&new_user()).await.expect("should succeed");

        assert_eq!(profile.username, "lina");
        assert_eq!(mgr.state(), AuthState::User);
    }

    #[tokio::test]
    async fn test_register_duplicate_username_surfaces_conflict() {
        let (api, mgr) = manager();
        api.register
            .lock()
            .unwrap()
            .push_back(Err(ApiError::Conflict("Username already exists".into())));

        let result = mgr.register(&new_user()).await;

        assert!(matches!(result, Err(AuthError::Conflict(_))));
        assert_eq!(mgr.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_register_validation_error_surfaces_message() {
        let (api, mgr) = manager();
        api.register.lock().unwrap().push_back(Err(ApiError::Validation {
            field: Some("password".into()),
            message: "too short".into(),
        }));

        let result = mgr.register(&new_user()).await;

        match result {
            Err(AuthError::Validation { message, .. }) => assert_eq!(message, "too short"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    // =====================================================================
    // logout()
    // =====================================================================

    #[tokio::test]
    async fn test_logout_clears_credential() {
        let (api, mgr) = manager();
        api.login.lock().unwrap().push_back(login_ok());
        mgr.login("lina", "pw").await.unwrap();

        mgr.logout();

        assert_eq!(mgr.state(), AuthState::Unauthenticated);
        assert!(mgr.store().token().is_none());
    }

    #[tokio::test]
    async fn test_logout_twice_is_idempotent() {
        let (api, mgr) = manager();
        api.login.lock().unwrap().push_back(login_ok());
        mgr.login("lina", "pw").await.unwrap();

        mgr.logout();
        let after_first = mgr.store().epoch();
        mgr.logout();

        assert_eq!(mgr.state(), AuthState::Unauthenticated);
        assert!(mgr.store().is_current(after_first));
    }

    #[tokio::test]
    async fn test_logout_preserves_language_preference() {
        let (api, mgr) = manager();
        api.login.lock().unwrap().push_back(login_ok());
        api.update_language.lock().unwrap().push_back(Ok(()));
        mgr.login("lina", "pw").await.unwrap();
        mgr.update_language(Language::Ar).await.unwrap();

        mgr.logout();

        assert_eq!(mgr.store().language(), Language::Ar);
    }

    // =====================================================================
    // update_language()
    // =====================================================================

    #[tokio::test]
    async fn test_update_language_success_merges_into_profile() {
        let (api, mgr) = manager();
        api.login.lock().unwrap().push_back(login_ok());
        api.update_language.lock().unwrap().push_back(Ok(()));
        mgr.login("lina", "pw").await.unwrap();

        mgr.update_language(Language::Ar).await.expect("should succeed");

        assert_eq!(mgr.store().language(), Language::Ar);
        assert_eq!(mgr.store().profile().unwrap().language, Language::Ar);
    }

    #[tokio::test]
    async fn test_update_language_failure_surfaces_error_and_changes_nothing() {
        let (api, mgr) = manager();
        api.login.lock().unwrap().push_back(login_ok());
        api.update_language
            .lock()
            .unwrap()
            .push_back(Err(ApiError::Unavailable("500".into())));
        mgr.login("lina", "pw").await.unwrap();

        let result = mgr.update_language(Language::Ar).await;

        assert!(matches!(result, Err(AuthError::Network(_))));
        assert_eq!(mgr.store().language(), Language::En);
        assert_eq!(mgr.store().profile().unwrap().language, Language::En);
    }

    #[tokio::test]
    async fn test_update_language_rejected_token_forces_logout() {
        let (api, mgr) = manager();
        api.login.lock().unwrap().push_back(login_ok());
        api.update_language
            .lock()
            .unwrap()
            .push_back(Err(ApiError::Auth("Token expired".into())));
        mgr.login("lina", "pw").await.unwrap();

        let result = mgr.update_language(Language::Ar).await;

        assert!(matches!(result, Err(AuthError::SessionRejected)));
        assert_eq!(mgr.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_update_language_unauthenticated_rejected_locally() {
        let (_, mgr) = manager();

        let result = mgr.update_language(Language::Ar).await;

        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }

    // =====================================================================
    // refresh_profile()
    // =====================================================================

    #[tokio::test]
    async fn test_refresh_profile_applies_subscription_change() {
        let (api, mgr) = manager();
        api.login.lock().unwrap().push_back(login_ok());
        let mut active = profile();
        active.subscription_status = "active".into();
        api.me
            .lock()
            .unwrap()
            .push_back(Ok(MeResponse::User(Box::new(active))));
        mgr.login("lina", "pw").await.unwrap();

        mgr.refresh_profile().await.expect("should succeed");

        assert!(mgr.store().profile().unwrap().subscription_active());
    }

    #[tokio::test]
    async fn test_refresh_profile_rejected_token_forces_logout() {
        let (api, mgr) = manager();
        api.login.lock().unwrap().push_back(login_ok());
        api.me
            .lock()
            .unwrap()
            .push_back(Err(ApiError::Auth("Token expired".into())));
        mgr.login("lina", "pw").await.unwrap();

        let result = mgr.refresh_profile().await;

        assert!(matches!(result, Err(AuthError::SessionRejected)));
        assert_eq!(mgr.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_refresh_profile_unauthenticated_rejected_locally() {
        let (_, mgr) = manager();

        let result = mgr.refresh_profile().await;

        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }
}
