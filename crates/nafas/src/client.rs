//! Client bootstrap: wires persistence, store, and orchestrators together.

use std::path::PathBuf;
use std::sync::Arc;

use nafas_api::{HttpApi, VentApi};
use nafas_auth::{
    AuthSessionManager, CredentialPersistence, CredentialStore, FilePersistence,
    MemoryPersistence,
};
use nafas_billing::{PaymentConfirmationPoller, PollConfig};
use nafas_chat::ChatOrchestrator;

use crate::error::NafasError;

/// The assembled client: one credential store shared by every component,
/// one orchestrator per concern.
///
/// Construction restores any persisted session synchronously, so the
/// client's auth state is correct before the first call.
pub struct NafasClient<A: VentApi> {
    auth: Arc<AuthSessionManager<A>>,
    chat: ChatOrchestrator<A>,
    billing: PaymentConfirmationPoller<A>,
}

impl NafasClient<HttpApi> {
    /// Connects to the service at `base_url`, persisting the session under
    /// `data_dir`.
    pub fn connect(base_url: &str, data_dir: impl Into<PathBuf>) -> Result<Self, NafasError> {
        tracing::info!(base_url, "connecting to service");
        let api = Arc::new(HttpApi::new(base_url)?);
        let persistence = FilePersistence::new(data_dir)?;
        Ok(Self::with_api(api, persistence))
    }

    /// Connects without persistence; the session lives and dies with the
    /// process.
    pub fn ephemeral(base_url: &str) -> Result<Self, NafasError> {
        let api = Arc::new(HttpApi::new(base_url)?);
        Ok(Self::with_api(api, MemoryPersistence::default()))
    }
}

impl<A: VentApi> NafasClient<A> {
    /// Assembles a client over any [`VentApi`] implementation. Tests use
    /// this with scripted fakes.
    pub fn with_api(api: Arc<A>, persistence: impl CredentialPersistence) -> Self {
        Self::with_api_and_config(api, persistence, PollConfig::default())
    }

    pub fn with_api_and_config(
        api: Arc<A>,
        persistence: impl CredentialPersistence,
        poll: PollConfig,
    ) -> Self {
        let store = Arc::new(CredentialStore::new(persistence));
        let auth = Arc::new(AuthSessionManager::new(api.clone(), store));
        let chat = ChatOrchestrator::new(api.clone(), auth.clone());
        let billing = PaymentConfirmationPoller::with_config(api, auth.clone(), poll);
        tracing::debug!(state = %auth.state(), "client assembled");
        Self { auth, chat, billing }
    }

    /// Credential and session lifecycle.
    pub fn auth(&self) -> &AuthSessionManager<A> {
        &self.auth
    }

    /// The venting conversation.
    pub fn chat(&self) -> &ChatOrchestrator<A> {
        &self.chat
    }

    /// Checkout and payment confirmation.
    pub fn billing(&self) -> &PaymentConfirmationPoller<A> {
        &self.billing
    }

    /// Read-only view of the credential store.
    pub fn store(&self) -> &CredentialStore {
        self.auth.store()
    }

    /// Logs out and discards the open conversation. The persisted language
    /// preference survives; everything else tied to the session goes.
    pub fn logout(&self) {
        tracing::debug!("tearing down session state");
        self.billing.cancel();
        self.auth.logout();
        self.chat.new_chat();
    }
}
