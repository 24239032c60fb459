//! HTTP implementation of [`VentApi`] over `reqwest`.
//!
//! Thin by design: build the request, attach the bearer token, map the
//! response. All protocol decisions (retries, optimism, logout-on-401)
//! belong to the orchestrator crates.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::VentApi;
use crate::error::ApiError;
use crate::types::{
    AdminLoginResponse, ChatHistory, ChatReply, ChatSendRequest, CheckoutCreateRequest,
    CheckoutRedirect, CheckoutStatus, HistoryMessage, Language, LanguageAck, LanguageUpdate,
    LoginRequest, LoginResponse, MeResponse, NewUser, SessionList, SessionSummary,
};

/// Error body shape the service uses for every non-2xx response.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// [`VentApi`] implementation that talks to a live service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: reqwest::Client,
    /// Service root, e.g. `https://api.example.com`. The `/api` prefix is
    /// appended here, not by callers.
    base_url: String,
}

impl HttpApi {
    /// Creates a client for the service at `base_url` (scheme + host, no
    /// trailing `/api`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Sends a prepared request and maps the response: 2xx bodies are
    /// deserialized, everything else becomes an [`ApiError`] built from the
    /// status and the service's `detail` string.
    async fn execute<R: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<R, ApiError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let detail = resp
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail)
            .unwrap_or_else(|| status.to_string());
        tracing::debug!(status = status.as_u16(), %detail, "request rejected");
        Err(ApiError::from_status(status.as_u16(), detail))
    }

    async fn get<R: DeserializeOwned>(&self, token: &str, path: &str) -> Result<R, ApiError> {
        self.execute(self.http.get(self.url(path)).bearer_auth(token))
            .await
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        token: Option<&str>,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let mut req = self.http.post(self.url(path)).json(body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        self.execute(req).await
    }
}

impl VentApi for HttpApi {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            username: username.to_owned(),
            password: password.to_owned(),
        };
        self.post(None, "/auth/login", &body).await
    }

    async fn admin_login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AdminLoginResponse, ApiError> {
        let body = LoginRequest {
            username: username.to_owned(),
            password: password.to_owned(),
        };
        self.post(None, "/auth/admin/login", &body).await
    }

    async fn register(&self, new_user: &NewUser) -> Result<LoginResponse, ApiError> {
        // The service reports a taken username as a 400 whose detail says
        // "already exists"; surface that as a conflict, not a validation
        // failure, so callers can distinguish "pick another name" from
        // "fix this field".
        match self.post(None, "/auth/register", new_user).await {
            Err(ApiError::Validation { message, .. }) if message.contains("already exists") => {
                Err(ApiError::Conflict(message))
            }
            other => other,
        }
    }

    async fn update_language(&self, token: &str, language: Language) -> Result<(), ApiError> {
        let body = LanguageUpdate { language };
        let req = self
            .http
            .put(self.url("/auth/language"))
            .bearer_auth(token)
            .json(&body);
        let _ack: LanguageAck = self.execute(req).await?;
        Ok(())
    }

    async fn me(&self, token: &str) -> Result<MeResponse, ApiError> {
        self.get(token, "/auth/me").await
    }

    async fn list_sessions(&self, token: &str) -> Result<Vec<SessionSummary>, ApiError> {
        let list: SessionList = self.get(token, "/chat/sessions").await?;
        Ok(list.sessions)
    }

    async fn session_history(
        &self,
        token: &str,
        session_id: &str,
    ) -> Result<Vec<HistoryMessage>, ApiError> {
        let history: ChatHistory = self
            .get(token, &format!("/chat/history/{session_id}"))
            .await?;
        Ok(history.messages)
    }

    async fn send_message(
        &self,
        token: &str,
        text: &str,
        session_id: Option<&str>,
    ) -> Result<ChatReply, ApiError> {
        let body = ChatSendRequest {
            message: text.to_owned(),
            session_id: session_id.map(str::to_owned),
        };
        self.post(Some(token), "/chat/message", &body).await
    }

    async fn create_checkout(
        &self,
        token: &str,
        origin_url: &str,
    ) -> Result<CheckoutRedirect, ApiError> {
        let body = CheckoutCreateRequest {
            origin_url: origin_url.to_owned(),
        };
        self.post(Some(token), "/payments/create-checkout", &body)
            .await
    }

    async fn checkout_status(
        &self,
        token: &str,
        checkout_session_id: &str,
    ) -> Result<CheckoutStatus, ApiError> {
        self.get(token, &format!("/payments/status/{checkout_session_id}"))
            .await
    }
}
