//! The [`VentApi`] trait: the seam between the orchestrators and the network.
//!
//! The auth, chat, and billing crates never talk to `reqwest` directly —
//! they program against this trait. That lets production wire in
//! [`HttpApi`](crate::HttpApi) while tests substitute a scripted fake and
//! decide exactly which responses arrive, in what order, and when.
//!
//! Protected calls take the bearer token explicitly. Components read the
//! token from the credential store immediately before each call, so a
//! request for an invalidated credential is never issued.

use crate::error::ApiError;
use crate::types::{
    AdminLoginResponse, ChatReply, CheckoutRedirect, CheckoutStatus, HistoryMessage, Language,
    LoginResponse, MeResponse, NewUser, SessionSummary,
};

/// Client-side view of the Nafas service.
///
/// One method per endpoint the orchestrators use. All methods are
/// request/response — no streaming, no server push.
pub trait VentApi: Send + Sync + 'static {
    /// `POST /auth/login`.
    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send;

    /// `POST /auth/admin/login`.
    fn admin_login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<AdminLoginResponse, ApiError>> + Send;

    /// `POST /auth/register`. Succeeding implies immediate authentication —
    /// the response carries a token just like login.
    fn register(
        &self,
        new_user: &NewUser,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send;

    /// `PUT /auth/language`.
    fn update_language(
        &self,
        token: &str,
        language: Language,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `GET /auth/me`.
    fn me(&self, token: &str) -> impl Future<Output = Result<MeResponse, ApiError>> + Send;

    /// `GET /chat/sessions`, ordered most-recent first by the service.
    fn list_sessions(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Vec<SessionSummary>, ApiError>> + Send;

    /// `GET /chat/history/{session_id}`, oldest first.
    fn session_history(
        &self,
        token: &str,
        session_id: &str,
    ) -> impl Future<Output = Result<Vec<HistoryMessage>, ApiError>> + Send;

    /// `POST /chat/message`. `session_id` is `None` for the first message
    /// of a new conversation.
    fn send_message(
        &self,
        token: &str,
        text: &str,
        session_id: Option<&str>,
    ) -> impl Future<Output = Result<ChatReply, ApiError>> + Send;

    /// `POST /payments/create-checkout`.
    fn create_checkout(
        &self,
        token: &str,
        origin_url: &str,
    ) -> impl Future<Output = Result<CheckoutRedirect, ApiError>> + Send;

    /// `GET /payments/status/{checkout_session_id}`.
    fn checkout_status(
        &self,
        token: &str,
        checkout_session_id: &str,
    ) -> impl Future<Output = Result<CheckoutStatus, ApiError>> + Send;
}
