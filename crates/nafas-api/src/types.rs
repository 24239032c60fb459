//! Wire types for the Nafas service API.
//!
//! Every type here mirrors a JSON payload that travels between the client
//! and the service. Field names are `snake_case` on the wire, matching the
//! backend contract, so most types need no serde renaming at all.
//!
//! The types are deliberately dumb: no behavior beyond (de)serialization
//! and a few accessors. Protocol logic lives in the orchestrator crates.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shared value types
// ---------------------------------------------------------------------------

/// UI language, also stored on the user's profile server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// Arabic.
    Ar,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::En => write!(f, "en"),
            Language::Ar => write!(f, "ar"),
        }
    }
}

/// Gender as the registration endpoint validates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

// ---------------------------------------------------------------------------
// Identity & profile
// ---------------------------------------------------------------------------

/// A user's profile as returned by login, register, and `/auth/me`.
///
/// `subscription_status` is `"inactive"` until a checkout resolves to paid,
/// after which the service flips it to `"active"`. The client never computes
/// this — it only re-reads it (see the billing crate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub birthdate: String,
    pub country: String,
    pub city: String,
    pub occupation: String,
    pub gender: Gender,
    pub language: Language,
    pub subscription_tier: Option<String>,
    #[serde(default = "default_subscription_status")]
    pub subscription_status: String,
    #[serde(default = "default_subscription_price")]
    pub subscription_price: f64,
}

fn default_subscription_status() -> String {
    "inactive".to_owned()
}

fn default_subscription_price() -> f64 {
    15.0
}

impl UserProfile {
    /// Whether the subscription is currently active.
    pub fn subscription_active(&self) -> bool {
        self.subscription_status == "active"
    }
}

/// Registration payload. All fields are required by the service; field-level
/// validation failures come back as 400s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub birthdate: String,
    pub country: String,
    pub city: String,
    pub occupation: String,
    pub gender: Gender,
    #[serde(default)]
    pub language: Language,
}

// ---------------------------------------------------------------------------
// Auth endpoints
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login` and `POST /auth/admin/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response for `POST /auth/login` and `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token. Attached to every subsequent protected call.
    pub token: String,
    pub user: UserProfile,
}

/// Response for `POST /auth/admin/login`. Admin logins carry no profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminLoginResponse {
    pub token: String,
    pub is_admin: bool,
}

/// Admin identity as `/auth/me` reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub is_admin: bool,
    pub username: String,
}

/// Response for `GET /auth/me` — a full profile for users, a short
/// identity blob for admins.
///
/// The service returns two shapes from the same endpoint, so this is an
/// untagged enum: admin payloads have `is_admin`, user payloads have the
/// full profile, and neither deserializes as the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeResponse {
    Admin(AdminIdentity),
    User(Box<UserProfile>),
}

/// Request body for `PUT /auth/language`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageUpdate {
    pub language: Language,
}

/// Response body for `PUT /auth/language`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageAck {
    pub message: String,
    pub language: Language,
}

// ---------------------------------------------------------------------------
// Chat endpoints
// ---------------------------------------------------------------------------

/// One entry in the session sidebar: enough for display, not full history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    /// Timestamp of the most recent message in the session.
    pub last_message: DateTime<Utc>,
    pub message_count: u32,
}

/// Response for `GET /chat/sessions`, ordered most-recent first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionList {
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
}

/// One persisted exchange from `GET /chat/history/{session_id}`.
///
/// History messages are always complete exchanges — the service only
/// persists a message once it has the AI reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub id: String,
    pub session_id: String,
    pub user_message: String,
    pub ai_response: String,
    pub created_at: DateTime<Utc>,
}

/// Response for `GET /chat/history/{session_id}`, ordered oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistory {
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

/// Request body for `POST /chat/message`.
///
/// `session_id` is `None` for the first message of a new conversation;
/// the service assigns one and returns it in [`ChatReply`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSendRequest {
    pub message: String,
    pub session_id: Option<String>,
}

/// Response for `POST /chat/message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// The AI reply text.
    pub response: String,
    /// The session this exchange belongs to. For a new conversation this is
    /// the freshly assigned id, which the client must adopt permanently.
    pub session_id: String,
    /// Advisory text ("this is not medical advice") shown alongside the
    /// conversation, never inside it.
    pub disclaimer: String,
}

// ---------------------------------------------------------------------------
// Payment endpoints
// ---------------------------------------------------------------------------

/// Request body for `POST /payments/create-checkout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutCreateRequest {
    /// The client's origin URL — the service builds the post-checkout
    /// success/cancel redirect URLs from it.
    pub origin_url: String,
}

/// Response for `POST /payments/create-checkout`: where to send the user,
/// and the checkout-session id to poll afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRedirect {
    pub url: String,
    pub session_id: String,
}

/// Response for `GET /payments/status/{session_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutStatus {
    /// Checkout session lifecycle: `"open"`, `"complete"`, or `"expired"`.
    pub status: String,
    /// Payment state within the session: `"paid"` or `"unpaid"`/`"pending"`.
    pub payment_status: String,
    #[serde(default)]
    pub amount_total: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl CheckoutStatus {
    /// The payment went through.
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }

    /// The checkout session lapsed before payment.
    pub fn is_expired(&self) -> bool {
        self.status == "expired"
    }
}

// =========================================================================
// Tests
// =========================================================================
