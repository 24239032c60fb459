//! The chat orchestrator: drives the optimistic send/reconcile protocol
//! and keeps the session sidebar.
//!
//! Locking discipline matches the rest of the workspace: the transcript
//! and session list sit behind `std::sync` mutexes whose guards are taken
//! in scoped blocks and never held across an await.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use nafas_api::{ApiError, SessionSummary, VentApi};
use nafas_auth::AuthSessionManager;

use crate::error::ChatError;
use crate::message::MessageId;
use crate::transcript::Transcript;

/// Orchestrates the venting conversation: session list, history loading,
/// and the send protocol.
pub struct ChatOrchestrator<A: VentApi> {
    api: Arc<A>,
    auth: Arc<AuthSessionManager<A>>,
    transcript: Mutex<Transcript>,
    sessions: Mutex<Vec<SessionSummary>>,
}

impl<A: VentApi> ChatOrchestrator<A> {
    pub fn new(api: Arc<A>, auth: Arc<AuthSessionManager<A>>) -> Self {
        Self {
            api,
            auth,
            transcript: Mutex::new(Transcript::new()),
            sessions: Mutex::new(Vec::new()),
        }
    }

    /// A snapshot of the open conversation, for rendering.
    pub fn transcript(&self) -> Transcript {
        self.transcript.lock().expect("poisoned").clone()
    }

    /// The last fetched session list (most recent first).
    pub fn sessions(&self) -> Vec<SessionSummary> {
        self.sessions.lock().expect("poisoned").clone()
    }

    /// Fetches the user's past sessions, most recent first.
    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ChatError> {
        let token = self.token()?;

        let mut sessions = self
            .api
            .list_sessions(&token)
            .await
            .map_err(|err| self.map_protected_err(err))?;
        sessions.sort_by(|a, b| b.last_message.cmp(&a.last_message));

        *self.sessions.lock().expect("poisoned") = sessions.clone();
        Ok(sessions)
    }

    /// Opens a past session, replacing the local transcript with its
    /// history, or starts a fresh conversation when `session_id` is `None`.
    ///
    /// Starting fresh touches nothing on the network: a new session only
    /// exists server-side once its first message is exchanged.
    pub async fn open_session(&self, session_id: Option<&str>) -> Result<(), ChatError> {
        let Some(session_id) = session_id else {
            self.new_chat();
            return Ok(());
        };

        let token = self.token()?;
        let history = self
            .api
            .session_history(&token, session_id)
            .await
            .map_err(|err| match err {
                ApiError::NotFound(_) => ChatError::UnknownSession(session_id.to_owned()),
                other => self.map_protected_err(other),
            })?;

        tracing::debug!(session_id, messages = history.len(), "opened session");
        *self.transcript.lock().expect("poisoned") =
            Transcript::from_history(session_id.to_owned(), history);
        Ok(())
    }

    /// Discards the local transcript and starts a fresh conversation.
    /// Synchronous; any reply still in flight for the old transcript will
    /// find its message gone and be discarded on arrival.
    pub fn new_chat(&self) {
        *self.transcript.lock().expect("poisoned") = Transcript::new();
    }

    /// Sends a message through the optimistic protocol:
    ///
    /// 1. the message is appended as pending before the network is touched;
    /// 2. on success the reply resolves it by id, the session id is adopted
    ///    if the conversation was new, and the sidebar entry is updated;
    /// 3. on failure the message is removed entirely and the error is
    ///    surfaced. The user decides whether to resend; there is no
    ///    automatic retry.
    ///
    /// Returns the id of the exchanged message.
    pub async fn send(&self, text: &str) -> Result<MessageId, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let store = self.auth.store();
        let (token, epoch) = store
            .token_with_epoch()
            .ok_or(ChatError::NotAuthenticated)?;

        let (id, session_id) = {
            let mut transcript = self.transcript.lock().expect("poisoned");
            let id = transcript.begin_send(text.to_owned())?;
            (id, transcript.session_id().map(str::to_owned))
        };
        tracing::debug!(
            %id,
            session = session_id.as_deref().unwrap_or("new"),
            "sending message"
        );

        let result = self.api.send_message(&token, text, session_id.as_deref()).await;

        if !store.is_current(epoch) {
            // The credential changed while the request was in flight. The
            // response belongs to a dead session and the optimistic message
            // to a user who is no longer here.
            tracing::info!(%id, "credential changed mid-send; discarding response");
            self.transcript.lock().expect("poisoned").rollback(id);
            return Err(ChatError::LoggedOut);
        }

        match result {
            Ok(reply) => {
                let session_id = reply.session_id.clone();
                let applied = self
                    .transcript
                    .lock()
                    .expect("poisoned")
                    .apply_reply(id, reply);
                // A reply the transcript discarded must not leak into the
                // sidebar either.
                if applied {
                    self.touch_session(&session_id);
                }
                Ok(id)
            }
            Err(err) => {
                self.transcript.lock().expect("poisoned").rollback(id);
                Err(self.map_protected_err(err))
            }
        }
    }

    /// Moves (or inserts) the session's sidebar entry to the top after an
    /// exchange, without refetching the whole list.
    fn touch_session(&self, session_id: &str) {
        let mut sessions = self.sessions.lock().expect("poisoned");
        let mut entry = match sessions.iter().position(|s| s.session_id == session_id) {
            Some(index) => sessions.remove(index),
            None => SessionSummary {
                session_id: session_id.to_owned(),
                last_message: Utc::now(),
                message_count: 0,
            },
        };
        entry.last_message = Utc::now();
        entry.message_count += 1;
        sessions.insert(0, entry);
    }

    fn token(&self) -> Result<String, ChatError> {
        self.auth
            .store()
            .token()
            .ok_or(ChatError::NotAuthenticated)
    }

    fn map_protected_err(&self, err: ApiError) -> ChatError {
        if err.is_auth() {
            self.auth.force_logout("service rejected the session token");
            return ChatError::SessionRejected;
        }
        ChatError::Network(err.to_string())
    }
}

// =========================================================================
// Tests
// =========================================================================
