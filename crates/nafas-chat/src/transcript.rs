//! The transcript: the local view of one venting conversation.
//!
//! The transcript is a pure state machine; all networking lives in the
//! orchestrator. Its invariants:
//!
//! - at most one message has a `Pending` reply at a time;
//! - once a session id is adopted it never changes;
//! - a reply is applied to the message that sent it (by id) or not at all.

use nafas_api::{ChatReply, HistoryMessage};

use crate::error::ChatError;
use crate::message::{ChatMessage, MessageId, ReplyState};

/// Local state of the open conversation.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    /// `None` until the first exchange of a new conversation completes and
    /// the service assigns an id.
    session_id: Option<String>,
    messages: Vec<ChatMessage>,
    /// Id of the message currently awaiting its reply, if any.
    in_flight: Option<MessageId>,
    /// Session-level advisory text from the service. Shown alongside the
    /// conversation, never inside it.
    disclaimer: Option<String>,
}

impl Transcript {
    /// A fresh, unpersisted conversation. No network involved; the session
    /// only exists server-side once the first message is exchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the transcript from persisted history. Every history entry
    /// is a complete exchange, so every rebuilt message is resolved.
    pub fn from_history(session_id: String, history: Vec<HistoryMessage>) -> Self {
        let messages = history
            .into_iter()
            .map(|entry| ChatMessage {
                id: MessageId::new(),
                user_text: entry.user_message,
                reply: ReplyState::Resolved(entry.ai_response),
                created_at: entry.created_at,
            })
            .collect();
        Self {
            session_id: Some(session_id),
            messages,
            in_flight: None,
            disclaimer: None,
        }
    }

    // -- Read side ---------------------------------------------------------

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn disclaimer(&self) -> Option<&str> {
        self.disclaimer.as_deref()
    }

    /// Whether a message is currently awaiting its reply.
    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether this conversation has no server-side identity yet.
    pub fn is_new(&self) -> bool {
        self.session_id.is_none()
    }

    // -- Mutations (orchestrator only) -------------------------------------

    /// Appends an optimistic message and marks it in flight.
    ///
    /// Rejected without mutation when a reply is already pending: one
    /// exchange at a time keeps request and reply trivially correlated.
    pub(crate) fn begin_send(&mut self, text: String) -> Result<MessageId, ChatError> {
        if self.in_flight.is_some() {
            return Err(ChatError::SendInFlight);
        }
        let message = ChatMessage::pending(text);
        let id = message.id;
        self.messages.push(message);
        self.in_flight = Some(id);
        Ok(id)
    }

    /// Applies a successful reply to the message that sent it. Returns
    /// whether anything was applied.
    ///
    /// If the message is gone (the transcript was replaced while the request
    /// was in flight) the whole reply is discarded. A session id is adopted
    /// only if none is held; the service echoing a different id later is a
    /// contract violation, logged and ignored.
    pub(crate) fn apply_reply(&mut self, id: MessageId, reply: ChatReply) -> bool {
        let Some(message) = self.messages.iter_mut().find(|m| m.id == id) else {
            tracing::warn!(%id, "reply for a message no longer in the transcript; discarding");
            return false;
        };

        match &self.session_id {
            None => self.session_id = Some(reply.session_id),
            Some(current) if *current != reply.session_id => {
                tracing::warn!(
                    current,
                    received = %reply.session_id,
                    "service returned a different session id; keeping the adopted one"
                );
            }
            Some(_) => {}
        }

        message.reply = ReplyState::Resolved(reply.response);
        self.disclaimer = Some(reply.disclaimer);
        if self.in_flight == Some(id) {
            self.in_flight = None;
        }
        true
    }

    /// Removes an optimistic message after its send failed. The transcript
    /// looks exactly as it did before `begin_send`.
    pub(crate) fn rollback(&mut self, id: MessageId) {
        self.messages.retain(|m| m.id != id);
        if self.in_flight == Some(id) {
            self.in_flight = None;
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reply(session_id: &str, response: &str) -> ChatReply {
        ChatReply {
            response: response.into(),
            session_id: session_id.into(),
            disclaimer: "not medical advice".into(),
        }
    }

    #[test]
    fn test_begin_send_appends_pending_message() {
        let mut transcript = Transcript::new();
        let id = transcript.begin_send("hello".into()).unwrap();

        assert_eq!(transcript.messages().len(), 1);
        assert_eq!(transcript.messages()[0].id, id);
        assert!(transcript.messages()[0].is_pending());
        assert!(transcript.has_in_flight());
    }

    #[test]
    fn test_begin_send_while_pending_rejected_without_mutation() {
        let mut transcript = Transcript::new();
        transcript.begin_send("first".into()).unwrap();

        let second = transcript.begin_send("second".into());
        assert!(matches!(second, Err(ChatError::SendInFlight)));
        assert_eq!(transcript.messages().len(), 1);
    }

    #[test]
    fn test_apply_reply_resolves_by_id_and_adopts_session() {
        let mut transcript = Transcript::new();
        let id = transcript.begin_send("hello".into()).unwrap();

        assert!(transcript.apply_reply(id, reply("sess-1", "hi there")));

        assert_eq!(transcript.session_id(), Some("sess-1"));
        assert_eq!(transcript.messages()[0].reply_text(), Some("hi there"));
        assert_eq!(transcript.disclaimer(), Some("not medical advice"));
        assert!(!transcript.has_in_flight());
    }

    #[test]
    fn test_apply_reply_never_changes_adopted_session_id() {
        let mut transcript = Transcript::new();
        let first = transcript.begin_send("one".into()).unwrap();
        transcript.apply_reply(first, reply("sess-1", "a"));

        let second = transcript.begin_send("two".into()).unwrap();
        transcript.apply_reply(second, reply("sess-2", "b"));

        assert_eq!(transcript.session_id(), Some("sess-1"));
        assert_eq!(transcript.messages()[1].reply_text(), Some("b"));
    }

    #[test]
    fn test_apply_reply_for_missing_message_discards_everything() {
        let mut transcript = Transcript::new();
        let id = transcript.begin_send("hello".into()).unwrap();
        transcript.rollback(id);

        assert!(!transcript.apply_reply(id, reply("sess-1", "late")));

        assert!(transcript.messages().is_empty());
        assert!(transcript.session_id().is_none());
        assert!(transcript.disclaimer().is_none());
    }

    #[test]
    fn test_rollback_restores_pre_send_state() {
        let mut transcript = Transcript::new();
        let first = transcript.begin_send("kept".into()).unwrap();
        transcript.apply_reply(first, reply("sess-1", "a"));

        let failed = transcript.begin_send("dropped".into()).unwrap();
        transcript.rollback(failed);

        assert_eq!(transcript.messages().len(), 1);
        assert_eq!(transcript.messages()[0].user_text, "kept");
        assert!(!transcript.has_in_flight());
    }

    #[test]
    fn test_from_history_builds_resolved_messages() {
        let history = vec![
            HistoryMessage {
                id: "m-1".into(),
                session_id: "sess-1".into(),
                user_message: "hello".into(),
                ai_response: "hi".into(),
                created_at: Utc::now(),
            },
            HistoryMessage {
                id: "m-2".into(),
                session_id: "sess-1".into(),
                user_message: "how are you".into(),
                ai_response: "listening".into(),
                created_at: Utc::now(),
            },
        ];

        let transcript = Transcript::from_history("sess-1".into(), history);

        assert_eq!(transcript.session_id(), Some("sess-1"));
        assert_eq!(transcript.messages().len(), 2);
        assert!(transcript.messages().iter().all(|m| !m.is_pending()));
        assert!(!transcript.is_new());
        assert!(!transcript.has_in_flight());
    }

    #[test]
    fn test_new_transcript_is_empty_and_unpersisted() {
        let transcript = Transcript::new();
        assert!(transcript.is_new());
        assert!(transcript.messages().is_empty());
        assert!(transcript.disclaimer().is_none());
    }
}
