//! A single transcript entry and its reply lifecycle.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Client-generated id for a transcript entry.
///
/// Replies are correlated by this id, never by position or recency: the
/// message a response resolves is the one that issued the request, even if
/// the transcript changed in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(Uuid);

impl MessageId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a message's reply stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyState {
    /// The request is in flight; the UI shows a typing indicator here.
    Pending,
    /// The reply arrived. Terminal.
    Resolved(String),
}

/// One user message in the transcript, created optimistically at send time.
///
/// Lifecycle: appended with a `Pending` reply before the network is touched;
/// then exactly one of resolved (reply text filled in) or removed (send
/// failed, rolled back without a trace).
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub user_text: String,
    pub reply: ReplyState,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub(crate) fn pending(text: String) -> Self {
        Self {
            id: MessageId::new(),
            user_text: text,
            reply: ReplyState::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.reply == ReplyState::Pending
    }

    /// The reply text, if resolved.
    pub fn reply_text(&self) -> Option<&str> {
        match &self.reply {
            ReplyState::Pending => None,
            ReplyState::Resolved(text) => Some(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_message_has_no_reply_text() {
        let msg = ChatMessage::pending("hello".into());
        assert!(msg.is_pending());
        assert!(msg.reply_text().is_none());
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = ChatMessage::pending("a".into());
        let b = ChatMessage::pending("b".into());
        assert_ne!(a.id, b.id);
    }
}
