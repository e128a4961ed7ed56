use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Locale, Message};

/// Observable changes of a conversation.
///
/// Emitted by the conversation engine after its state changes and consumed by:
/// - The SSE stream (for live UI updates)
/// - The terminal chat loop (to print replies as they arrive)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ConversationEvent {
    /// A message was appended to the history.
    MessageAppended { session_id: Uuid, message: Message },

    /// The "assistant is responding" flag flipped.
    ResponderChanged {
        session_id: Uuid,
        awaiting_response: bool,
    },

    /// The active locale changed. Existing messages are untouched.
    LocaleChanged { session_id: Uuid, locale: Locale },
}

impl ConversationEvent {
    pub fn session_id(&self) -> Uuid {
        match self {
            ConversationEvent::MessageAppended { session_id, .. }
            | ConversationEvent::ResponderChanged { session_id, .. }
            | ConversationEvent::LocaleChanged { session_id, .. } => *session_id,
        }
    }

    /// Returns a human-readable event name for logging and SSE.
    pub fn event_name(&self) -> &'static str {
        match self {
            ConversationEvent::MessageAppended { .. } => "message_appended",
            ConversationEvent::ResponderChanged { .. } => "responder_changed",
            ConversationEvent::LocaleChanged { .. } => "locale_changed",
        }
    }
}
