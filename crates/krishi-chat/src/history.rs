//! Append-only conversation log.

use krishi_core::types::{Message, MessageId};

/// Ordered messages of one conversation.
///
/// Insertion order is chronological and display order. Messages can only be
/// appended; ids are issued here so they increase with position.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    messages: Vec<Message>,
    last_id: u64,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> MessageId {
        self.last_id += 1;
        MessageId(self.last_id)
    }

    /// Append a user message and return a copy of it.
    pub fn push_user(&mut self, text: &str) -> Message {
        let message = Message::user(self.next_id(), text);
        self.messages.push(message.clone());
        message
    }

    /// Append an assistant message and return a copy of it.
    pub fn push_assistant(&mut self, text: &str, in_reply_to: Option<MessageId>) -> Message {
        let message = Message::assistant(self.next_id(), text, in_reply_to);
        self.messages.push(message.clone());
        message
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_history_is_empty() {
        let history = ConversationHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn test_ids_increase_with_position() {
        let mut history = ConversationHistory::new();
        let welcome = history.push_assistant("welcome", None);
        let question = history.push_user("rice?");
        let answer = history.push_assistant("R1", Some(question.id));

        assert_eq!(welcome.id, MessageId(1));
        assert!(welcome.id < question.id && question.id < answer.id);
        assert_eq!(history.len(), 3);
        assert_eq!(history.messages()[2].text, "R1");
    }

    #[test]
    fn test_user_text_kept_verbatim() {
        let mut history = ConversationHistory::new();
        history.push_user("  Rice?  ");
        assert_eq!(history.messages()[0].text, "  Rice?  ");
    }
}
