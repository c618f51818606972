//! Append-only conversation history handed to the model as context

use crate::llm::Message;

/// Ordered, append-only sequence of messages
///
/// Insertion order is the order the model sees. Messages are never edited or
/// removed once pushed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    messages: Vec<Message>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation with one user message
    pub fn seeded<S: Into<String>>(prompt: S) -> Self {
        let mut state = Self::new();
        state.push(Message::user(prompt));
        state
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Owned copy of the history for a backend request
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MessageRole;

    #[test]
    fn test_seeded_conversation() {
        let state = ConversationState::seeded("hello");
        assert_eq!(state.len(), 1);
        assert_eq!(state.messages()[0], Message::user("hello"));
    }

    #[test]
    fn test_push_preserves_order() {
        let mut state = ConversationState::seeded("question");
        state.push(Message::assistant("thinking"));
        state.push(Message::tool("{}", None));

        let roles: Vec<MessageRole> = state.messages().iter().map(Message::role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::User, MessageRole::Assistant, MessageRole::Tool]
        );
        assert_eq!(state.last().map(Message::content), Some("{}"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut state = ConversationState::new();
        assert!(state.is_empty());
        state.push(Message::user("first"));

        let snapshot = state.snapshot();
        state.push(Message::assistant("second"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(state.len(), 2);
    }
}
