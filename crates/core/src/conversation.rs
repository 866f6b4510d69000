//! Chat history kept by the front end
//!
//! The server never stores history. A client may send what it has so far and
//! the agent runner replays it ahead of the new user message.

use serde::{Deserialize, Serialize};

use crate::llm_types::Message;

/// Who said a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `{role, content}` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&ChatMessage> for Message {
    fn from(msg: &ChatMessage) -> Self {
        match msg.role {
            ChatRole::User => Message::user(msg.content.clone()),
            ChatRole::Assistant => Message::assistant(msg.content.clone()),
        }
    }
}

/// Append-only ordered chat history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    /// Most recent `n` messages, oldest first
    pub fn last_n(&self, n: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }
}

impl From<Vec<ChatMessage>> for ChatHistory {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_types::Role;

    #[test]
    fn test_history_keeps_append_order() {
        let mut history = ChatHistory::new();
        history.push(ChatMessage::user("Do I need to fast?"));
        history.push(ChatMessage::assistant("For an abdomen scan, yes."));
        history.push(ChatMessage::user("How long?"));

        let roles: Vec<ChatRole> = history.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![ChatRole::User, ChatRole::Assistant, ChatRole::User]
        );
        assert_eq!(history.last_n(1)[0].content, "How long?");
        assert_eq!(history.last_n(10).len(), 3);
    }

    #[test]
    fn test_into_llm_messages() {
        let history = ChatHistory::from(vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
        ]);
        let messages: Vec<Message> = history.iter().map(Message::from).collect();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "hello");
    }

    #[test]
    fn test_history_deserializes_from_array() {
        let json = r#"[{"role":"user","content":"hi"},{"role":"assistant","content":"hello"}]"#;
        let history: ChatHistory = serde_json::from_str(json).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.iter().next().unwrap().role, ChatRole::User);
    }
}
