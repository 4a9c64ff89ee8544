//! Conversation state keyed by thread identifier.
//!
//! The store is an explicit value passed by reference into each stage
//! invocation: never a hidden singleton. Threads are created on first
//! append and live until process exit; there is no persistence.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A message in a conversation (Entity)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Identifier of a conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How session memory is shared across the pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionScope {
    /// Each stage owns its own conversation thread.
    #[default]
    PerStage,
    /// All stages append to a single shared thread.
    Shared,
}

impl SessionScope {
    pub fn as_str(&self) -> &str {
        match self {
            SessionScope::PerStage => "per_stage",
            SessionScope::Shared => "shared",
        }
    }
}

/// Keyed conversation store: thread id → ordered message history.
#[derive(Debug, Default)]
pub struct ThreadStore {
    threads: HashMap<ThreadId, Vec<Message>>,
}

impl ThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, creating the thread on first use.
    pub fn append(&mut self, id: &ThreadId, message: Message) {
        self.threads.entry(id.clone()).or_default().push(message);
    }

    /// Ordered history for a thread; empty if the thread does not exist.
    pub fn history(&self, id: &ThreadId) -> &[Message] {
        self.threads.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn contains(&self, id: &ThreadId) -> bool {
        self.threads.contains_key(id)
    }

    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    pub fn message_count(&self, id: &ThreadId) -> usize {
        self.history(id).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_created_on_first_append() {
        let mut store = ThreadStore::new();
        let id = ThreadId::from("planning");
        assert!(!store.contains(&id));
        assert!(store.history(&id).is_empty());

        store.append(&id, Message::user("hello"));
        assert!(store.contains(&id));
        assert_eq!(store.message_count(&id), 1);
    }

    #[test]
    fn test_history_preserves_order() {
        let mut store = ThreadStore::new();
        let id = ThreadId::from("chat");
        store.append(&id, Message::user("first"));
        store.append(&id, Message::assistant("second"));
        store.append(&id, Message::user("third"));

        let history = store.history(&id);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].content, "first");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[2].content, "third");
    }

    #[test]
    fn test_threads_are_isolated() {
        let mut store = ThreadStore::new();
        store.append(&ThreadId::from("a"), Message::user("for a"));
        store.append(&ThreadId::from("b"), Message::user("for b"));

        assert_eq!(store.thread_count(), 2);
        assert_eq!(store.history(&ThreadId::from("a"))[0].content, "for a");
        assert_eq!(store.history(&ThreadId::from("b"))[0].content, "for b");
    }

    #[test]
    fn test_session_scope_default_is_per_stage() {
        assert_eq!(SessionScope::default(), SessionScope::PerStage);
    }
}
