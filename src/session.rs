//! Per-session conversation state.
//!
//! A session owns exactly one append-only history of role-tagged messages.
//! Nothing here is shared across sessions; the single active turn has
//! exclusive access, so no locking is needed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the conversation history. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
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

/// The per-connection container for one conversation. Created at chat start,
/// dropped on exit; there is no durable storage.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    history: Vec<ChatMessage>,
}

impl Session {
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        log::info!("session {id} started");
        Self {
            id,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.history.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.history.push(ChatMessage::assistant(content));
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_grows_two_entries_per_turn() {
        let mut session = Session::new();
        for turn in 1..=5 {
            session.push_user(format!("player input {turn}"));
            session.push_assistant(format!("narration {turn}"));
            assert_eq!(session.len(), turn * 2);
        }

        // Strict chronological alternation, user first.
        for (i, message) in session.history().iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(message.role, expected, "entry {i}");
        }
    }

    #[test]
    fn entries_are_never_rewritten() {
        let mut session = Session::new();
        session.push_user("I enter the dungeon");
        let first = session.history()[0].clone();
        session.push_assistant("A trap triggers beneath your feet!");
        session.push_user("I jump back");
        assert_eq!(session.history()[0], first);
    }
}
