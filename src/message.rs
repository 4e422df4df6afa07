use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    User,
    Game,
    System,
}

/// A rendered chat entry. `Game` messages mutate in place while a response
/// streams; the session history itself only ever sees the finished text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    pub message_type: MessageType,
}

impl Message {
    pub fn new(message_type: MessageType, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            message_type,
        }
    }
}
