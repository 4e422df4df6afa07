use thiserror::Error;

/// Prefix for execution errors surfaced into the chat, so a failed turn is
/// visually distinct from narration.
pub const ERROR_PREFIX: &str = "❌ Error: ";

/// Render an execution failure the way the chat displays it.
pub fn user_visible_error(err: impl std::fmt::Display) -> String {
    format!("{ERROR_PREFIX}{err}")
}

// Enum for handling application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("AI error: {0:#}")]
    AI(#[from] AIError), // Errors from a turn's streaming execution.

    #[error("GEMINI_API_KEY is not set. Add it to your environment or .env file.")]
    MissingApiKey, // Fatal at startup, before any session is served.

    #[error("Serialization error: {0:#}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0:#}")]
    IO(#[from] std::io::Error),
}

// Errors from the streaming execution layer. These are caught exactly once,
// at the turn boundary, and never crash the session.
#[derive(Debug, Error)]
pub enum AIError {
    #[error("OpenAI API error: {0:#}")]
    OpenAI(#[from] async_openai::error::OpenAIError),

    #[error("Malformed tool call from model: {0}")]
    MalformedToolCall(String),

    #[error("Turn exceeded {0} execution steps")]
    MaxStepsReached(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_errors_carry_the_marker_prefix() {
        let rendered = user_visible_error(AIError::MaxStepsReached(8));
        assert!(rendered.starts_with(ERROR_PREFIX));
        assert!(rendered.contains("8 execution steps"));
    }
}
