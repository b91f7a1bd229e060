//! Error types for the conversational core.

/// Errors from handling a chat turn.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("invalid capability arguments: {0}")]
    InvalidArguments(String),
}

impl ChatError {
    /// Whether the caller sent an unacceptable message (as opposed to the
    /// turn failing downstream).
    pub fn is_validation(&self) -> bool {
        matches!(self, ChatError::EmptyMessage | ChatError::MessageTooLong(_))
    }
}

/// Errors from the language model client.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("model returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid model response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Http(err.to_string())
    }
}
