//! Conversational core for Clark.
//!
//! Holds the bounded conversation history, talks to the language model,
//! and dispatches each turn either to a direct answer or to a capability
//! whose output is reshaped for speech.

pub mod dispatcher;
pub mod error;
pub mod formatter;
pub mod history;
pub mod llm;

pub use dispatcher::{TurnDispatcher, UNKNOWN_FUNCTION};
pub use error::{ChatError, LlmError};
pub use formatter::{ResponseFormatter, FORMAT_INSTRUCTION};
pub use history::{ConversationHistory, ConversationStore, HistoryGuard};
pub use llm::{Completion, CompletionRequest, LanguageModel, OpenAiClient};
