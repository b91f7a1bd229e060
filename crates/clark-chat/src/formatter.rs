//! Reshapes raw capability output into speakable prose.

use std::sync::Arc;

use clark_core::Turn;

use crate::llm::{Completion, CompletionRequest, LanguageModel};

pub const FORMAT_INSTRUCTION: &str =
    "Format this response for a voice assistant. Make it clear, short, and natural to read aloud.";

/// One extra model call per capability result. Never fails: any problem
/// falls back to the raw text.
pub struct ResponseFormatter {
    model: Arc<dyn LanguageModel>,
    max_tokens: u32,
}

impl ResponseFormatter {
    pub fn new(model: Arc<dyn LanguageModel>, max_tokens: u32) -> Self {
        Self { model, max_tokens }
    }

    pub async fn reshape(&self, raw: &str) -> String {
        let request = CompletionRequest {
            messages: vec![Turn::system(FORMAT_INSTRUCTION), Turn::user(raw)],
            tools: Vec::new(),
            max_tokens: self.max_tokens,
        };

        match self.model.complete(request).await {
            Ok(Completion::Text(text)) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(Completion::Text(_)) => {
                tracing::warn!("Formatter returned empty text, using raw output");
                raw.to_string()
            }
            Ok(Completion::ToolCall { name, .. }) => {
                tracing::warn!(tool = %name, "Formatter returned a tool call, using raw output");
                raw.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Formatting failed, using raw output");
                raw.to_string()
            }
        }
    }
}
