//! Turn dispatcher: the per-message pipeline.
//!
//! Validates the message, asks the language model to either answer or call
//! a capability, runs the capability and reshapes its output, records the
//! turn in history, and synthesizes speech for the final text.

use std::sync::Arc;

use clark_action::{CapabilityError, CapabilityRegistry};
use clark_core::{ClarkConfig, Turn, TurnOutcome};
use clark_speech::SpeechSynthesizer;

use crate::error::ChatError;
use crate::formatter::ResponseFormatter;
use crate::history::ConversationStore;
use crate::llm::{Completion, CompletionRequest, LanguageModel};

/// Final text when the model calls a capability that is not registered.
pub const UNKNOWN_FUNCTION: &str = "Unknown function request.";

pub struct TurnDispatcher {
    model: Arc<dyn LanguageModel>,
    registry: Arc<CapabilityRegistry>,
    formatter: ResponseFormatter,
    speech: Arc<dyn SpeechSynthesizer>,
    system_prompt: String,
    routing_max_tokens: u32,
    max_message_chars: usize,
}

impl TurnDispatcher {
    /// The same model serves routing and formatting.
    pub fn new(
        model: Arc<dyn LanguageModel>,
        registry: Arc<CapabilityRegistry>,
        speech: Arc<dyn SpeechSynthesizer>,
        config: &ClarkConfig,
    ) -> Self {
        Self {
            formatter: ResponseFormatter::new(Arc::clone(&model), config.llm.format_max_tokens),
            model,
            registry,
            speech,
            system_prompt: config.chat.system_prompt.clone(),
            routing_max_tokens: config.llm.routing_max_tokens,
            max_message_chars: config.chat.max_message_chars,
        }
    }

    /// Handle one user message against `store`.
    ///
    /// The store stays locked for the whole turn, so concurrent calls run one
    /// after another. Work happens on a draft of the history that is
    /// committed only once the final text exists, so a failed turn leaves the
    /// history untouched. Speech failure is not a turn failure: the outcome
    /// simply carries no audio.
    pub async fn handle(
        &self,
        message: &str,
        store: &ConversationStore,
    ) -> Result<TurnOutcome, ChatError> {
        self.validate(message)?;

        let mut history = store.lock().await;
        let mut draft = history.clone();
        draft.push(Turn::user(message));

        let mut messages = Vec::with_capacity(draft.len() + 1);
        messages.push(Turn::system(self.system_prompt.as_str()));
        messages.extend(draft.iter().cloned());

        let completion = self
            .model
            .complete(CompletionRequest {
                messages,
                tools: self.registry.schemas(),
                max_tokens: self.routing_max_tokens,
            })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Routing call failed");
                ChatError::from(e)
            })?;

        let final_text = match completion {
            Completion::Text(text) => {
                tracing::debug!("Model answered directly");
                text
            }
            Completion::ToolCall { name, arguments } => {
                self.run_capability(&name, &arguments).await?
            }
        };

        draft.push(Turn::assistant(final_text.as_str()));
        *history = draft;

        let audio_id = match self.speech.synthesize(&final_text).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(error = %e, "Speech synthesis failed, returning text only");
                None
            }
        };

        tracing::info!(
            history_len = history.len(),
            audio = audio_id.is_some(),
            "Turn completed"
        );
        Ok(TurnOutcome {
            final_text,
            audio_id,
        })
    }

    fn validate(&self, message: &str) -> Result<(), ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if message.chars().count() > self.max_message_chars {
            return Err(ChatError::MessageTooLong(self.max_message_chars));
        }
        Ok(())
    }

    /// Resolve and run a tool call, returning the text for the user.
    async fn run_capability(&self, name: &str, arguments: &str) -> Result<String, ChatError> {
        let request = match self.registry.resolve(name, arguments) {
            Ok(request) => request,
            Err(CapabilityError::UnknownCapability(name)) => {
                tracing::warn!(capability = %name, "Model requested an unknown capability");
                return Ok(UNKNOWN_FUNCTION.to_string());
            }
            Err(e) => {
                tracing::error!(capability = %name, error = %e, "Rejected capability arguments");
                return Err(ChatError::InvalidArguments(e.to_string()));
            }
        };

        tracing::debug!(
            capability = %request.kind(),
            operation = request.operation(),
            "Model requested a capability"
        );

        match self.registry.execute(&request).await {
            Ok(raw) => Ok(self.formatter.reshape(&raw).await),
            Err(e) => {
                tracing::warn!(capability = %request.kind(), error = %e, "Capability failed");
                Ok(format!(
                    "Error fetching {}: {}",
                    request.kind().subject_noun(),
                    e
                ))
            }
        }
    }
}
