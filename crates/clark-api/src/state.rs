//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use clark_chat::{ConversationStore, TurnDispatcher};
use clark_core::ClarkConfig;
use clark_speech::AudioStore;

/// Shared application state. Cloned per request; every field is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ClarkConfig>,
    pub dispatcher: Arc<TurnDispatcher>,
    /// The single process-wide conversation.
    pub conversation: Arc<ConversationStore>,
    pub audio: Arc<AudioStore>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// The conversation is sized from `config.history.max_turns`.
    pub fn new(config: ClarkConfig, dispatcher: TurnDispatcher, audio: Arc<AudioStore>) -> Self {
        let conversation = ConversationStore::new(config.history.max_turns);
        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(dispatcher),
            conversation: Arc::new(conversation),
            audio,
            start_time: Instant::now(),
        }
    }
}
