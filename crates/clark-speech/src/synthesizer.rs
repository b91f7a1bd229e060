//! Speech synthesizer: engine output persisted to the audio store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::engine::SpeechEngine;
use crate::error::SpeechError;
use crate::store::AudioStore;

/// Produces a stored audio artifact for a piece of text.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` and return the new artifact's identifier.
    ///
    /// Every call creates a new artifact, even for identical text.
    async fn synthesize(&self, text: &str) -> Result<String, SpeechError>;
}

/// Synthesizer writing engine output into an [`AudioStore`].
pub struct FileSpeechSynthesizer {
    engine: Arc<dyn SpeechEngine>,
    store: Arc<AudioStore>,
}

impl FileSpeechSynthesizer {
    pub fn new(engine: Arc<dyn SpeechEngine>, store: Arc<AudioStore>) -> Self {
        Self { engine, store }
    }
}

#[async_trait]
impl SpeechSynthesizer for FileSpeechSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<String, SpeechError> {
        let bytes = self.engine.synthesize(text).await?;
        let id = self.store.save(&bytes).await?;
        tracing::info!(audio_id = %id, bytes = bytes.len(), "Speech synthesized");
        Ok(id)
    }
}
