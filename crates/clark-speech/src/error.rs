//! Error types for speech synthesis and audio storage.

/// Errors from the speech engine and the audio store.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("speech engine error: {0}")]
    Engine(String),
    #[error("audio storage error: {0}")]
    Storage(String),
    #[error("invalid audio id: {0}")]
    InvalidAudioId(String),
    #[error("audio not found: {0}")]
    NotFound(String),
}

impl From<std::io::Error> for SpeechError {
    fn from(err: std::io::Error) -> Self {
        SpeechError::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for SpeechError {
    fn from(err: reqwest::Error) -> Self {
        SpeechError::Engine(err.to_string())
    }
}
