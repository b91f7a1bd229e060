//! Speech synthesis for Clark.
//!
//! Turns final response text into an MP3 artifact stored under a fresh
//! `<uuid>.mp3` identifier, and serves stored artifacts back by identifier.

pub mod engine;
pub mod error;
pub mod store;
pub mod synthesizer;

pub use engine::{GoogleTtsEngine, SpeechEngine};
pub use error::SpeechError;
pub use store::AudioStore;
pub use synthesizer::{FileSpeechSynthesizer, SpeechSynthesizer};
