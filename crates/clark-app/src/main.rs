//! Clark application binary - composition root.
//!
//! 1. Load `.env`, CLI args and configuration (file, then env, then flags)
//! 2. Initialize tracing
//! 3. Build the language model client, Google capabilities and speech pipeline
//! 4. Start the axum API server

mod cli;

use std::sync::Arc;

use clap::Parser;

use clark_action::CapabilityRegistry;
use clark_api::{start_server, AppState};
use clark_chat::{OpenAiClient, TurnDispatcher};
use clark_core::ClarkConfig;
use clark_speech::{AudioStore, FileSpeechSynthesizer, GoogleTtsEngine};

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = ClarkConfig::load_or_default(&config_file);
    config.apply_env();
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }
    config.general.port = args.resolve_port(config.general.port);
    if let Some(dir) = args.resolve_audio_dir() {
        config.speech.audio_dir = dir;
    }

    // Tracing. RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting Clark v{}", env!("CARGO_PKG_VERSION"));
    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => tracing::debug!("No .env file"),
        Err(e) => tracing::warn!(error = %e, "Failed to read .env"),
    }
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    if config.llm.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; chat completions will be sent unauthenticated");
    }
    if config.speech.api_key.is_none() {
        tracing::warn!("GOOGLE_TTS_API_KEY is not set; responses will carry no audio");
    }
    if !std::path::Path::new(&config.google.token_file).exists() {
        tracing::warn!(
            token_file = %config.google.token_file,
            "Google token file not found; email and calendar requests will fail"
        );
    }

    // Speech.
    let audio = Arc::new(AudioStore::open(&config.speech.audio_dir)?);
    let engine = Arc::new(GoogleTtsEngine::new(&config.speech)?);
    let speech = Arc::new(FileSpeechSynthesizer::new(engine, Arc::clone(&audio)));
    tracing::info!(dir = %config.speech.audio_dir, voice = %config.speech.voice_name, "Speech pipeline ready");

    // Capabilities.
    let mut registry = CapabilityRegistry::new();
    registry.register_google(&config.google)?;

    // Language model and dispatcher.
    let model = Arc::new(OpenAiClient::new(&config.llm)?);
    tracing::info!(model = %config.llm.model, base_url = %config.llm.base_url, "Language model client ready");
    let dispatcher = TurnDispatcher::new(model, Arc::new(registry), speech, &config);

    // API server.
    let state = AppState::new(config.clone(), dispatcher, audio);
    if let Err(e) = start_server(&config, state).await {
        tracing::error!(error = %e, "API server stopped");
        return Err(e.into());
    }

    Ok(())
}
