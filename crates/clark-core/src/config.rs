use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ClarkError, Result};

/// Default persona prompt sent as the first system turn of every routing call.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a personalized AI assistant named Clark. \
Your goal is to help your user with coding, research, daily tasks, and general productivity. \
You remember details from earlier in this session, but you do not retain anything permanently. \
If asked about yourself, respond as Clark. Keep context in mind based on the conversation so far. \
Your answers are read aloud, so keep them short and conversational. \
When the user asks about their email or calendar, call the matching function instead of guessing.";

/// Top-level configuration for the Clark service.
///
/// Loaded from `~/.clark/config.toml` by default, then overridden by
/// environment variables (see [`ClarkConfig::apply_env`]). Each section
/// corresponds to one collaborator of the turn pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClarkConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

impl ClarkConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ClarkConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ClarkError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Override file values with process environment variables.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Override file values using `lookup` as the environment.
    ///
    /// Recognised keys: `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `GOOGLE_TOKEN_FILE`,
    /// `GOOGLE_TTS_API_KEY`, `CLARK_AUDIO_DIR`. Empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(path) = get("GOOGLE_TOKEN_FILE") {
            self.google.token_file = path;
        }
        if let Some(key) = get("GOOGLE_TTS_API_KEY") {
            self.speech.api_key = Some(key);
        }
        if let Some(dir) = get("CLARK_AUDIO_DIR") {
            self.speech.audio_dir = dir;
        }
    }
}

/// General process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Interface the HTTP server binds to.
    pub host: String,
    /// HTTP server port.
    pub port: u16,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            host: "127.0.0.1".to_string(),
            port: 5001,
            cors_origins: Vec::new(),
        }
    }
}

/// Language-model provider settings (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key. Usually supplied through `OPENAI_API_KEY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL up to and including the version segment.
    pub base_url: String,
    /// Model used for both routing and formatting calls.
    pub model: String,
    /// Token ceiling for the tool-routing call.
    pub routing_max_tokens: u32,
    /// Token ceiling for the formatting call.
    pub format_max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            routing_max_tokens: 2000,
            format_max_tokens: 300,
            timeout_secs: 60,
        }
    }
}

/// Turn handling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum accepted user message length in characters.
    pub max_message_chars: usize,
    /// Persona prompt for the routing call.
    pub system_prompt: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_chars: 4000,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Conversation history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of turns retained; oldest are evicted first.
    pub max_turns: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_turns: 100 }
    }
}

/// Google Workspace (Gmail + Calendar) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Authorized-user token file (access + refresh token).
    pub token_file: String,
    /// Gmail REST base URL.
    pub gmail_base_url: String,
    /// Calendar REST base URL.
    pub calendar_base_url: String,
    /// Calendar queried for upcoming events.
    pub calendar_id: String,
    /// Number of messages / events fetched per request.
    pub max_results: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            token_file: "token.json".to_string(),
            gmail_base_url: "https://gmail.googleapis.com/gmail/v1".to_string(),
            calendar_base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            calendar_id: "primary".to_string(),
            max_results: 5,
            timeout_secs: 30,
        }
    }
}

/// Speech synthesis settings (Google Cloud Text-to-Speech).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// API key. Usually supplied through `GOOGLE_TTS_API_KEY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Text-to-Speech REST base URL.
    pub base_url: String,
    /// BCP-47 language code.
    pub language_code: String,
    /// Voice name.
    pub voice_name: String,
    /// SSML gender: MALE, FEMALE, NEUTRAL.
    pub ssml_gender: String,
    /// Directory where audio artifacts are written.
    pub audio_dir: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://texttospeech.googleapis.com/v1".to_string(),
            language_code: "en-US".to_string(),
            voice_name: "en-US-Wavenet-D".to_string(),
            ssml_gender: "MALE".to_string(),
            audio_dir: "audio_responses".to_string(),
            timeout_secs: 30,
        }
    }
}
