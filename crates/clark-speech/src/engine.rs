//! Text-to-speech engines.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use clark_core::config::SpeechConfig;
use serde::Deserialize;
use serde_json::json;

use crate::error::SpeechError;

/// Converts text to encoded audio bytes (MP3).
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

/// Google Cloud Text-to-Speech over its REST API.
pub struct GoogleTtsEngine {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    language_code: String,
    voice_name: String,
    ssml_gender: String,
}

impl GoogleTtsEngine {
    pub fn new(config: &SpeechConfig) -> Result<Self, SpeechError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language_code: config.language_code.clone(),
            voice_name: config.voice_name.clone(),
            ssml_gender: config.ssml_gender.clone(),
        })
    }
}

#[async_trait]
impl SpeechEngine for GoogleTtsEngine {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SpeechError::Engine("no speech API key configured".to_string()))?;

        let body = json!({
            "input": {"text": text},
            "voice": {
                "languageCode": self.language_code,
                "name": self.voice_name,
                "ssmlGender": self.ssml_gender,
            },
            "audioConfig": {"audioEncoding": "MP3"},
        });

        let resp = self
            .http
            .post(format!("{}/text:synthesize", self.base_url))
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let detail = resp.text().await.unwrap_or_default();
            return Err(SpeechError::Engine(format!("status {}: {}", status, detail)));
        }

        let parsed: SynthesizeResponse = resp
            .json()
            .await
            .map_err(|e| SpeechError::Engine(format!("invalid response: {}", e)))?;
        if parsed.audio_content.is_empty() {
            return Err(SpeechError::Engine("response carried no audio".to_string()));
        }

        base64::engine::general_purpose::STANDARD
            .decode(parsed.audio_content.as_bytes())
            .map_err(|e| SpeechError::Engine(format!("audio is not valid base64: {}", e)))
    }
}
