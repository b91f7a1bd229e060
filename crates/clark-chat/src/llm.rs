//! Language model abstraction and the OpenAI-compatible client.

use std::time::Duration;

use async_trait::async_trait;
use clark_action::ToolSchema;
use clark_core::config::LlmConfig;
use clark_core::Turn;
use serde_json::{json, Value};

use crate::error::LlmError;

/// One model call: the conversation so far, the tools the model may call,
/// and the output budget.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<Turn>,
    /// Empty means the model must answer in text.
    pub tools: Vec<ToolSchema>,
    pub max_tokens: u32,
}

/// What the model produced: text or a single tool call, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Text(String),
    ToolCall {
        name: String,
        /// Raw JSON argument object, unvalidated.
        arguments: String,
    },
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError>;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn request_body(&self, request: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": request.messages,
            "max_tokens": request.max_tokens,
        });
        if !request.tools.is_empty() {
            let tools: Vec<Value> = request
                .tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        }
                    })
                })
                .collect();
            body["tools"] = Value::Array(tools);
            body["tool_choice"] = json!("auto");
        }
        body
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            max_tokens = request.max_tokens,
            "POST chat completion"
        );

        let mut req = self.http.post(&url).json(&self.request_body(&request));
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(status, body = %body, "Chat completion failed");
            return Err(LlmError::Status { status, body });
        }

        let val: Value = resp
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("body is not JSON: {}", e)))?;
        extract_completion(&val)
    }
}

/// Read `choices[0].message`: the first entry of `tool_calls`, else a legacy
/// `function_call`, else `content`.
fn extract_completion(val: &Value) -> Result<Completion, LlmError> {
    let message = val
        .pointer("/choices/0/message")
        .ok_or_else(|| LlmError::InvalidResponse("missing choices[0].message".to_string()))?;

    let call = message
        .get("tool_calls")
        .and_then(|calls| calls.get(0))
        .and_then(|call| call.get("function"))
        .or_else(|| message.get("function_call").filter(|v| !v.is_null()));

    if let Some(function) = call {
        let name = function
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| LlmError::InvalidResponse("tool call without a name".to_string()))?;
        let arguments = function
            .get("arguments")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Ok(Completion::ToolCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        });
    }

    message
        .get("content")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(|text| Completion::Text(text.to_string()))
        .ok_or_else(|| {
            LlmError::InvalidResponse("message has neither content nor a tool call".to_string())
        })
}
