//! Hosted inference gateway (Bytez).
//!
//! Every model is reached through `POST {base}/{model_id}`. The request body depends on the
//! model family, which is guessed from the model id: chat models get a `messages` array,
//! embedding models a bare `text`, media analysis a multimodal content array, and anything
//! else the generic `inputs` field.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::config::GatewayConfig;

const CHAT_MARKERS: &[&str] = &["Llama", "Phi", "Qwen", "gemma"];
const EMBEDDING_MARKERS: &[&str] = &["sentence-transformers", "all-MiniLM"];

const MAX_LENGTH: u32 = 500;
const TEMPERATURE: f64 = 0.7;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Model API Error: {0}")]
    Transport(String),
    #[error("Model API Error: Bytez API error: {status} - {body}")]
    Status { status: String, body: String },
    #[error("Model API Error: Bytez model error: {0}")]
    Model(String),
    #[error("Model API Error: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Text,
    Image,
    Audio,
    Video,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Text => "text",
            ModelKind::Image => "image",
            ModelKind::Audio => "audio",
            ModelKind::Video => "video",
        }
    }

    fn is_media(&self) -> bool {
        !matches!(self, ModelKind::Text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Multimodal,
    Chat,
    Embedding,
    Raw,
}

impl PayloadFormat {
    pub fn detect(model_id: &str, kind: ModelKind, media_url: Option<&str>) -> Self {
        if media_url.is_some_and(|url| !url.is_empty()) && kind.is_media() {
            PayloadFormat::Multimodal
        } else if CHAT_MARKERS.iter().any(|m| model_id.contains(m)) {
            PayloadFormat::Chat
        } else if EMBEDDING_MARKERS.iter().any(|m| model_id.contains(m)) {
            PayloadFormat::Embedding
        } else {
            PayloadFormat::Raw
        }
    }

    /// Chat-style replies wrap the text in `output.content`.
    fn is_conversational(&self) -> bool {
        matches!(self, PayloadFormat::Multimodal | PayloadFormat::Chat)
    }
}

pub fn build_payload(format: PayloadFormat, prompt: &str, kind: ModelKind, media_url: Option<&str>) -> Value {
    let params = json!({ "max_length": MAX_LENGTH, "temperature": TEMPERATURE });

    match format {
        PayloadFormat::Multimodal => json!({
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    { "type": kind.as_str(), "url": media_url.unwrap_or_default() }
                ]
            }],
            "stream": false,
            "params": params
        }),
        PayloadFormat::Chat => json!({
            "messages": [{ "role": "user", "content": prompt }],
            "stream": false,
            "params": params
        }),
        PayloadFormat::Embedding => json!({ "text": prompt }),
        PayloadFormat::Raw => json!({ "inputs": prompt }),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Extracts the model output from a provider reply, surfacing an `error` field as a failure.
pub fn unwrap_output(format: PayloadFormat, mut body: Value) -> Result<Value, GatewayError> {
    if let Some(error) = body.get("error").filter(|e| is_truthy(e)) {
        return Err(GatewayError::Model(output_text(error)));
    }

    let output = body.get_mut("output").map(Value::take).unwrap_or(Value::Null);

    if format.is_conversational() {
        match output.get("content") {
            Some(content) if is_truthy(content) => Ok(content.clone()),
            _ => Ok(output),
        }
    } else if is_truthy(&output) {
        Ok(output)
    } else {
        Ok(body)
    }
}

/// Plain text for a model output: strings as-is, anything else as compact JSON.
pub fn output_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn query_model(
        &self,
        model_id: &str,
        prompt: &str,
        kind: ModelKind,
        media_url: Option<&str>,
    ) -> Result<Value, GatewayError>;

    async fn query_text(
        &self,
        model_id: &str,
        prompt: &str,
        kind: ModelKind,
        media_url: Option<&str>,
    ) -> Result<String, GatewayError> {
        let output = self.query_model(model_id, prompt, kind, media_url).await?;
        Ok(output_text(&output))
    }
}

pub struct BytezGateway {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl BytezGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_base: config.api_base.clone(),
        })
    }

    async fn call(
        &self,
        model_id: &str,
        prompt: &str,
        kind: ModelKind,
        media_url: Option<&str>,
    ) -> Result<Value, GatewayError> {
        let format = PayloadFormat::detect(model_id, kind, media_url);
        let payload = build_payload(format, prompt, kind, media_url);
        let url = format!("{}/{}", self.api_base, model_id);

        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.to_string(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(format!("Invalid JSON from provider: {}", e)))?;

        unwrap_output(format, body)
    }
}

#[async_trait]
impl ModelGateway for BytezGateway {
    async fn query_model(
        &self,
        model_id: &str,
        prompt: &str,
        kind: ModelKind,
        media_url: Option<&str>,
    ) -> Result<Value, GatewayError> {
        log::info!("🤖 [Bytez] Calling model: {} ({})", model_id, kind.as_str());

        let result = self.call(model_id, prompt, kind, media_url).await;
        if let Err(e) = &result {
            log::error!("❌ [Bytez] {} failed: {}", model_id, e);
        }
        result
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub model_id: String,
        pub prompt: String,
        pub kind: ModelKind,
        pub media_url: Option<String>,
    }

    type Responder = Box<dyn Fn(&RecordedCall) -> Result<Value, GatewayError> + Send + Sync>;

    /// Gateway double that records every call and answers through a closure.
    pub struct ScriptedGateway {
        responder: Responder,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl ScriptedGateway {
        pub fn new<F>(responder: F) -> Self
        where
            F: Fn(&RecordedCall) -> Result<Value, GatewayError> + Send + Sync + 'static,
        {
            Self {
                responder: Box::new(responder),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelGateway for ScriptedGateway {
        async fn query_model(
            &self,
            model_id: &str,
            prompt: &str,
            kind: ModelKind,
            media_url: Option<&str>,
        ) -> Result<Value, GatewayError> {
            let call = RecordedCall {
                model_id: model_id.to_string(),
                prompt: prompt.to_string(),
                kind,
                media_url: media_url.map(str::to_string),
            };
            let result = (self.responder)(&call);
            self.calls.lock().unwrap().push(call);
            result
        }
    }
}
