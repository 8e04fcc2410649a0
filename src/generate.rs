use crate::config::Config;
use crate::errors::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Opaque text-generation capability.
///
/// The pipeline never talks to a model runtime directly; it hands over a
/// prompt plus an optional schema hint and gets text back. That keeps every
/// stage testable without a live model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, schema_hint: Option<&str>)
        -> Result<String, AppError>;
}

/// Generator backed by a Claude-style messages endpoint.
pub struct MessagesApiGenerator {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl MessagesApiGenerator {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs.max(30)))
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to build generator client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.generator_base_url.clone(),
            api_key: config.generator_api_key.clone(),
            model: config.generator_model.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for MessagesApiGenerator {
    async fn generate(
        &self,
        prompt: &str,
        schema_hint: Option<&str>,
    ) -> Result<String, AppError> {
        let url = format!("{}/v1/messages", self.base_url);

        let mut body = json!({
            "model": self.model,
            "max_tokens": 1024,
            "temperature": 0.3,
            "messages": [{"role": "user", "content": prompt}],
        });
        if let Some(hint) = schema_hint {
            body["system"] = json!(hint);
        }

        tracing::debug!("Generating text with model {}", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Generator request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Generator returned status {}: {}",
                status, error_text
            )));
        }

        let value: Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse generator response: {}", e))
        })?;

        let text = value
            .get("content")
            .and_then(|c| c.get(0))
            .and_then(|block| block.get("text"))
            .and_then(|t| t.as_str())
            .ok_or_else(|| {
                AppError::ExternalApiError("Generator response missing text content".to_string())
            })?;

        Ok(text.to_string())
    }
}

/// Generator that replays canned replies in order.
///
/// Used by tests and offline runs; an exhausted script is an error so a test
/// that issues one call too many fails loudly.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one reply.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(reply.into());
        self
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _schema_hint: Option<&str>,
    ) -> Result<String, AppError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::ExternalApiError("No scripted reply left".to_string()))
    }
}
