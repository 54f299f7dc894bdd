use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{parse_payload, with_shape, GenerationBackend};
use crate::errors::ServiceError;

/// OpenAI chat-completions backend. The prompt goes out as a single user
/// message and the model is forced into JSON-object mode.
pub struct OpenAIProvider {
    model: String,
    base_url: String,
    client: Client,
    api_key: Option<String>,
}

impl OpenAIProvider {
    pub fn new(model: String, base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            model,
            base_url,
            client: Client::builder().timeout(timeout).build()?,
            api_key: None,
        })
    }

    /// Use a fixed key instead of reading `OPENAI_API_KEY` per call.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn key(&self) -> Result<String, ServiceError> {
        match &self.api_key {
            Some(k) => Ok(k.clone()),
            None => std::env::var("OPENAI_API_KEY")
                .map_err(|_| ServiceError::Unavailable("OPENAI_API_KEY env var is not set".into())),
        }
    }
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[async_trait]
impl GenerationBackend for OpenAIProvider {
    async fn generate(&self, prompt: &str, shape: &Value) -> Result<Value, ServiceError> {
        let api_key = self.key()?;
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": with_shape(prompt, shape) }
            ],
            "temperature": 0.2,
            "response_format": { "type": "json_object" }
        });

        debug!(%url, model = %self.model, "openai: POST chat completion");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!(%status, bytes = text.len(), "openai: raw response");

        if !status.is_success() {
            return Err(ServiceError::Unavailable(format!(
                "OpenAI API error ({}): {}",
                status, text
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            ServiceError::MalformedOutput(format!("failed to parse OpenAI response: {e}"))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ServiceError::MalformedOutput("OpenAI returned no content".into()))?;

        parse_payload(&content)
    }
}
