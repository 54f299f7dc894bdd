use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{parse_payload, with_shape, GenerationBackend};
use crate::errors::ServiceError;

const SYSTEM: &str = "You are a structured-data generator for a vertical farming dashboard. \
Answer with exactly one JSON object and nothing else.";

pub struct Anthropic {
    pub model: String,
    pub api_base: String,
    pub api_version: String,
    api_key: Option<String>,
    client: Client,
}

impl Anthropic {
    pub fn new(
        model: String,
        api_base: String,
        api_version: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            model,
            api_base,
            api_version,
            api_key: None,
            client: Client::builder().timeout(timeout).build()?,
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn key(&self) -> Result<String, ServiceError> {
        match &self.api_key {
            Some(k) => Ok(k.clone()),
            None => std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
                ServiceError::Unavailable("ANTHROPIC_API_KEY env var is not set".into())
            }),
        }
    }
}

#[derive(Serialize)]
struct MsgRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Msg<'a>>,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MsgResponse {
    content: Vec<Block>,
}

#[derive(Deserialize)]
struct Block {
    #[serde(default)]
    text: String,
    #[serde(default)]
    r#type: String,
}

#[async_trait]
impl GenerationBackend for Anthropic {
    async fn generate(&self, prompt: &str, shape: &Value) -> Result<Value, ServiceError> {
        let api_key = self.key()?;
        let url = format!("{}/v1/messages", self.api_base.trim_end_matches('/'));
        let user = with_shape(prompt, shape);
        let body = MsgRequest {
            model: &self.model,
            max_tokens: 4096,
            system: SYSTEM,
            messages: vec![Msg { role: "user", content: &user }],
        };

        debug!(%url, model = %self.model, "anthropic: POST messages");

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!(%status, bytes = text.len(), "anthropic: raw response");

        if !status.is_success() {
            return Err(ServiceError::Unavailable(format!(
                "Anthropic API error ({}): {}",
                status, text
            )));
        }

        let parsed: MsgResponse = serde_json::from_str(&text).map_err(|e| {
            ServiceError::MalformedOutput(format!("anthropic response parse error: {e}"))
        })?;

        let content = parsed
            .content
            .into_iter()
            .find(|b| b.r#type == "text" && !b.text.is_empty())
            .map(|b| b.text)
            .ok_or_else(|| ServiceError::MalformedOutput("anthropic: empty content".into()))?;

        parse_payload(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn reads_first_text_block() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    { "type": "text", "text": "{\"averageTemp\": 27, \"averageHumidity\": 70, \"climateDescription\": \"Hot and humid.\"}" }
                ]
            })))
            .mount(&server)
            .await;

        let p = Anthropic::new(
            "claude-test".into(),
            server.uri(),
            "2023-06-01".into(),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_api_key("test-key");

        let out = p.generate("prompt", &json!({})).await.unwrap();
        assert_eq!(out["averageTemp"], json!(27));
    }

    #[tokio::test]
    async fn empty_content_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "content": [] })))
            .mount(&server)
            .await;

        let p = Anthropic::new("m".into(), server.uri(), "v".into(), Duration::from_secs(5))
            .unwrap()
            .with_api_key("k");
        let err = p.generate("prompt", &json!({})).await.unwrap_err();
        assert!(matches!(err, ServiceError::MalformedOutput(_)));
    }
}
