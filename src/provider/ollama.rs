use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{parse_payload, with_shape, GenerationBackend};
use crate::errors::ServiceError;

pub struct Ollama {
    pub model: String,
    pub url: String,
    client: Client,
}

impl Ollama {
    pub fn new(model: String, url: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            model,
            url,
            client: Client::builder().timeout(timeout).build()?,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    stream: bool,
    format: &'a str,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    content: String,
}

#[async_trait]
impl GenerationBackend for Ollama {
    async fn generate(&self, prompt: &str, shape: &Value) -> Result<Value, ServiceError> {
        let url = format!("{}/api/chat", self.url.trim_end_matches('/'));
        let user = with_shape(prompt, shape);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![Msg { role: "user", content: &user }],
            stream: false,
            format: "json",
            options: OllamaOptions { temperature: 0.1 },
        };

        debug!(%url, model = %self.model, "ollama: POST chat");

        let resp = self.client.post(&url).json(&body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        debug!(%status, bytes = text.len(), "ollama: raw response");

        if !status.is_success() {
            return Err(ServiceError::Unavailable(format!(
                "ollama error ({}): {}",
                status, text
            )));
        }

        // Standard chat envelope first; some proxies return the bare content.
        let content = match serde_json::from_str::<ChatResponse>(&text) {
            Ok(c) => c.message.content,
            Err(_) => text,
        };

        parse_payload(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ServiceErrorKind;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn unwraps_chat_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": { "role": "assistant", "content": "{\"fertilizerName\":\"DAP\",\"reasoning\":\"r\"}" }
            })))
            .mount(&server)
            .await;

        let o = Ollama::new("llama3".into(), server.uri(), Duration::from_secs(5)).unwrap();
        let out = o.generate("p", &json!({})).await.unwrap();
        assert_eq!(out["fertilizerName"], json!("DAP"));
    }

    #[tokio::test]
    async fn unreachable_host_is_unavailable() {
        // Port 9 (discard) is almost never listening locally.
        let o = Ollama::new("llama3".into(), "http://127.0.0.1:9".into(), Duration::from_secs(2))
            .unwrap();
        let err = o.generate("p", &json!({})).await.unwrap_err();
        assert_eq!(err.kind(), ServiceErrorKind::ServiceUnavailable);
    }
}
