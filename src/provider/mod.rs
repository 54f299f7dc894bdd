use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::ServiceError;

pub mod anthropic;
pub mod ollama;
pub mod openai;
#[cfg(test)]
pub mod scripted;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(name = "openai", alias = "open-ai")]
    OpenAI,
    Anthropic,
    Ollama,
}

/// External text-generation service: prompt in, shape-conformant JSON out.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, prompt: &str, shape: &Value) -> Result<Value, ServiceError>;
}

pub type DynBackend = Arc<dyn GenerationBackend>;

pub fn make_backend(cfg: &Config) -> anyhow::Result<DynBackend> {
    let backend: DynBackend = match cfg.provider {
        ProviderKind::OpenAI => Arc::new(openai::OpenAIProvider::new(
            cfg.model.clone(),
            cfg.openai_url.clone(),
            cfg.timeout(),
        )?),
        ProviderKind::Anthropic => Arc::new(anthropic::Anthropic::new(
            cfg.model.clone(),
            cfg.anthropic_url.clone(),
            cfg.anthropic_version.clone(),
            cfg.timeout(),
        )?),
        ProviderKind::Ollama => Arc::new(ollama::Ollama::new(
            cfg.model.clone(),
            cfg.ollama_url.clone(),
            cfg.timeout(),
        )?),
    };
    Ok(backend)
}

/// Append the expected output shape to a rendered prompt.
pub(crate) fn with_shape(prompt: &str, shape: &Value) -> String {
    format!(
        "{prompt}\n\nThe JSON object must conform to this schema:\n{}",
        serde_json::to_string_pretty(shape).unwrap_or_else(|_| shape.to_string())
    )
}

/// Parse model text into a JSON object. Prose around the object is tolerated.
pub(crate) fn parse_payload(content: &str) -> Result<Value, ServiceError> {
    if let Ok(v @ Value::Object(_)) = serde_json::from_str::<Value>(content.trim()) {
        return Ok(v);
    }
    if let Some(obj) = extract_first_json_object(content) {
        if let Ok(v) = serde_json::from_str::<Value>(obj) {
            return Ok(v);
        }
    }
    Err(ServiceError::MalformedOutput(format!(
        "model did not return a JSON object.\n--- content start ---\n{}\n--- content end ---",
        content
    )))
}

/// Extracts the first top-level JSON object substring from a string.
/// Braces inside string literals are skipped.
fn extract_first_json_object(s: &str) -> Option<&str> {
    let mut start = None;
    let mut depth = 0usize;
    let mut in_str = false;
    let mut escaped = false;

    for (i, b) in s.bytes().enumerate() {
        if in_str {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_str = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' if start.is_some() => in_str = true,
            b'{' => {
                if start.is_none() {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return start.map(|st| &s[st..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ServiceErrorKind;
    use serde_json::json;

    #[test]
    fn plain_object_parses() {
        let v = parse_payload(r#" {"cropName":"Basil"} "#).unwrap();
        assert_eq!(v, json!({ "cropName": "Basil" }));
    }

    #[test]
    fn object_wrapped_in_prose_is_extracted() {
        let text = "Sure! Here you go:\n```json\n{\"reason\":\"a {curly} note\",\"n\":{\"x\":1}}\n```";
        let v = parse_payload(text).unwrap();
        assert_eq!(v["reason"], json!("a {curly} note"));
        assert_eq!(v["n"]["x"], json!(1));
    }

    #[test]
    fn non_object_is_malformed() {
        for text in ["[1,2,3]", "no json here", "{\"unterminated\": "] {
            let err = parse_payload(text).unwrap_err();
            assert_eq!(err.kind(), ServiceErrorKind::MalformedOutput);
        }
    }

    #[test]
    fn shape_is_appended() {
        let p = with_shape("Hello", &json!({ "type": "object" }));
        assert!(p.starts_with("Hello\n\n"));
        assert!(p.contains("\"type\": \"object\""));
    }
}
