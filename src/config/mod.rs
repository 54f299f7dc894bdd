use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::provider::ProviderKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderKind,
    pub model: String,
    pub timeout_secs: u64,
    pub openai_url: String,
    pub anthropic_url: String,
    pub anthropic_version: String,
    pub ollama_url: String,
    /// SQLite file holding the last good result per feature.
    pub store_path: String,
    /// When set, every prompt/output exchange is saved here.
    pub transcript_dir: Option<String>,
    pub alert_poll_secs: u64,
    pub metrics_poll_secs: u64,
    pub default_city: String,
    pub default_state: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAI,
            model: "gpt-4.1-mini".into(),
            timeout_secs: 60,
            openai_url: "https://api.openai.com".into(),
            anthropic_url: "https://api.anthropic.com".into(),
            anthropic_version: "2023-06-01".into(),
            ollama_url: "http://localhost:11434".into(),
            store_path: ".vertifarm/cache.sqlite".into(),
            transcript_dir: None,
            alert_poll_secs: 30,
            metrics_poll_secs: 5,
            default_city: "Bengaluru".into(),
            default_state: "Karnataka".into(),
        }
    }
}

impl Config {
    /// Read a TOML config file; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        toml::from_str(&s).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn alert_interval(&self) -> Duration {
        Duration::from_secs(self.alert_poll_secs.max(1))
    }

    pub fn metrics_interval(&self) -> Duration {
        Duration::from_secs(self.metrics_poll_secs.max(1))
    }
}
