use anyhow::Result;
use chrono::Utc;
use fs_err as fs;
use serde_json::{json, to_string_pretty, Value};
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::wire::FeatureKind;

/// Install the global fmt subscriber. `RUST_LOG` wins over `debug`.
pub fn init(debug: bool) {
    let fallback = if debug { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_target(false)
        .try_init();
}

/// Writes each prompt/output exchange to `<dir>/<uuid>.json`.
#[derive(Debug, Clone)]
pub struct Transcript {
    dir: PathBuf,
}

impl Transcript {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn save(
        &self,
        kind: FeatureKind,
        prompt: &str,
        outcome: &Result<Value, ServiceError>,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let id = Uuid::new_v4();
        let (output, error) = match outcome {
            Ok(v) => (Some(v.clone()), None),
            Err(e) => (None, Some(e.to_string())),
        };
        let doc = json!({
            "id": id,
            "feature": kind,
            "at": Utc::now(),
            "prompt": prompt,
            "output": output,
            "error": error,
        });
        let path = self.dir.join(format!("{id}.json"));
        fs::write(&path, to_string_pretty(&doc)?)?;
        Ok(path)
    }

    /// Best-effort variant used on the hot path.
    pub fn record(&self, kind: FeatureKind, prompt: &str, outcome: &Result<Value, ServiceError>) {
        match self.save(kind, prompt, outcome) {
            Ok(p) => debug!(path = %p.display(), "transcript saved"),
            Err(e) => warn!(error = %e, "failed to save transcript"),
        }
    }
}
