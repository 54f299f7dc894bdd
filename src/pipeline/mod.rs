//! Validated generation with fallback: validate the caller's input, make one
//! generation attempt, remember the result on success and fall back to the
//! last remembered result on failure.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::{FieldErrors, ServiceError};
use crate::feature::Feature;
use crate::invoker::Invoker;
use crate::schema;
use crate::store::ResultCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    Invoking,
    Succeeded,
    FallingBack,
    Rejected,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Generated by this invocation and now cached.
    Fresh(T),
    /// Generation failed; this is the last cached good result.
    Fallback {
        data: T,
        written_at: DateTime<Utc>,
        cause: ServiceError,
    },
    /// Input failed validation. Nothing was generated or cached.
    Rejected { message: String, errors: FieldErrors },
    /// Generation failed and nothing usable was cached.
    Failed(String),
}

impl<T> Outcome<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            Outcome::Fresh(d) | Outcome::Fallback { data: d, .. } => Some(d),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Outcome::Fresh(d) | Outcome::Fallback { data: d, .. } => Some(d),
            _ => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Outcome::Fallback { .. })
    }

    /// Terminal state reached by the invocation.
    pub fn phase(&self) -> Phase {
        match self {
            Outcome::Fresh(_) => Phase::Succeeded,
            Outcome::Fallback { .. } => Phase::FallingBack,
            Outcome::Rejected { .. } => Phase::Rejected,
            Outcome::Failed(_) => Phase::Failed,
        }
    }

    pub fn into_reply(self) -> Reply<T> {
        match self {
            Outcome::Fresh(d) => Reply { data: Some(d), error: None, stale: false, field_errors: None },
            Outcome::Fallback { data, .. } => {
                Reply { data: Some(data), error: None, stale: true, field_errors: None }
            }
            Outcome::Rejected { message, errors } => Reply {
                data: None,
                error: Some(message),
                stale: false,
                field_errors: Some(errors),
            },
            Outcome::Failed(msg) => Reply { data: None, error: Some(msg), stale: false, field_errors: None },
        }
    }
}

/// Caller-facing `{ data?, error? }` envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
}

#[derive(Clone)]
pub struct Orchestrator {
    invoker: Invoker,
    cache: ResultCache,
}

impl Orchestrator {
    pub fn new(invoker: Invoker, cache: ResultCache) -> Self {
        Self { invoker, cache }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Run one invocation for untyped caller input. Never fails: every path
    /// ends in a tagged `Outcome`.
    pub async fn run<F: Feature>(&self, raw: &Value) -> Outcome<F::Response> {
        let key = F::KIND.storage_key();
        debug!(feature = key, from = ?Phase::Idle, to = ?Phase::Validating, "pipeline");

        let normalized = match schema::validate(raw, &F::input_shape()) {
            Ok(v) => v,
            Err(errors) => {
                info!(feature = key, %errors, "request rejected");
                return Outcome::Rejected { message: F::INVALID.to_string(), errors };
            }
        };
        let req: F::Request = match serde_json::from_value(normalized) {
            Ok(r) => r,
            Err(e) => {
                let mut errors = FieldErrors::new();
                errors.push("_root", e.to_string());
                info!(feature = key, %errors, "request rejected");
                return Outcome::Rejected { message: F::INVALID.to_string(), errors };
            }
        };

        debug!(feature = key, from = ?Phase::Validating, to = ?Phase::Invoking, "pipeline");
        match self.invoker.invoke::<F>(&req).await {
            Ok(resp) => {
                if let Err(e) = self.cache.put(F::KIND, &resp) {
                    warn!(feature = key, error = %e, "failed to cache fresh result");
                }
                info!(feature = key, "generation succeeded");
                Outcome::Fresh(resp)
            }
            Err(cause) => {
                warn!(feature = key, kind = ?cause.kind(), error = %cause, "generation failed; falling back");
                self.fall_back::<F>(cause)
            }
        }
    }

    /// Typed entry point; the request still goes through validation.
    pub async fn run_request<F: Feature>(&self, req: &F::Request) -> Outcome<F::Response> {
        match serde_json::to_value(req) {
            Ok(raw) => self.run::<F>(&raw).await,
            Err(e) => Outcome::Failed(format!("Failed to encode request: {e}")),
        }
    }

    fn fall_back<F: Feature>(&self, cause: ServiceError) -> Outcome<F::Response> {
        let key = F::KIND.storage_key();
        match self.cache.get::<F::Response>(F::KIND) {
            Ok(Some(entry)) => {
                info!(feature = key, written_at = %entry.written_at, "serving cached result");
                Outcome::Fallback { data: entry.data, written_at: entry.written_at, cause }
            }
            Ok(None) => {
                info!(feature = key, "no cached result");
                Outcome::Failed(format!("Failed to get {}: {}", F::KIND.label(), cause))
            }
            Err(e) => {
                warn!(feature = key, error = %e, "cached result unreadable");
                Outcome::Failed(format!("Failed to get {}: {}", F::KIND.label(), cause))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{OptimizeYield, RecommendCrop, RecommendFertilizer};
    use crate::provider::scripted::Scripted;
    use crate::store::MemoryStore;
    use crate::wire::{CropRecommendation, FeatureKind, OptimizeYieldResponse};
    use serde_json::json;
    use std::sync::Arc;

    fn pipeline(backend: Arc<Scripted>) -> (Orchestrator, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let orch = Orchestrator::new(Invoker::new(backend), ResultCache::new(store.clone()));
        (orch, store)
    }

    fn lettuce_advice() -> serde_json::Value {
        json!({
            "temperatureAdjustment": "Lower by 2°C",
            "humidityAdjustment": "Increase by 5%",
            "lightLevelAdjustment": "No change",
            "summary": "Lettuce prefers cooler, slightly humid conditions."
        })
    }

    fn basil() -> CropRecommendation {
        CropRecommendation {
            crop_name: "Basil".into(),
            reason: "...".into(),
            predicted_farm_type: "Hydroponics".into(),
        }
    }

    #[tokio::test]
    async fn fresh_result_is_returned_and_cached() {
        let backend = Arc::new(Scripted::new().reply(lettuce_advice()));
        let (orch, _) = pipeline(backend.clone());

        let out = orch
            .run::<OptimizeYield>(&json!({
                "cropType": "Lettuce", "temperature": 22, "humidity": 65, "lightLevel": 8000
            }))
            .await;

        let expected: OptimizeYieldResponse = serde_json::from_value(lettuce_advice()).unwrap();
        assert_eq!(out, Outcome::Fresh(expected.clone()));
        let cached = orch.cache().get::<OptimizeYieldResponse>(FeatureKind::Optimization).unwrap().unwrap();
        assert_eq!(cached.data, expected);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn failure_serves_preseeded_entry() {
        let backend = Arc::new(Scripted::new().fail(ServiceError::Unavailable("down".into())));
        let (orch, _) = pipeline(backend);
        orch.cache().put(FeatureKind::CropRecommendation, &basil()).unwrap();

        let out = orch
            .run::<RecommendCrop>(&json!({
                "city": "Pune", "state": "Maharashtra", "excludeCrops": ["Spinach"]
            }))
            .await;

        assert!(out.is_stale());
        assert_eq!(out.phase(), Phase::FallingBack);
        assert_eq!(out.into_data(), Some(basil()));
    }

    #[tokio::test]
    async fn failure_without_cache_is_failed() {
        let backend = Arc::new(Scripted::new().fail(ServiceError::Timeout("60s".into())));
        let (orch, _) = pipeline(backend);

        let out = orch.run::<RecommendCrop>(&json!({ "city": "Pune", "state": "Maharashtra" })).await;
        match out {
            Outcome::Failed(msg) => {
                assert!(msg.starts_with("Failed to get crop recommendation:"));
                assert!(msg.contains("timed out"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn second_success_overwrites_first() {
        let mint = json!({ "cropName": "Mint", "reason": "r", "predictedFarmType": "Aeroponics" });
        let backend = Arc::new(Scripted::new().reply(serde_json::to_value(basil()).unwrap()).reply(mint));
        let (orch, _) = pipeline(backend);
        let req = json!({ "city": "Pune", "state": "Maharashtra" });

        orch.run::<RecommendCrop>(&req).await;
        orch.run::<RecommendCrop>(&req).await;

        let entry = orch.cache().get::<CropRecommendation>(FeatureKind::CropRecommendation).unwrap().unwrap();
        assert_eq!(entry.data.crop_name, "Mint");
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_backend_or_cache() {
        let backend = Arc::new(Scripted::new());
        let (orch, store) = pipeline(backend.clone());

        let out = orch
            .run::<RecommendFertilizer>(&json!({
                "temperature": 25, "humidity": 60, "moisture": 150, "soilType": "Loamy",
                "cropType": "Maize", "nitrogen": 40, "phosphorous": 20, "potassium": 30
            }))
            .await;

        match &out {
            Outcome::Rejected { message, errors } => {
                assert_eq!(message, "Invalid input.");
                assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["moisture"]);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(backend.calls(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn rejection_ignores_existing_cache() {
        let backend = Arc::new(Scripted::new());
        let (orch, _) = pipeline(backend);
        orch.cache().put(FeatureKind::Optimization, &lettuce_advice()).unwrap();

        let out = orch
            .run::<OptimizeYield>(&json!({
                "cropType": "Lettuce", "temperature": 22, "humidity": 150, "lightLevel": 8000
            }))
            .await;
        assert_eq!(out.phase(), Phase::Rejected);
        assert!(out.data().is_none());
    }

    #[tokio::test]
    async fn form_strings_are_coerced() {
        let backend = Arc::new(Scripted::new().reply(lettuce_advice()));
        let (orch, _) = pipeline(backend.clone());
        let out = orch
            .run::<OptimizeYield>(&json!({
                "cropType": "Lettuce", "temperature": "22.5", "humidity": "65", "lightLevel": "8000"
            }))
            .await;
        assert_eq!(out.phase(), Phase::Succeeded);
        assert!(backend.prompts()[0].contains("Current Temperature: 22.5°C"));
    }

    #[tokio::test]
    async fn unreadable_cache_entry_counts_as_absent() {
        let backend = Arc::new(Scripted::new().fail(ServiceError::Unavailable("down".into())));
        let (orch, _) = pipeline(backend);
        orch.cache().put(FeatureKind::Optimization, &json!({ "legacy": true })).unwrap();

        let out = orch
            .run::<OptimizeYield>(&json!({
                "cropType": "Lettuce", "temperature": 22, "humidity": 65, "lightLevel": 8000
            }))
            .await;
        assert_eq!(out.phase(), Phase::Failed);
    }

    #[test]
    fn reply_envelope_marks_stale_data() {
        let out = Outcome::Fallback {
            data: basil(),
            written_at: Utc::now(),
            cause: ServiceError::Unavailable("down".into()),
        };
        let v = serde_json::to_value(out.into_reply()).unwrap();
        assert_eq!(v["stale"], json!(true));
        assert_eq!(v["data"]["cropName"], json!("Basil"));
        assert!(v.get("error").is_none());
    }

    #[tokio::test]
    async fn rejected_reply_carries_field_errors() {
        let backend = Arc::new(Scripted::new());
        let (orch, _) = pipeline(backend);
        let out = orch
            .run::<OptimizeYield>(&json!({
                "cropType": "Lettuce", "temperature": 22, "humidity": 150, "lightLevel": 8000
            }))
            .await;

        let v = serde_json::to_value(out.into_reply()).unwrap();
        assert_eq!(v["error"], json!("Invalid input."));
        assert_eq!(v["stale"], json!(false));
        assert!(v.get("data").is_none());
        assert!(v["fieldErrors"]["humidity"].is_array());
    }

    #[test]
    fn failed_reply_has_no_data() {
        let out: Outcome<CropRecommendation> =
            Outcome::Failed("Failed to get crop recommendation: down".into());
        let v = serde_json::to_value(out.into_reply()).unwrap();
        assert!(v.get("data").is_none());
        assert!(v.get("fieldErrors").is_none());
        assert_eq!(v["error"], json!("Failed to get crop recommendation: down"));
        assert_eq!(v["stale"], json!(false));
    }
}
