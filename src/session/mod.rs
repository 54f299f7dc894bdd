use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::errors::StoreError;
use crate::feature::{CityClimateLookup, GenerateAlerts, RecommendCrop};
use crate::pipeline::{Orchestrator, Outcome};
use crate::sensors::{BaseClimate, DEFAULT_DESCRIPTION};
use crate::wire::{Alert, CropRecommendation, FeatureKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmLocation {
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClimateView {
    pub base: BaseClimate,
    pub description: String,
    /// True when the built-in default climate is shown.
    pub defaulted: bool,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub climate: ClimateView,
    pub recommendation: Outcome<CropRecommendation>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlertRefresh {
    Updated { alerts: Vec<Alert>, stale: bool },
    /// No crop context, fresh or cached; nothing to generate alerts for.
    Skipped,
    Failed(String),
}

/// Dashboard workflows for one farm.
pub struct FarmSession {
    orch: Orchestrator,
    location: FarmLocation,
    previous_crops: Vec<String>,
}

impl FarmSession {
    pub fn new(orch: Orchestrator, location: FarmLocation) -> Self {
        Self { orch, location, previous_crops: Vec::new() }
    }

    pub fn location(&self) -> &FarmLocation {
        &self.location
    }

    pub fn previous_crops(&self) -> &[String] {
        &self.previous_crops
    }

    /// Climate lookup and first crop recommendation, issued concurrently.
    pub async fn initialize(&mut self) -> Dashboard {
        let loc = json!({ "city": self.location.city, "state": self.location.state });
        let (climate, recommendation) = futures::join!(
            self.orch.run::<CityClimateLookup>(&loc),
            self.orch.run::<RecommendCrop>(&loc),
        );

        let climate = match climate.data() {
            Some(c) => ClimateView {
                base: BaseClimate::from(c),
                description: c.climate_description.clone(),
                defaulted: false,
            },
            None => {
                warn!(city = %self.location.city, "climate unavailable; using defaults");
                ClimateView {
                    base: BaseClimate::default(),
                    description: DEFAULT_DESCRIPTION.to_string(),
                    defaulted: true,
                }
            }
        };

        if let Some(rec) = recommendation.data() {
            self.previous_crops = vec![rec.crop_name.clone()];
        }

        Dashboard { climate, recommendation }
    }

    /// Ask for a crop not recommended before in this session.
    pub async fn next_recommendation(&mut self) -> Outcome<CropRecommendation> {
        let req = json!({
            "city": self.location.city,
            "state": self.location.state,
            "excludeCrops": self.previous_crops,
        });
        let out = self.orch.run::<RecommendCrop>(&req).await;
        if let Outcome::Fresh(rec) = &out {
            if !self.previous_crops.contains(&rec.crop_name) {
                self.previous_crops.push(rec.crop_name.clone());
            }
        }
        out
    }

    /// Store a user-edited recommendation as the last good result.
    pub fn save_recommendation(&self, rec: &CropRecommendation) -> Result<(), StoreError> {
        self.orch.cache().put(FeatureKind::CropRecommendation, rec)?;
        info!(crop = %rec.crop_name, "custom recommendation saved");
        Ok(())
    }

    /// Crop context first, then alerts for that crop and farm type.
    pub async fn refresh_alerts(&self) -> AlertRefresh {
        let loc = json!({ "city": self.location.city, "state": self.location.state });
        let crop = match self.orch.run::<RecommendCrop>(&loc).await.into_data() {
            Some(c) => c,
            None => {
                info!("no crop context; skipping alert refresh");
                return AlertRefresh::Skipped;
            }
        };

        let req = json!({
            "city": self.location.city,
            "state": self.location.state,
            "cropName": crop.crop_name,
            "farmType": crop.predicted_farm_type,
        });
        let out = self.orch.run::<GenerateAlerts>(&req).await;
        let stale = out.is_stale();
        match out {
            Outcome::Fresh(batch) | Outcome::Fallback { data: batch, .. } => {
                AlertRefresh::Updated { alerts: batch.alerts, stale }
            }
            Outcome::Rejected { message, errors } => AlertRefresh::Failed(format!("{message} {errors}")),
            Outcome::Failed(msg) => AlertRefresh::Failed(msg),
        }
    }

    /// Forget every cached feature result and the session's crop history.
    pub fn factory_reset(&mut self) -> Result<(), StoreError> {
        self.orch.cache().clear_features()?;
        self.previous_crops.clear();
        info!("factory reset complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ServiceError;
    use crate::invoker::Invoker;
    use crate::provider::scripted::Scripted;
    use crate::store::ResultCache;
    use serde_json::Value;
    use std::sync::Arc;

    fn session(backend: Arc<Scripted>) -> FarmSession {
        let orch = Orchestrator::new(Invoker::new(backend), ResultCache::in_memory());
        FarmSession::new(orch, FarmLocation { city: "Pune".into(), state: "Maharashtra".into() })
    }

    fn crop(name: &str) -> Value {
        json!({ "cropName": name, "reason": "r", "predictedFarmType": "Hydroponics" })
    }

    fn alerts(n: usize) -> Value {
        let list: Vec<Value> = (0..n)
            .map(|i| json!({
                "id": format!("alert-{i:03}"), "severity": "Info", "type": "Light",
                "component": "Tower 4", "message": "LED lights dim", "timestamp": "1h ago",
                "status": "Active", "suggestion": "Inspect the driver."
            }))
            .collect();
        json!({ "alerts": list })
    }

    #[tokio::test]
    async fn initialize_defaults_climate_on_failure() {
        let backend = Arc::new(
            Scripted::new()
                .fail(ServiceError::Unavailable("down".into()))
                .fail(ServiceError::Unavailable("down".into())),
        );
        let mut s = session(backend);
        let d = s.initialize().await;
        assert!(d.climate.defaulted);
        assert_eq!(d.climate.base, BaseClimate::default());
        assert_eq!(d.climate.description, "Default temperate climate.");
        assert!(matches!(d.recommendation, Outcome::Failed(_)));
        assert!(s.previous_crops().is_empty());
    }

    #[tokio::test]
    async fn next_recommendation_excludes_seen_crops() {
        let backend = Arc::new(Scripted::new().reply(crop("Basil")).reply(crop("Saffron")));
        let mut s = session(backend.clone());

        s.next_recommendation().await;
        let out = s.next_recommendation().await;
        assert_eq!(out.data().unwrap().crop_name, "Saffron");
        assert_eq!(s.previous_crops(), ["Basil", "Saffron"]);
        assert!(backend.prompts()[1].contains("following crops: Basil."));
    }

    #[tokio::test]
    async fn alerts_chain_on_cached_crop_context() {
        let backend = Arc::new(
            Scripted::new()
                .fail(ServiceError::Unavailable("down".into()))
                .reply(alerts(6)),
        );
        let s = session(backend.clone());
        s.save_recommendation(&serde_json::from_value(crop("Microgreens")).unwrap())
            .unwrap();

        match s.refresh_alerts().await {
            AlertRefresh::Updated { alerts, stale } => {
                assert_eq!(alerts.len(), 6);
                assert!(!stale);
            }
            other => panic!("expected alerts, got {other:?}"),
        }
        assert!(backend.prompts()[1].contains("Primary Crop: 'Microgreens'"));
    }

    #[tokio::test]
    async fn alerts_skip_without_crop_context() {
        let backend = Arc::new(Scripted::new().fail(ServiceError::Timeout("slow".into())));
        let s = session(backend.clone());
        assert_eq!(s.refresh_alerts().await, AlertRefresh::Skipped);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn factory_reset_clears_cache_and_history() {
        let backend = Arc::new(Scripted::new().reply(crop("Basil")));
        let mut s = session(backend);
        s.next_recommendation().await;
        s.factory_reset().unwrap();
        assert!(s.previous_crops().is_empty());
        assert!(s.orch.cache().get_raw(FeatureKind::CropRecommendation).unwrap().is_none());
    }

    #[tokio::test]
    async fn fallback_recommendation_is_not_added_to_history() {
        let backend = Arc::new(Scripted::new().fail(ServiceError::Unavailable("down".into())));
        let mut s = session(backend);
        s.save_recommendation(&serde_json::from_value(crop("Mint")).unwrap())
            .unwrap();

        let out = s.next_recommendation().await;
        assert!(out.is_stale());
        assert_eq!(out.data().unwrap().crop_name, "Mint");
        assert!(s.previous_crops().is_empty());
    }

    #[tokio::test]
    async fn alerts_from_cache_are_marked_stale() {
        let backend = Arc::new(
            Scripted::new()
                .reply(crop("Basil"))
                .fail(ServiceError::Timeout("slow".into())),
        );
        let s = session(backend);
        s.orch.cache().put(FeatureKind::Alerts, &alerts(5)).unwrap();

        match s.refresh_alerts().await {
            AlertRefresh::Updated { alerts, stale } => {
                assert_eq!(alerts.len(), 5);
                assert!(stale);
            }
            other => panic!("expected cached alerts, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn alerts_fail_without_fresh_or_cached_batch() {
        let backend = Arc::new(
            Scripted::new()
                .reply(crop("Basil"))
                .fail(ServiceError::Unavailable("down".into())),
        );
        let s = session(backend);

        match s.refresh_alerts().await {
            AlertRefresh::Failed(msg) => assert!(msg.starts_with("Failed to get generated alerts")),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
