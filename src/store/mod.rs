use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::errors::StoreError;
use crate::wire::FeatureKind;

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Durable key/value surface. Writes overwrite; there is no merge, TTL or
/// ordering between writers.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError>;
    fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Envelope stored under a feature key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub feature: FeatureKind,
    pub written_at: DateTime<Utc>,
    pub data: T,
}

/// Last successful result per feature, encoded as JSON.
#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn KvStore>,
}

impl ResultCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn put<T: Serialize>(&self, kind: FeatureKind, data: &T) -> Result<DateTime<Utc>, StoreError> {
        let written_at = Utc::now();
        let entry = CacheEntry { feature: kind, written_at, data };
        let bytes = serde_json::to_vec(&entry)?;
        debug!(key = kind.storage_key(), bytes = bytes.len(), "cache put");
        self.store.put(kind.storage_key(), Bytes::from(bytes))?;
        Ok(written_at)
    }

    /// Stored bytes exactly as written, whatever schema they were written with.
    pub fn get_raw(&self, kind: FeatureKind) -> Result<Option<Bytes>, StoreError> {
        self.store.get(kind.storage_key())
    }

    /// Decode the entry for `kind`. An entry written with an incompatible
    /// shape yields `StoreError::Codec`.
    pub fn get<T: DeserializeOwned>(&self, kind: FeatureKind) -> Result<Option<CacheEntry<T>>, StoreError> {
        match self.get_raw(kind)? {
            None => Ok(None),
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        }
    }

    /// Drop every feature result (factory reset).
    pub fn clear_features(&self) -> Result<(), StoreError> {
        for kind in FeatureKind::ALL {
            self.store.remove(kind.storage_key())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{CropRecommendation, OptimizeYieldResponse};

    fn basil() -> CropRecommendation {
        CropRecommendation {
            crop_name: "Basil".into(),
            reason: "High demand in Pune restaurants.".into(),
            predicted_farm_type: "Hydroponics".into(),
        }
    }

    #[test]
    fn get_on_empty_is_absent() {
        let cache = ResultCache::in_memory();
        let got: Option<CacheEntry<CropRecommendation>> =
            cache.get(FeatureKind::CropRecommendation).unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn repeated_reads_are_identical() {
        let cache = ResultCache::in_memory();
        cache.put(FeatureKind::CropRecommendation, &basil()).unwrap();
        let a = cache.get_raw(FeatureKind::CropRecommendation).unwrap();
        let b = cache.get_raw(FeatureKind::CropRecommendation).unwrap();
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn put_overwrites_previous_entry() {
        let cache = ResultCache::in_memory();
        cache.put(FeatureKind::CropRecommendation, &basil()).unwrap();
        let mint = CropRecommendation { crop_name: "Mint".into(), ..basil() };
        cache.put(FeatureKind::CropRecommendation, &mint).unwrap();
        let entry: CacheEntry<CropRecommendation> =
            cache.get(FeatureKind::CropRecommendation).unwrap().unwrap();
        assert_eq!(entry.data, mint);
        assert_eq!(entry.feature, FeatureKind::CropRecommendation);
    }

    #[test]
    fn incompatible_entry_is_read_verbatim_but_fails_decode() {
        let store = Arc::new(MemoryStore::new());
        let legacy = br#"{"cropName":"Basil"}"#;
        store.put("optimization", Bytes::from_static(legacy)).unwrap();
        let cache = ResultCache::new(store);

        assert_eq!(cache.get_raw(FeatureKind::Optimization).unwrap().unwrap(), &legacy[..]);
        let err = cache.get::<OptimizeYieldResponse>(FeatureKind::Optimization).unwrap_err();
        assert!(matches!(err, StoreError::Codec(_)));
    }

    #[test]
    fn clear_features_removes_every_key() {
        let store = Arc::new(MemoryStore::new());
        store.put("farm_address", Bytes::from_static(b"{}")).unwrap();
        let cache = ResultCache::new(store.clone());
        cache.put(FeatureKind::CropRecommendation, &basil()).unwrap();
        cache.put(FeatureKind::Alerts, &serde_json::json!({ "alerts": [] })).unwrap();

        cache.clear_features().unwrap();
        for kind in FeatureKind::ALL {
            assert!(cache.get_raw(kind).unwrap().is_none());
        }
        assert!(store.get("farm_address").unwrap().is_some());
    }
}
