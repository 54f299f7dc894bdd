use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::KvStore;
use crate::errors::StoreError;

#[derive(Default)]
pub struct MemoryStore {
    map: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        Ok(self.map.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        self.map.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.map.write().remove(key);
        Ok(())
    }
}
