//! src/storage/memory.rs
use crate::storage::{ObjectStore, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type Objects = HashMap<(String, String), Vec<u8>>;

/// Process-local object store, used by tests and the `memory` backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    objects: Arc<RwLock<Objects>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys stored in `bucket`, sorted.
    pub async fn list(&self, bucket: &str) -> Vec<String> {
        let objects = self.objects.read().await;
        let mut keys: Vec<String> = objects
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, key)| key.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait::async_trait]
impl ObjectStore for InMemoryStorage {
    #[tracing::instrument(name = "Get object (memory)", skip(self))]
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let objects = self.objects.read().await;
        objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    #[tracing::instrument(name = "Put object (memory)", skip(self, data), fields(size = data.len()))]
    async fn put(&self, bucket: &str, key: &str, data: &[u8]) -> Result<(), StoreError> {
        let mut objects = self.objects.write().await;
        objects.insert((bucket.to_string(), key.to_string()), data.to_vec());
        Ok(())
    }
}
