//! src/test_utils.rs
use crate::storage::{InMemoryStorage, ObjectStore, StoreError};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Wraps an [`InMemoryStorage`] and fails every `put` after the first
/// `successful_puts`.
#[derive(Debug)]
pub struct FlakyStorage {
    inner: InMemoryStorage,
    successful_puts: usize,
    puts: AtomicUsize,
}

impl FlakyStorage {
    pub fn failing_after(inner: InMemoryStorage, successful_puts: usize) -> Self {
        Self {
            inner,
            successful_puts,
            puts: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for FlakyStorage {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        self.inner.get(bucket, key).await
    }

    async fn put(&self, bucket: &str, key: &str, data: &[u8]) -> Result<(), StoreError> {
        if self.puts.fetch_add(1, Ordering::SeqCst) >= self.successful_puts {
            return Err(anyhow::anyhow!("Injected put failure for {bucket}/{key}").into());
        }
        self.inner.put(bucket, key, data).await
    }
}
