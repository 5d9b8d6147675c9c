//! src/storage/mod.rs
use crate::error::error_chain_fmt;

mod memory;
mod s3;

pub use memory::InMemoryStorage;
pub use s3::S3Storage;

/// Blob store addressed by `(bucket, key)`.
///
/// Implementations provide atomic per-key reads and writes with last write
/// wins semantics. Nothing spanning more than one key is transactional.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;

    async fn put(&self, bucket: &str, key: &str, data: &[u8]) -> Result<(), StoreError>;
}

#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("Object {bucket}/{key} not found")]
    NotFound { bucket: String, key: String },
    #[error(transparent)]
    Failure(#[from] anyhow::Error),
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(f, self)
    }
}
