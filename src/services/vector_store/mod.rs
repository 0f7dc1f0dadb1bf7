//! Vector store backends.
//!
//! [`VectorBackend`] abstracts the persistent similarity-search store so the
//! index wrapper can run against Qdrant in production and an in-process
//! memory store in tests. Backends persist records and answer k-nearest
//! queries; embedding happens a level up in
//! [`VectorIndex`](crate::services::VectorIndex).

mod memory;
mod qdrant;

pub use memory::MemoryBackend;
pub use qdrant::QdrantBackend;

use async_trait::async_trait;

use crate::error::VectorStoreError;
use crate::models::{ChunkMetadata, RetrievedChunk, VectorStoreConfig};

/// A single persisted (vector, text, metadata, id) tuple.
///
/// `id` must be unique within the collection and `embedding` must match the
/// collection's configured dimension.
#[derive(Debug, Clone)]
pub struct IndexedRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Persistent similarity-search store.
///
/// Collections are created lazily via `ensure_collection` and persist
/// across process restarts (memory backend excepted).
#[async_trait]
pub trait VectorBackend: Send + Sync {
    /// Create the collection with the given vector dimension if it does
    /// not exist yet.
    async fn ensure_collection(&self, dimension: u64) -> Result<(), VectorStoreError>;

    /// Number of records in the collection; zero if it does not exist.
    async fn count(&self) -> Result<u64, VectorStoreError>;

    /// Insert or overwrite records by id.
    async fn upsert(&self, records: Vec<IndexedRecord>) -> Result<(), VectorStoreError>;

    /// k-nearest-neighbor search by cosine distance, nearest first,
    /// at most `limit` results.
    async fn search(
        &self,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<RetrievedChunk>, VectorStoreError>;

    /// Drop the collection and everything in it.
    async fn delete_collection(&self) -> Result<(), VectorStoreError>;

    /// The collection name this backend operates on.
    fn collection(&self) -> &str;
}

/// Create the production backend from configuration.
pub fn create_backend(config: &VectorStoreConfig) -> Result<Box<dyn VectorBackend>, VectorStoreError> {
    let backend = QdrantBackend::new(config)?;
    Ok(Box::new(backend))
}
