//! The vector index: embedding + persistent similarity search behind one
//! contract.

use std::sync::Arc;

use crate::error::VectorStoreError;
use crate::models::{DocumentChunk, IndexStats, RetrievedChunk};
use crate::services::embedding::EmbeddingProvider;
use crate::services::vector_store::{IndexedRecord, VectorBackend};

/// Wraps an embedding provider and a vector store backend.
///
/// `add_documents` embeds all chunk texts in a single provider call and
/// upserts them under stable ids; `query` embeds one query text and runs a
/// k-nearest-neighbor search. The collection is created lazily before the
/// first write or read.
pub struct VectorIndex {
    embeddings: Arc<dyn EmbeddingProvider>,
    backend: Box<dyn VectorBackend>,
}

impl VectorIndex {
    pub fn new(embeddings: Arc<dyn EmbeddingProvider>, backend: Box<dyn VectorBackend>) -> Self {
        Self {
            embeddings,
            backend,
        }
    }

    /// Embed and persist a batch of chunks.
    ///
    /// Ids are derived from each chunk's source path, its position in this
    /// call and its text, so ids never collide within a call and
    /// re-ingesting identical content overwrites in place. Re-ingesting
    /// *changed* content leaves the previous versions behind; callers that
    /// need a clean slate should `delete_collection` first.
    pub async fn add_documents(&self, chunks: &[DocumentChunk]) -> Result<(), VectorStoreError> {
        if chunks.is_empty() {
            return Ok(());
        }

        self.backend
            .ensure_collection(self.embeddings.dimension())
            .await?;

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embeddings.embed(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(VectorStoreError::UpsertError(format!(
                "embedding count mismatch: {} chunks, {} vectors",
                chunks.len(),
                embeddings.len()
            )));
        }

        let records: Vec<IndexedRecord> = chunks
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(ordinal, (chunk, embedding))| IndexedRecord {
                id: chunk.point_id(ordinal),
                embedding,
                text: chunk.text.clone(),
                metadata: chunk.metadata.clone(),
            })
            .collect();

        self.backend.upsert(records).await
    }

    /// Return up to `k` chunks nearest to the query text, nearest first.
    ///
    /// An empty collection yields an empty result, not an error.
    pub async fn query(&self, text: &str, k: u64) -> Result<Vec<RetrievedChunk>, VectorStoreError> {
        if self.backend.count().await? == 0 {
            return Ok(Vec::new());
        }

        let query_texts = vec![text.to_string()];
        let mut vectors = self.embeddings.embed(&query_texts).await?;
        let vector = vectors
            .pop()
            .ok_or_else(|| VectorStoreError::SearchError("empty query embedding".to_string()))?;

        self.backend.search(vector, k).await
    }

    /// Name and record count of the collection.
    pub async fn stats(&self) -> Result<IndexStats, VectorStoreError> {
        Ok(IndexStats {
            name: self.backend.collection().to_string(),
            count: self.backend.count().await?,
        })
    }

    /// Drop the collection entirely.
    pub async fn delete_collection(&self) -> Result<(), VectorStoreError> {
        self.backend.delete_collection().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EmbeddingError;
    use crate::models::ChunkMetadata;
    use crate::services::vector_store::MemoryBackend;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::path::Path;

    /// Deterministic embedder: maps a text to a small vector from byte sums.
    struct StubEmbeddings;

    #[async_trait]
    impl EmbeddingProvider for StubEmbeddings {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts
                .iter()
                .map(|t| {
                    let sum: u32 = t.bytes().map(u32::from).sum();
                    let len = t.len() as f32;
                    vec![(sum % 97) as f32 + 1.0, len + 1.0, (sum % 13) as f32 + 1.0]
                })
                .collect())
        }

        fn dimension(&self) -> u64 {
            3
        }
    }

    fn index() -> VectorIndex {
        VectorIndex::new(Arc::new(StubEmbeddings), Box::new(MemoryBackend::new("test")))
    }

    fn chunk(text: &str, path: &str) -> DocumentChunk {
        DocumentChunk::new(
            text,
            ChunkMetadata::for_path(Path::new(path), BTreeMap::new()),
        )
    }

    #[tokio::test]
    async fn test_add_documents_counts() {
        let idx = index();
        idx.add_documents(&[
            chunk("first chunk", "/data/a.txt"),
            chunk("second chunk", "/data/a.txt"),
            chunk("third chunk", "/data/b.txt"),
        ])
        .await
        .unwrap();

        let stats = idx.stats().await.unwrap();
        assert_eq!(stats.name, "test");
        assert_eq!(stats.count, 3);
    }

    #[tokio::test]
    async fn test_empty_add_is_noop() {
        let idx = index();
        idx.add_documents(&[]).await.unwrap();
        assert_eq!(idx.stats().await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_query_empty_collection() {
        let idx = index();
        let hits = idx.query("anything at all", 5).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_query_returns_at_most_k() {
        let idx = index();
        let chunks: Vec<DocumentChunk> = (0..10)
            .map(|i| chunk(&format!("chunk number {i}"), "/data/a.txt"))
            .collect();
        idx.add_documents(&chunks).await.unwrap();

        let hits = idx.query("totally unrelated nonsense", 5).await.unwrap();
        assert!(!hits.is_empty());
        assert!(hits.len() <= 5);
    }

    #[tokio::test]
    async fn test_reingesting_identical_content_overwrites() {
        let idx = index();
        let chunks = vec![chunk("stable content", "/data/a.txt")];
        idx.add_documents(&chunks).await.unwrap();
        idx.add_documents(&chunks).await.unwrap();
        assert_eq!(idx.stats().await.unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_delete_collection() {
        let idx = index();
        idx.add_documents(&[chunk("some text", "/data/a.txt")])
            .await
            .unwrap();
        idx.delete_collection().await.unwrap();
        assert_eq!(idx.stats().await.unwrap().count, 0);
    }
}
