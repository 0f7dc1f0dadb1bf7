//! In-process vector store backend.
//!
//! Brute-force cosine search over a HashMap. Exists for tests and offline
//! experiments; nothing persists across process restarts.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{IndexedRecord, VectorBackend};
use crate::error::VectorStoreError;
use crate::models::RetrievedChunk;

pub struct MemoryBackend {
    collection: String,
    records: Mutex<HashMap<String, IndexedRecord>>,
}

impl MemoryBackend {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            records: Mutex::new(HashMap::new()),
        }
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorBackend for MemoryBackend {
    async fn ensure_collection(&self, _dimension: u64) -> Result<(), VectorStoreError> {
        Ok(())
    }

    async fn count(&self) -> Result<u64, VectorStoreError> {
        Ok(self.records.lock().expect("lock poisoned").len() as u64)
    }

    async fn upsert(&self, records: Vec<IndexedRecord>) -> Result<(), VectorStoreError> {
        let mut store = self.records.lock().expect("lock poisoned");
        for record in records {
            store.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn search(
        &self,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<RetrievedChunk>, VectorStoreError> {
        let store = self.records.lock().expect("lock poisoned");

        let mut scored: Vec<RetrievedChunk> = store
            .values()
            .map(|record| RetrievedChunk {
                text: record.text.clone(),
                metadata: record.metadata.clone(),
                distance: cosine_distance(&vector, &record.embedding),
            })
            .collect();

        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(limit as usize);
        Ok(scored)
    }

    async fn delete_collection(&self) -> Result<(), VectorStoreError> {
        self.records.lock().expect("lock poisoned").clear();
        Ok(())
    }

    fn collection(&self) -> &str {
        &self.collection
    }
}
