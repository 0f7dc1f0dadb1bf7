//! Qdrant vector store backend.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use qdrant_client::Qdrant;

use super::{IndexedRecord, VectorBackend};
use crate::error::VectorStoreError;
use crate::models::{ChunkMetadata, RetrievedChunk, VectorStoreConfig};

/// Prefix under which extractor-provided metadata fields are stored in the
/// point payload, alongside the fixed `text` / `source_path` / `filename`
/// keys.
const EXTRA_PREFIX: &str = "meta_";

pub struct QdrantBackend {
    client: Qdrant,
    collection: String,
}

impl QdrantBackend {
    pub fn new(config: &VectorStoreConfig) -> Result<Self, VectorStoreError> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(ref api_key) = config.api_key {
            builder = builder.api_key(api_key.clone());
        }

        let client = builder
            .build()
            .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            collection: config.collection.clone(),
        })
    }

    async fn collection_exists(&self) -> Result<bool, VectorStoreError> {
        match self.client.collection_info(&self.collection).await {
            Ok(_) => Ok(true),
            Err(e) => {
                let msg = e.to_string();
                if msg.contains("not found") || msg.contains("doesn't exist") {
                    Ok(false)
                } else {
                    Err(VectorStoreError::CollectionError(msg))
                }
            }
        }
    }
}

fn string_value(value: &qdrant_client::qdrant::Value) -> Option<String> {
    match &value.kind {
        Some(qdrant_client::qdrant::value::Kind::StringValue(s)) => Some(s.clone()),
        _ => None,
    }
}

#[async_trait]
impl VectorBackend for QdrantBackend {
    async fn ensure_collection(&self, dimension: u64) -> Result<(), VectorStoreError> {
        if self.collection_exists().await? {
            return Ok(());
        }

        let create = CreateCollectionBuilder::new(&self.collection)
            .vectors_config(VectorParamsBuilder::new(dimension, Distance::Cosine));

        self.client
            .create_collection(create)
            .await
            .map_err(|e| VectorStoreError::CollectionError(e.to_string()))?;

        Ok(())
    }

    async fn count(&self) -> Result<u64, VectorStoreError> {
        match self.client.collection_info(&self.collection).await {
            Ok(info) => Ok(info.result.map_or(0, |r| r.points_count.unwrap_or(0))),
            Err(e) => {
                let msg = e.to_string();
                if msg.contains("not found") || msg.contains("doesn't exist") {
                    Ok(0)
                } else {
                    Err(VectorStoreError::CollectionError(msg))
                }
            }
        }
    }

    async fn upsert(&self, records: Vec<IndexedRecord>) -> Result<(), VectorStoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = records
            .into_iter()
            .map(|record| {
                let mut payload: HashMap<String, qdrant_client::qdrant::Value> = HashMap::new();
                payload.insert("text".to_string(), record.text.into());
                payload.insert(
                    "source_path".to_string(),
                    record.metadata.source_path.into(),
                );
                payload.insert("filename".to_string(), record.metadata.filename.into());
                for (key, value) in record.metadata.extra {
                    payload.insert(format!("{EXTRA_PREFIX}{key}"), value.into());
                }

                PointStruct::new(record.id, record.embedding, payload)
            })
            .collect();

        let upsert = UpsertPointsBuilder::new(&self.collection, points);

        self.client
            .upsert_points(upsert)
            .await
            .map_err(|e| VectorStoreError::UpsertError(e.to_string()))?;

        Ok(())
    }

    async fn search(
        &self,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<RetrievedChunk>, VectorStoreError> {
        let search =
            SearchPointsBuilder::new(&self.collection, vector, limit).with_payload(true);

        let results = self
            .client
            .search_points(search)
            .await
            .map_err(|e| VectorStoreError::SearchError(e.to_string()))?;

        let chunks = results
            .result
            .into_iter()
            .map(|point| {
                let payload = point.payload;

                let text = payload
                    .get("text")
                    .and_then(string_value)
                    .unwrap_or_default();
                let source_path = payload
                    .get("source_path")
                    .and_then(string_value)
                    .unwrap_or_default();
                let filename = payload
                    .get("filename")
                    .and_then(string_value)
                    .unwrap_or_default();

                let mut extra = BTreeMap::new();
                for (key, value) in &payload {
                    if let Some(stripped) = key.strip_prefix(EXTRA_PREFIX) {
                        if let Some(s) = string_value(value) {
                            extra.insert(stripped.to_string(), s);
                        }
                    }
                }

                RetrievedChunk {
                    text,
                    metadata: ChunkMetadata {
                        source_path,
                        filename,
                        extra,
                    },
                    // Qdrant reports cosine similarity; convert to a
                    // distance so smaller always means closer.
                    distance: 1.0 - point.score,
                }
            })
            .collect();

        Ok(chunks)
    }

    async fn delete_collection(&self) -> Result<(), VectorStoreError> {
        if !self.collection_exists().await? {
            return Ok(());
        }

        self.client
            .delete_collection(&self.collection)
            .await
            .map_err(|e| VectorStoreError::DeleteError(e.to_string()))?;

        Ok(())
    }

    fn collection(&self) -> &str {
        &self.collection
    }
}
