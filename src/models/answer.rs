//! Query-side models: retrieval hits, source references and answers.

use serde::{Deserialize, Serialize};

use super::document::ChunkMetadata;

/// One nearest-neighbor hit from the vector index.
///
/// `distance` is the backend's cosine distance; smaller is closer. Results
/// come back nearest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub metadata: ChunkMetadata,
    pub distance: f32,
}

/// Reference to an originating document, used for answer attribution.
///
/// Structural equality on both fields drives source deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub filename: String,
    pub source_path: String,
}

impl From<&ChunkMetadata> for SourceRef {
    fn from(metadata: &ChunkMetadata) -> Self {
        Self {
            filename: metadata.filename.clone(),
            source_path: metadata.source_path.clone(),
        }
    }
}

/// A complete answer to one question, request-scoped and never persisted.
///
/// `context` is the exact context string that was handed to the language
/// model, retained for auditability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagAnswer {
    pub query: String,
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub context: String,
}

/// Name and size of the active collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub name: String,
    pub count: u64,
}
