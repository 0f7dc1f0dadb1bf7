//! Document and chunk models for the ingestion pipeline.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Metadata attached to every chunk derived from a source document.
///
/// `source_path` and `filename` are injected by the pipeline; whatever the
/// extractor reported (page numbers, titles, ...) survives in `extra`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Path of the originating file as downloaded.
    pub source_path: String,

    /// Base name of the originating file.
    pub filename: String,

    /// Extractor-provided fields, copied verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl ChunkMetadata {
    /// Build metadata for a local file path, merging extractor fields.
    pub fn for_path(path: &Path, extra: BTreeMap<String, String>) -> Self {
        Self {
            source_path: path.to_string_lossy().to_string(),
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            extra,
        }
    }
}

/// A (text, metadata) record produced by the extractor, before chunking.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub text: String,
    pub metadata: BTreeMap<String, String>,
}

/// A bounded segment of extracted text, ready for embedding.
///
/// Chunks are immutable once created and live only for the duration of one
/// ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    pub fn new(text: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }

    /// Derive the stable point id for this chunk at position `ordinal`
    /// within one `add_documents` call.
    ///
    /// The id is a v5 UUID over the source path, the ordinal and a hash of
    /// the chunk text, so re-ingesting unchanged content overwrites the
    /// same points instead of duplicating them. Stale points from shrunk
    /// documents are not removed; clear the collection first if that
    /// matters.
    pub fn point_id(&self, ordinal: usize) -> String {
        use sha2::{Digest, Sha256};
        use uuid::Uuid;

        let path_hash = Sha256::digest(self.metadata.source_path.as_bytes());
        let text_hash = Sha256::digest(self.text.as_bytes());
        let name = format!(
            "{}:{}:{}",
            hex::encode(&path_hash[..16]),
            ordinal,
            hex::encode(&text_hash[..16])
        );
        Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
    }
}
