mod answer;
mod config;
mod document;

pub use answer::{IndexStats, RagAnswer, RetrievedChunk, SourceRef};
pub use config::{
    AwsConfig, AzureConfig, Config, EmbeddingConfig, GcpConfig, IndexingConfig, LlmConfig,
    OpenAiConfig, VectorStoreConfig, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_COLLECTION,
    DEFAULT_EMBEDDING_DIMENSION, DEFAULT_EMBEDDING_MODEL, DEFAULT_LLM_MODEL, DEFAULT_QDRANT_URL,
    DEFAULT_SCRATCH_DIR,
};
pub use document::{ChunkMetadata, DocumentChunk, ExtractedDocument};
