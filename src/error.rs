//! Error types for the document RAG CLI.

use thiserror::Error;

/// Errors from blob storage listing and downloading.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("storage service error: {0}")]
    ServiceError(String),

    #[error("invalid storage listing: {0}")]
    InvalidListing(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("storage not configured: {0}")]
    NotConfigured(String),
}

/// Errors from text extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to extract text from {path}: {reason}")]
    ExtractionFailed { path: String, reason: String },
}

/// Errors from the embedding provider.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("embedding provider error: {0}")]
    ProviderError(String),

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
}

/// Errors from the completion provider.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("completion provider error: {0}")]
    ProviderError(String),

    #[error("invalid completion response: {0}")]
    InvalidResponse(String),
}

/// Errors from the vector store backend.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("failed to connect to vector store: {0}")]
    ConnectionError(String),

    #[error("collection error: {0}")]
    CollectionError(String),

    #[error("upsert error: {0}")]
    UpsertError(String),

    #[error("search error: {0}")]
    SearchError(String),

    #[error("delete error: {0}")]
    DeleteError(String),

    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),
}

/// Errors from the ingestion pipeline.
///
/// Per-file download and extraction failures are logged and skipped inside
/// the pipeline; only embedding and index failures surface here.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("vector store error: {0}")]
    VectorStoreError(#[from] VectorStoreError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors from answering a query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("vector store error: {0}")]
    VectorStoreError(#[from] VectorStoreError),

    #[error("completion error: {0}")]
    CompletionError(#[from] CompletionError),

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Application-level errors that wrap domain errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("query error: {0}")]
    Query(#[from] QueryError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("vector store error: {0}")]
    VectorStore(#[from] VectorStoreError),

    #[error("{0}")]
    Other(String),
}
