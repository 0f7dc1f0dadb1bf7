//! Retrieval-augmented question answering over documents in cloud object
//! storage.
//!
//! Documents are pulled from S3, GCS or Azure Blob Storage, split into
//! overlapping character chunks, embedded via an OpenAI-compatible API and
//! indexed in Qdrant. Queries retrieve the nearest chunks and ground a chat
//! completion on them, returning the answer with its deduplicated sources.

pub mod cli;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::AppError;
pub use models::Config;
