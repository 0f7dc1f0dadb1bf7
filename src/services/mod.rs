mod chunker;
mod completion;
mod embedding;
mod extractor;
mod ingest;
mod query;
mod vector_index;
pub mod vector_store;

pub use chunker::TextChunker;
pub use completion::{CompletionProvider, OpenAiCompletions};
pub use embedding::{EmbeddingProvider, OpenAiEmbeddings};
pub use extractor::Extractor;
pub use ingest::{IngestReport, IngestionPipeline};
pub use query::{QueryEngine, NO_RESULTS_ANSWER, SYSTEM_INSTRUCTION};
pub use vector_index::VectorIndex;
