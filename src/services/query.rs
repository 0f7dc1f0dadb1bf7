//! Query engine: retrieval, context assembly, prompt construction and
//! source attribution.

use std::fmt::Write as FmtWrite;
use std::sync::Arc;

use crate::error::QueryError;
use crate::models::{RagAnswer, RetrievedChunk, SourceRef};
use crate::services::completion::CompletionProvider;
use crate::services::vector_index::VectorIndex;

/// System instruction sent with every completion call.
pub const SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant that answers questions based on provided context.";

/// Canned answer when retrieval comes back empty. No completion call is
/// made in that case.
pub const NO_RESULTS_ANSWER: &str = "No relevant documents found in the collection.";

/// Answers questions against the vector index.
pub struct QueryEngine<'a> {
    index: &'a VectorIndex,
    completions: Arc<dyn CompletionProvider>,
    temperature: f32,
}

impl<'a> QueryEngine<'a> {
    pub fn new(
        index: &'a VectorIndex,
        completions: Arc<dyn CompletionProvider>,
        temperature: f32,
    ) -> Self {
        Self {
            index,
            completions,
            temperature,
        }
    }

    /// Retrieve the `top_k` nearest chunks and generate a grounded answer.
    ///
    /// The returned answer carries the exact context string the model saw
    /// and a deduplicated, first-seen-ordered source list. A completion
    /// failure propagates; there is no retry.
    pub async fn answer(&self, query: &str, top_k: u64) -> Result<RagAnswer, QueryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QueryError::InvalidQuery("query cannot be empty".to_string()));
        }

        let hits = self.index.query(query, top_k).await?;

        if hits.is_empty() {
            return Ok(RagAnswer {
                query: query.to_string(),
                answer: NO_RESULTS_ANSWER.to_string(),
                sources: Vec::new(),
                context: String::new(),
            });
        }

        let context = build_context(&hits);
        let prompt = build_prompt(query, &context);

        let answer = self
            .completions
            .complete(SYSTEM_INSTRUCTION, &prompt, self.temperature)
            .await?;

        Ok(RagAnswer {
            query: query.to_string(),
            answer,
            sources: dedup_sources(&hits),
            context,
        })
    }
}

/// One numbered block per retrieved chunk, labeled with its source
/// filename, in the nearest-first order the index returned.
fn build_context(hits: &[RetrievedChunk]) -> String {
    let mut context = String::new();
    for (i, hit) in hits.iter().enumerate() {
        let filename = if hit.metadata.filename.is_empty() {
            "Unknown"
        } else {
            &hit.metadata.filename
        };
        writeln!(context, "[Document {} - {}]\n{}", i + 1, filename, hit.text).unwrap();
        context.push('\n');
    }
    context
}

fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "Answer the question using only the information from the context below.\n\
         \n\
         Context:\n\
         {context}\n\
         Question: {query}\n\
         \n\
         Instructions:\n\
         - Answer the question using only the information from the context above\n\
         - If the context doesn't contain enough information to answer the question, say so\n\
         - Be concise and accurate\n\
         - Cite the document number when referencing information\n\
         \n\
         Answer:"
    )
}

/// Deduplicate source references by structural equality, preserving
/// first-seen order.
fn dedup_sources(hits: &[RetrievedChunk]) -> Vec<SourceRef> {
    let mut sources: Vec<SourceRef> = Vec::new();
    for hit in hits {
        let source = SourceRef::from(&hit.metadata);
        if !sources.contains(&source) {
            sources.push(source);
        }
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CompletionError, EmbeddingError};
    use crate::models::ChunkMetadata;
    use crate::services::embedding::EmbeddingProvider;
    use crate::services::vector_store::MemoryBackend;
    use crate::services::VectorIndex;
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    struct StubEmbeddings;

    #[async_trait]
    impl EmbeddingProvider for StubEmbeddings {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn dimension(&self) -> u64 {
            2
        }
    }

    /// Echoes the prompt back so tests can assert on context contents.
    struct EchoCompletions;

    #[async_trait]
    impl CompletionProvider for EchoCompletions {
        async fn complete(
            &self,
            _system: &str,
            prompt: &str,
            _temperature: f32,
        ) -> Result<String, CompletionError> {
            Ok(prompt.to_string())
        }
    }

    /// Fails the test if the engine calls the model at all.
    struct PanickingCompletions;

    #[async_trait]
    impl CompletionProvider for PanickingCompletions {
        async fn complete(
            &self,
            _system: &str,
            _prompt: &str,
            _temperature: f32,
        ) -> Result<String, CompletionError> {
            panic!("completion must not be called for empty retrieval");
        }
    }

    fn hit(text: &str, filename: &str, distance: f32) -> RetrievedChunk {
        RetrievedChunk {
            text: text.to_string(),
            metadata: ChunkMetadata {
                source_path: format!("/data/{filename}"),
                filename: filename.to_string(),
                extra: BTreeMap::new(),
            },
            distance,
        }
    }

    fn empty_index() -> VectorIndex {
        VectorIndex::new(
            std::sync::Arc::new(StubEmbeddings),
            Box::new(MemoryBackend::new("documents")),
        )
    }

    #[tokio::test]
    async fn test_empty_collection_short_circuits() {
        let index = empty_index();
        let engine = QueryEngine::new(&index, Arc::new(PanickingCompletions), 0.7);

        let answer = engine.answer("what is anything?", 5).await.unwrap();
        assert_eq!(answer.answer, NO_RESULTS_ANSWER);
        assert!(answer.sources.is_empty());
        assert!(answer.context.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let index = empty_index();
        let engine = QueryEngine::new(&index, Arc::new(EchoCompletions), 0.7);
        assert!(engine.answer("   ", 5).await.is_err());
    }

    #[test]
    fn test_context_is_numbered_and_labeled() {
        let context = build_context(&[
            hit("First passage.", "a.pdf", 0.1),
            hit("Second passage.", "b.pdf", 0.2),
        ]);
        assert!(context.contains("[Document 1 - a.pdf]\nFirst passage."));
        assert!(context.contains("[Document 2 - b.pdf]\nSecond passage."));
        let pos_a = context.find("Document 1").unwrap();
        let pos_b = context.find("Document 2").unwrap();
        assert!(pos_a < pos_b);
    }

    #[test]
    fn test_context_unknown_filename() {
        let mut h = hit("text", "", 0.1);
        h.metadata.filename = String::new();
        let context = build_context(&[h]);
        assert!(context.contains("[Document 1 - Unknown]"));
    }

    #[test]
    fn test_prompt_embeds_context_and_question() {
        let prompt = build_prompt("What is the capital?", "CONTEXT-MARKER");
        assert!(prompt.contains("CONTEXT-MARKER"));
        assert!(prompt.contains("Question: What is the capital?"));
        assert!(prompt.contains("Cite the document number"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn test_source_dedup_preserves_first_seen_order() {
        let sources = dedup_sources(&[
            hit("x", "a.pdf", 0.1),
            hit("y", "b.pdf", 0.2),
            hit("z", "a.pdf", 0.3),
        ]);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].filename, "a.pdf");
        assert_eq!(sources[1].filename, "b.pdf");
    }

    #[tokio::test]
    async fn test_ingest_then_answer_end_to_end() {
        use crate::models::{ChunkMetadata, DocumentChunk};
        use std::path::Path;

        let index = empty_index();
        index
            .add_documents(&[DocumentChunk::new(
                "Paris is the capital of France.",
                ChunkMetadata::for_path(Path::new("scratch/facts.txt"), BTreeMap::new()),
            )])
            .await
            .unwrap();

        let engine = QueryEngine::new(&index, Arc::new(EchoCompletions), 0.7);
        let answer = engine.answer("What is the capital of France?", 5).await.unwrap();

        assert!(answer.answer.contains("Paris is the capital of France."));
        assert!(answer.context.contains("[Document 1 - facts.txt]"));
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].filename, "facts.txt");
    }

    #[test]
    fn test_same_filename_different_path_not_deduped() {
        let mut a = hit("x", "a.pdf", 0.1);
        a.metadata.source_path = "/x/a.pdf".to_string();
        let mut b = hit("y", "a.pdf", 0.2);
        b.metadata.source_path = "/y/a.pdf".to_string();
        assert_eq!(dedup_sources(&[a, b]).len(), 2);
    }
}
