//! Ingestion pipeline: blob source → extractor → chunker → vector index.

use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::IngestError;
use crate::models::{Config, DocumentChunk, IndexStats};
use crate::services::chunker::TextChunker;
use crate::services::extractor::Extractor;
use crate::services::vector_index::VectorIndex;
use crate::storage::BlobSource;

/// What one ingestion run did.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub files_downloaded: u64,
    pub files_extracted: u64,
    pub files_skipped: u64,
    pub chunks_created: u64,
    /// Collection stats after the run; `None` when the run ended early
    /// with nothing to write.
    pub collection: Option<IndexStats>,
}

/// Scratch directory with guaranteed best-effort removal.
///
/// Dropping the guard removes the directory on every exit path, including
/// early returns and panics. Removal failures are ignored; the scratch
/// space is not a critical resource.
struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    fn create(path: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Drives one ingestion run end to end.
///
/// Stages run strictly in sequence. A single file failing to download or
/// extract is skipped with a warning; an embedding or index failure aborts
/// the run, since a partially written batch must not be ignored silently.
pub struct IngestionPipeline<'a> {
    source: Box<dyn BlobSource>,
    extractor: Extractor,
    chunker: TextChunker,
    index: &'a VectorIndex,
    scratch_dir: PathBuf,
    verbose: bool,
}

impl<'a> IngestionPipeline<'a> {
    pub fn new(
        source: Box<dyn BlobSource>,
        index: &'a VectorIndex,
        config: &Config,
        verbose: bool,
    ) -> Self {
        Self {
            source,
            extractor: Extractor::new(),
            chunker: TextChunker::new(&config.indexing),
            index,
            scratch_dir: PathBuf::from(&config.indexing.scratch_dir),
            verbose,
        }
    }

    /// Run the full pipeline for all blobs under `prefix`.
    ///
    /// An empty listing is not a failure; the run reports zero work and
    /// leaves the collection untouched.
    pub async fn run(&self, prefix: &str) -> Result<IngestReport, IngestError> {
        let scratch = ScratchDir::create(&self.scratch_dir)?;
        let mut report = IngestReport::default();

        let downloaded = self.source.download_all(&scratch.path, prefix).await?;
        report.files_downloaded = downloaded.len() as u64;

        if downloaded.is_empty() {
            println!("No files found in storage. Check your configuration and prefix.");
            return Ok(report);
        }

        if self.verbose {
            eprintln!("Downloaded {} files", downloaded.len());
        }

        let pb = ProgressBar::new(downloaded.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap()
                .progress_chars("#>-"),
        );

        let mut chunks: Vec<DocumentChunk> = Vec::new();

        for path in &downloaded {
            pb.inc(1);

            if !self.extractor.supports(path) {
                pb.println(format!("Skipping unsupported file: {}", path.display()));
                report.files_skipped += 1;
                continue;
            }

            let documents = match self.extractor.extract(path) {
                Ok(docs) => docs,
                Err(e) => {
                    pb.println(format!("Warning: failed to extract {}: {e}", path.display()));
                    report.files_skipped += 1;
                    continue;
                }
            };

            let before = chunks.len();
            for document in &documents {
                chunks.extend(self.chunker.chunk(document, path));
            }

            report.files_extracted += 1;
            report.chunks_created += (chunks.len() - before) as u64;
        }

        pb.finish_and_clear();

        if chunks.is_empty() {
            println!("No text could be extracted from the downloaded files.");
            return Ok(report);
        }

        if self.verbose {
            eprintln!(
                "Created {} chunks from {} files",
                chunks.len(),
                report.files_extracted
            );
        }

        // From here on, failures abort: a half-written batch must surface.
        self.index.add_documents(&chunks).await?;

        let stats = self.index.stats().await?;
        report.collection = Some(stats);

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::models::ChunkMetadata;
    use crate::services::vector_store::MemoryBackend;
    use crate::services::EmbeddingProvider;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct StubEmbeddings;

    #[async_trait]
    impl EmbeddingProvider for StubEmbeddings {
        async fn embed(
            &self,
            texts: &[String],
        ) -> Result<Vec<Vec<f32>>, crate::error::EmbeddingError> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn dimension(&self) -> u64 {
            2
        }
    }

    /// Blob source that copies pre-seeded fixture files into the scratch
    /// directory.
    struct FixtureSource {
        files: Vec<(String, String)>,
    }

    #[async_trait]
    impl crate::storage::BlobSource for FixtureSource {
        async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
            Ok(self
                .files
                .iter()
                .map(|(name, _)| name.clone())
                .filter(|name| name.starts_with(prefix))
                .collect())
        }

        async fn download(
            &self,
            remote: &str,
            local: &std::path::Path,
        ) -> Result<PathBuf, StorageError> {
            let content = self
                .files
                .iter()
                .find(|(name, _)| name == remote)
                .map(|(_, content)| content.clone())
                .ok_or_else(|| StorageError::ServiceError("no such blob".to_string()))?;

            if let Some(parent) = local.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(local, content)?;
            Ok(local.to_path_buf())
        }
    }

    fn index() -> VectorIndex {
        VectorIndex::new(
            Arc::new(StubEmbeddings),
            Box::new(MemoryBackend::new("documents")),
        )
    }

    fn config_with_scratch(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.indexing.scratch_dir = dir.join("scratch").to_string_lossy().to_string();
        config
    }

    #[tokio::test]
    async fn test_empty_listing_is_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let idx = index();
        let config = config_with_scratch(tmp.path());
        let pipeline = IngestionPipeline::new(
            Box::new(FixtureSource { files: vec![] }),
            &idx,
            &config,
            false,
        );

        let report = pipeline.run("").await.unwrap();
        assert_eq!(report.files_downloaded, 0);
        assert!(report.collection.is_none());
        assert_eq!(idx.stats().await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_ingest_counts_chunks_and_preserves_filenames() {
        let tmp = tempfile::tempdir().unwrap();
        let idx = index();
        let config = config_with_scratch(tmp.path());
        let pipeline = IngestionPipeline::new(
            Box::new(FixtureSource {
                files: vec![
                    ("facts.txt".to_string(), "Paris is the capital of France.".to_string()),
                    ("notes.md".to_string(), "Rust has ownership.".to_string()),
                ],
            }),
            &idx,
            &config,
            false,
        );

        let report = pipeline.run("").await.unwrap();
        assert_eq!(report.files_downloaded, 2);
        assert_eq!(report.files_extracted, 2);
        assert_eq!(report.chunks_created, 2);
        assert_eq!(report.collection.as_ref().unwrap().count, 2);

        let hits = idx.query("capital of France", 5).await.unwrap();
        let filenames: Vec<&str> = hits.iter().map(|h| h.metadata.filename.as_str()).collect();
        assert!(filenames.contains(&"facts.txt"));
        assert!(filenames.contains(&"notes.md"));
    }

    #[tokio::test]
    async fn test_unsupported_files_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let idx = index();
        let config = config_with_scratch(tmp.path());
        let pipeline = IngestionPipeline::new(
            Box::new(FixtureSource {
                files: vec![
                    ("deck.pptx".to_string(), "binary".to_string()),
                    ("facts.txt".to_string(), "Paris is the capital of France.".to_string()),
                ],
            }),
            &idx,
            &config,
            false,
        );

        let report = pipeline.run("").await.unwrap();
        assert_eq!(report.files_skipped, 1);
        assert_eq!(report.files_extracted, 1);
        assert_eq!(idx.stats().await.unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_scratch_dir_removed_after_run() {
        let tmp = tempfile::tempdir().unwrap();
        let idx = index();
        let config = config_with_scratch(tmp.path());
        let scratch = PathBuf::from(&config.indexing.scratch_dir);

        let pipeline = IngestionPipeline::new(
            Box::new(FixtureSource {
                files: vec![("a.txt".to_string(), "some text content".to_string())],
            }),
            &idx,
            &config,
            false,
        );

        pipeline.run("").await.unwrap();
        assert!(!scratch.exists());
    }

    #[tokio::test]
    async fn test_prefix_filters_listing() {
        let tmp = tempfile::tempdir().unwrap();
        let idx = index();
        let config = config_with_scratch(tmp.path());
        let pipeline = IngestionPipeline::new(
            Box::new(FixtureSource {
                files: vec![
                    ("reports/q1.txt".to_string(), "First quarter report.".to_string()),
                    ("misc/other.txt".to_string(), "Unrelated notes.".to_string()),
                ],
            }),
            &idx,
            &config,
            false,
        );

        let report = pipeline.run("reports/").await.unwrap();
        assert_eq!(report.files_downloaded, 1);
        assert_eq!(idx.stats().await.unwrap().count, 1);
    }
}
