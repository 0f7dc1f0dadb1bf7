use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use crate::models::Config;
use crate::services::vector_store::create_backend;
use crate::services::{IngestionPipeline, OpenAiEmbeddings, VectorIndex};
use crate::storage::{create_blob_source, StorageKind};

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Storage provider to read from (s3, gcp or azure)
    #[arg(long, short = 's')]
    pub storage: StorageKind,

    /// Only ingest objects whose key starts with this prefix
    #[arg(long, short = 'p', default_value = "")]
    pub prefix: String,
}

pub async fn handle_ingest(args: IngestArgs, config: &Config, verbose: bool) -> Result<()> {
    let embeddings = Arc::new(OpenAiEmbeddings::new(&config.openai, &config.embedding));
    let backend =
        create_backend(&config.vector_store).context("failed to create vector store backend")?;
    let index = VectorIndex::new(embeddings, backend);

    let source = create_blob_source(args.storage, config)
        .with_context(|| format!("failed to configure {} storage", args.storage))?;

    println!(
        "Ingesting from {} (prefix: {:?})...",
        args.storage, args.prefix
    );

    let pipeline = IngestionPipeline::new(source, &index, config, verbose);
    let report = pipeline.run(&args.prefix).await?;

    println!(
        "Done: {} downloaded, {} extracted, {} skipped, {} chunks indexed",
        report.files_downloaded,
        report.files_extracted,
        report.files_skipped,
        report.chunks_created
    );

    if let Some(stats) = &report.collection {
        println!("Collection '{}' now has {} documents", stats.name, stats.count);
    }

    Ok(())
}
