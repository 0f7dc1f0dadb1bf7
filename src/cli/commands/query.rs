use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use crate::models::Config;
use crate::services::vector_store::create_backend;
use crate::services::{OpenAiCompletions, OpenAiEmbeddings, QueryEngine, VectorIndex};

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// The question to answer
    pub query: String,

    /// Number of chunks to retrieve as context
    #[arg(long, short = 'k', default_value_t = 5)]
    pub top_k: u64,

    /// Print the retrieved context along with the answer
    #[arg(long)]
    pub show_context: bool,
}

pub async fn handle_query(args: QueryArgs, config: &Config, verbose: bool) -> Result<()> {
    let embeddings = Arc::new(OpenAiEmbeddings::new(&config.openai, &config.embedding));
    let backend =
        create_backend(&config.vector_store).context("failed to create vector store backend")?;
    let index = VectorIndex::new(embeddings, backend);

    let completions = Arc::new(OpenAiCompletions::new(&config.openai, &config.llm));
    let engine = QueryEngine::new(&index, completions, config.llm.temperature);

    if verbose {
        eprintln!("Retrieving {} chunks for query", args.top_k);
    }

    let answer = engine.answer(&args.query, args.top_k).await?;

    let line = "=".repeat(80);
    println!("{line}");
    println!("QUESTION: {}", answer.query);
    println!("{line}");

    if args.show_context && !answer.context.is_empty() {
        println!("CONTEXT:");
        println!("{}", answer.context);
        println!("{line}");
    }

    println!("ANSWER:");
    println!("{}", answer.answer);

    if !answer.sources.is_empty() {
        println!();
        println!("SOURCES:");
        for source in &answer.sources {
            println!("  - {}", source.filename);
        }
    }
    println!("{line}");

    Ok(())
}
