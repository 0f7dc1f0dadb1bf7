use anyhow::Result;

use crate::models::Config;
use crate::services::vector_store::create_backend;

pub async fn handle_status(config: &Config, _verbose: bool) -> Result<()> {
    println!("Vector store:    {}", config.vector_store.url);
    println!("Collection:      {}", config.vector_store.collection);
    println!(
        "Embedding model: {} ({} dims)",
        config.embedding.model, config.embedding.dimension
    );
    println!("LLM model:       {}", config.llm.model);
    println!(
        "Chunking:        {} chars, {} overlap",
        config.indexing.chunk_size, config.indexing.chunk_overlap
    );

    match create_backend(&config.vector_store) {
        Ok(backend) => match backend.count().await {
            Ok(count) => println!("Documents:       {count}"),
            Err(e) => {
                eprintln!();
                eprintln!("Warning: could not reach the vector store: {e}");
                eprintln!("Check QDRANT_URL or start Qdrant with: docker compose up -d qdrant");
            }
        },
        Err(e) => {
            eprintln!();
            eprintln!("Warning: vector store configuration is invalid: {e}");
        }
    }

    Ok(())
}
