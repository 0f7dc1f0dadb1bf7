//! CLI definitions for the document RAG tool.

pub mod commands;

use clap::{Parser, Subcommand};

/// Question answering over documents in cloud object storage.
#[derive(Debug, Parser)]
#[command(name = "docrag")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ingest documents from cloud storage into the vector index
    Ingest(commands::IngestArgs),

    /// Ask a question against the ingested documents
    Query(commands::QueryArgs),

    /// Show collection and configuration status
    Status,
}
