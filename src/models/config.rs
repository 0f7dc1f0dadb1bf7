//! Process configuration loaded from the environment.
//!
//! Every setting has a documented default and can be overridden per process.
//! The struct is built once at startup and passed by reference into each
//! component constructor; nothing reads the environment after that.

use std::env;

use crate::error::ConfigError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";
pub const DEFAULT_COLLECTION: &str = "documents";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_DIMENSION: u64 = 1536;
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
pub const DEFAULT_SCRATCH_DIR: &str = "./temp_downloads";

/// Immutable application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai: OpenAiConfig,
    pub aws: AwsConfig,
    pub gcp: GcpConfig,
    pub azure: AzureConfig,
    pub vector_store: VectorStoreConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub indexing: IndexingConfig,
}

/// Credentials and endpoint for the OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct AwsConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub bucket: String,
}

/// GCS access. The token is a short-lived OAuth bearer token; obtaining and
/// refreshing it is the caller's concern, not this tool's.
#[derive(Debug, Clone)]
pub struct GcpConfig {
    pub bucket: String,
    pub access_token: String,
}

/// Azure Blob access via a container-scoped SAS token.
#[derive(Debug, Clone)]
pub struct AzureConfig {
    pub storage_account: String,
    pub container: String,
    pub sas_token: String,
}

#[derive(Debug, Clone)]
pub struct VectorStoreConfig {
    pub url: String,
    pub collection: String,
    pub api_key: Option<String>,
}

/// Embedding model settings.
///
/// `dimension` must match the vectors the configured model actually
/// produces; the collection is created with this dimension and mixing
/// models without re-indexing corrupts similarity scores.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: u64,
    pub batch_size: usize,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct IndexingConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,
    /// Scratch directory for downloaded blobs.
    pub scratch_dir: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("{key}={raw}"))),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is honored if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let chunk_size = parse_var("CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?;
        let chunk_overlap = parse_var("CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP)?;
        if chunk_size == 0 {
            return Err(ConfigError::InvalidValue(
                "CHUNK_SIZE must be positive".into(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(ConfigError::InvalidValue(format!(
                "CHUNK_OVERLAP ({chunk_overlap}) must be smaller than CHUNK_SIZE ({chunk_size})"
            )));
        }

        Ok(Self {
            openai: OpenAiConfig {
                api_key: var_or("OPENAI_API_KEY", ""),
                base_url: var_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            },
            aws: AwsConfig {
                access_key_id: var_or("AWS_ACCESS_KEY_ID", ""),
                secret_access_key: var_or("AWS_SECRET_ACCESS_KEY", ""),
                region: var_or("AWS_REGION", "us-east-1"),
                bucket: var_or("AWS_S3_BUCKET", ""),
            },
            gcp: GcpConfig {
                bucket: var_or("GCP_BUCKET_NAME", ""),
                access_token: var_or("GCP_ACCESS_TOKEN", ""),
            },
            azure: AzureConfig {
                storage_account: var_or("AZURE_STORAGE_ACCOUNT", ""),
                container: var_or("AZURE_CONTAINER_NAME", ""),
                sas_token: var_or("AZURE_SAS_TOKEN", ""),
            },
            vector_store: VectorStoreConfig {
                url: var_or("QDRANT_URL", DEFAULT_QDRANT_URL),
                collection: var_or("COLLECTION_NAME", DEFAULT_COLLECTION),
                api_key: env::var("QDRANT_API_KEY").ok(),
            },
            embedding: EmbeddingConfig {
                model: var_or("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
                dimension: parse_var("EMBEDDING_DIMENSION", DEFAULT_EMBEDDING_DIMENSION)?,
                batch_size: parse_var("EMBEDDING_BATCH_SIZE", 64)?,
            },
            llm: LlmConfig {
                model: var_or("LLM_MODEL", DEFAULT_LLM_MODEL),
                temperature: parse_var("LLM_TEMPERATURE", DEFAULT_LLM_TEMPERATURE)?,
            },
            indexing: IndexingConfig {
                chunk_size,
                chunk_overlap,
                scratch_dir: var_or("SCRATCH_DIR", DEFAULT_SCRATCH_DIR),
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai: OpenAiConfig {
                api_key: String::new(),
                base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            },
            aws: AwsConfig {
                access_key_id: String::new(),
                secret_access_key: String::new(),
                region: "us-east-1".to_string(),
                bucket: String::new(),
            },
            gcp: GcpConfig {
                bucket: String::new(),
                access_token: String::new(),
            },
            azure: AzureConfig {
                storage_account: String::new(),
                container: String::new(),
                sas_token: String::new(),
            },
            vector_store: VectorStoreConfig {
                url: DEFAULT_QDRANT_URL.to_string(),
                collection: DEFAULT_COLLECTION.to_string(),
                api_key: None,
            },
            embedding: EmbeddingConfig {
                model: DEFAULT_EMBEDDING_MODEL.to_string(),
                dimension: DEFAULT_EMBEDDING_DIMENSION,
                batch_size: 64,
            },
            llm: LlmConfig {
                model: DEFAULT_LLM_MODEL.to_string(),
                temperature: DEFAULT_LLM_TEMPERATURE,
            },
            indexing: IndexingConfig {
                chunk_size: DEFAULT_CHUNK_SIZE,
                chunk_overlap: DEFAULT_CHUNK_OVERLAP,
                scratch_dir: DEFAULT_SCRATCH_DIR.to_string(),
            },
        }
    }
}
