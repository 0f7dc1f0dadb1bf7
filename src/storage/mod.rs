//! Blob storage sources.
//!
//! [`BlobSource`] is the uniform interface over the three supported cloud
//! object stores. Provider selection is a factory keyed on [`StorageKind`];
//! connectors are thin REST clients that list keys under a prefix and
//! download objects to local files.

mod azure;
mod gcs;
mod s3;

pub use azure::AzureSource;
pub use gcs::GcsSource;
pub use s3::S3Source;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::Config;

/// Supported storage providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    S3,
    Gcp,
    Azure,
}

impl std::str::FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageKind::S3),
            "gcp" => Ok(StorageKind::Gcp),
            "azure" => Ok(StorageKind::Azure),
            _ => Err(format!("unsupported storage type: {s} (expected s3, gcp or azure)")),
        }
    }
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKind::S3 => write!(f, "s3"),
            StorageKind::Gcp => write!(f, "gcp"),
            StorageKind::Azure => write!(f, "azure"),
        }
    }
}

/// Lists and downloads files from a remote object store.
#[async_trait]
pub trait BlobSource: Send + Sync {
    /// List object keys under the given prefix.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Download one object to the given local path, creating parent
    /// directories as needed.
    async fn download(&self, remote: &str, local: &Path) -> Result<PathBuf, StorageError>;

    /// Download every object under the prefix into `local_dir`.
    ///
    /// Individual download failures are logged and skipped; only a listing
    /// failure aborts. Returns the local paths that were written.
    async fn download_all(
        &self,
        local_dir: &Path,
        prefix: &str,
    ) -> Result<Vec<PathBuf>, StorageError> {
        let keys = self.list(prefix).await?;
        let mut downloaded = Vec::with_capacity(keys.len());

        for key in keys {
            let local = local_dir.join(&key);
            match self.download(&key, &local).await {
                Ok(path) => downloaded.push(path),
                Err(e) => eprintln!("Warning: failed to download {key}: {e}"),
            }
        }

        Ok(downloaded)
    }
}

/// Create the connector for the selected provider.
pub fn create_blob_source(
    kind: StorageKind,
    config: &Config,
) -> Result<Box<dyn BlobSource>, StorageError> {
    match kind {
        StorageKind::S3 => Ok(Box::new(S3Source::new(&config.aws)?)),
        StorageKind::Gcp => Ok(Box::new(GcsSource::new(&config.gcp)?)),
        StorageKind::Azure => Ok(Box::new(AzureSource::new(&config.azure)?)),
    }
}

/// Percent-encode for URL paths and query values (RFC 3986 unreserved set).
/// `keep_slash` leaves path separators intact for object-key paths.
pub(crate) fn uri_encode(input: &str, keep_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            b'/' if keep_slash => out.push('/'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Undo the XML escaping applied to object keys in listing responses.
pub(crate) fn xml_unescape(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
