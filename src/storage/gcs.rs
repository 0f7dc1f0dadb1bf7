//! Google Cloud Storage connector.
//!
//! Uses the JSON API with a caller-supplied OAuth bearer token; listing via
//! `storage/v1/b/{bucket}/o` and downloads via `?alt=media`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{uri_encode, BlobSource};
use crate::error::StorageError;
use crate::models::GcpConfig;

const GCS_ENDPOINT: &str = "https://storage.googleapis.com";

pub struct GcsSource {
    client: Client,
    bucket: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<ListItem>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    name: String,
}

impl GcsSource {
    pub fn new(config: &GcpConfig) -> Result<Self, StorageError> {
        if config.bucket.is_empty() {
            return Err(StorageError::NotConfigured(
                "GCP_BUCKET_NAME is not set".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            bucket: config.bucket.clone(),
            access_token: config.access_token.clone(),
        })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, StorageError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::ServiceError(format!(
                "GCS returned {status}: {body}"
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl BlobSource for GcsSource {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let url = format!(
            "{GCS_ENDPOINT}/storage/v1/b/{}/o?prefix={}&fields=items(name)",
            self.bucket,
            uri_encode(prefix, false)
        );

        let response = self.get(&url).await?;
        let parsed: ListResponse = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidListing(e.to_string()))?;

        Ok(parsed
            .items
            .into_iter()
            .map(|item| item.name)
            .filter(|name| !name.ends_with('/'))
            .collect())
    }

    async fn download(&self, remote: &str, local: &Path) -> Result<PathBuf, StorageError> {
        // Object names are a single path segment in the JSON API, so the
        // slash is encoded too.
        let url = format!(
            "{GCS_ENDPOINT}/storage/v1/b/{}/o/{}?alt=media",
            self.bucket,
            uri_encode(remote, false)
        );

        let response = self.get(&url).await?;
        let bytes = response.bytes().await?;

        if let Some(parent) = local.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(local, &bytes)?;

        Ok(local.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_bucket() {
        let result = GcsSource::new(&GcpConfig {
            bucket: String::new(),
            access_token: String::new(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_list_response_parsing() {
        let json = r#"{"items":[{"name":"docs/a.txt"},{"name":"docs/folder/"},{"name":"b.pdf"}]}"#;
        let parsed: ListResponse = serde_json::from_str(json).unwrap();
        let names: Vec<String> = parsed
            .items
            .into_iter()
            .map(|i| i.name)
            .filter(|n| !n.ends_with('/'))
            .collect();
        assert_eq!(names, vec!["docs/a.txt", "b.pdf"]);
    }

    #[test]
    fn test_empty_list_response() {
        let parsed: ListResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.items.is_empty());
    }
}
