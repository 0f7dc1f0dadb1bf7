//! Azure Blob Storage connector.
//!
//! Authenticates with a container-scoped SAS token appended to each
//! request; listing via the container's `comp=list` endpoint and downloads
//! via plain blob GETs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;

use super::{uri_encode, xml_unescape, BlobSource};
use crate::error::StorageError;
use crate::models::AzureConfig;

pub struct AzureSource {
    client: Client,
    account: String,
    container: String,
    sas_token: String,
    name_pattern: Regex,
}

impl AzureSource {
    pub fn new(config: &AzureConfig) -> Result<Self, StorageError> {
        if config.storage_account.is_empty() || config.container.is_empty() {
            return Err(StorageError::NotConfigured(
                "AZURE_STORAGE_ACCOUNT / AZURE_CONTAINER_NAME are not set".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            account: config.storage_account.clone(),
            container: config.container.clone(),
            sas_token: config.sas_token.trim_start_matches('?').to_string(),
            name_pattern: Regex::new(r"<Name>([^<]+)</Name>").expect("static regex"),
        })
    }

    fn container_url(&self) -> String {
        format!(
            "https://{}.blob.core.windows.net/{}",
            self.account, self.container
        )
    }

    fn with_sas(&self, url: String, has_query: bool) -> String {
        if self.sas_token.is_empty() {
            url
        } else if has_query {
            format!("{url}&{}", self.sas_token)
        } else {
            format!("{url}?{}", self.sas_token)
        }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, StorageError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::ServiceError(format!(
                "Azure returned {status}: {body}"
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl BlobSource for AzureSource {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let url = self.with_sas(
            format!(
                "{}?restype=container&comp=list&prefix={}",
                self.container_url(),
                uri_encode(prefix, false)
            ),
            true,
        );

        let response = self.get(&url).await?;
        let body = response.text().await?;

        let names = self
            .name_pattern
            .captures_iter(&body)
            .map(|c| xml_unescape(&c[1]))
            .filter(|name| !name.ends_with('/'))
            .collect();

        Ok(names)
    }

    async fn download(&self, remote: &str, local: &Path) -> Result<PathBuf, StorageError> {
        let url = self.with_sas(
            format!("{}/{}", self.container_url(), uri_encode(remote, true)),
            false,
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

    fn source(sas: &str) -> AzureSource {
        AzureSource::new(&AzureConfig {
            storage_account: "myaccount".to_string(),
            container: "docs".to_string(),
            sas_token: sas.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_requires_account_and_container() {
        let result = AzureSource::new(&AzureConfig {
            storage_account: String::new(),
            container: "docs".to_string(),
            sas_token: String::new(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_container_url() {
        assert_eq!(
            source("").container_url(),
            "https://myaccount.blob.core.windows.net/docs"
        );
    }

    #[test]
    fn test_sas_appending() {
        let s = source("?sv=2024&sig=abc");
        assert_eq!(
            s.with_sas("https://x/y".to_string(), false),
            "https://x/y?sv=2024&sig=abc"
        );
        assert_eq!(
            s.with_sas("https://x/y?comp=list".to_string(), true),
            "https://x/y?comp=list&sv=2024&sig=abc"
        );
    }

    #[test]
    fn test_blob_name_extraction() {
        let body = "<EnumerationResults><Blobs>\
                    <Blob><Name>reports/q1.pdf</Name></Blob>\
                    <Blob><Name>reports/archive/</Name></Blob>\
                    </Blobs></EnumerationResults>";
        let s = source("");
        let names: Vec<String> = s
            .name_pattern
            .captures_iter(body)
            .map(|c| xml_unescape(&c[1]))
            .filter(|n| !n.ends_with('/'))
            .collect();
        assert_eq!(names, vec!["reports/q1.pdf"]);
    }
}
