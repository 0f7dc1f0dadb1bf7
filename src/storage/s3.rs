//! Amazon S3 connector.
//!
//! Talks to the S3 REST API directly with SigV4 request signing; listing
//! uses ListObjectsV2 and downloads use GetObject against the
//! virtual-hosted bucket endpoint.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use regex::Regex;
use reqwest::Client;
use sha2::{Digest, Sha256};

use super::{uri_encode, xml_unescape, BlobSource};
use crate::error::StorageError;
use crate::models::AwsConfig;

type HmacSha256 = Hmac<Sha256>;

/// SHA-256 of an empty body; all requests here are GETs.
const EMPTY_PAYLOAD_HASH: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

pub struct S3Source {
    client: Client,
    bucket: String,
    region: String,
    access_key_id: String,
    secret_access_key: String,
    key_pattern: Regex,
}

impl S3Source {
    pub fn new(config: &AwsConfig) -> Result<Self, StorageError> {
        if config.bucket.is_empty() {
            return Err(StorageError::NotConfigured(
                "AWS_S3_BUCKET is not set".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            access_key_id: config.access_key_id.clone(),
            secret_access_key: config.secret_access_key.clone(),
            key_pattern: Regex::new(r"<Key>([^<]+)</Key>").expect("static regex"),
        })
    }

    fn host(&self) -> String {
        format!("{}.s3.{}.amazonaws.com", self.bucket, self.region)
    }

    /// Sign a GET request per AWS Signature Version 4.
    ///
    /// `uri_path` must already be URI-encoded and `query` must be in
    /// canonical (sorted) form.
    fn sign(&self, uri_path: &str, query: &str) -> (String, String) {
        let now = Utc::now();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let host = self.host();

        let canonical_headers = format!(
            "host:{host}\nx-amz-content-sha256:{EMPTY_PAYLOAD_HASH}\nx-amz-date:{amz_date}\n"
        );
        let signed_headers = "host;x-amz-content-sha256;x-amz-date";

        let canonical_request = format!(
            "GET\n{uri_path}\n{query}\n{canonical_headers}\n{signed_headers}\n{EMPTY_PAYLOAD_HASH}"
        );

        let scope = format!("{date}/{}/s3/aws4_request", self.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let k_date = hmac_sha256(
            format!("AWS4{}", self.secret_access_key).as_bytes(),
            date.as_bytes(),
        );
        let k_region = hmac_sha256(&k_date, self.region.as_bytes());
        let k_service = hmac_sha256(&k_region, b"s3");
        let k_signing = hmac_sha256(&k_service, b"aws4_request");
        let signature = hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes()));

        let authorization = format!(
            "AWS4-HMAC-SHA256 Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            self.access_key_id
        );

        (authorization, amz_date)
    }

    async fn get(&self, uri_path: &str, query: &str) -> Result<reqwest::Response, StorageError> {
        let (authorization, amz_date) = self.sign(uri_path, query);

        let url = if query.is_empty() {
            format!("https://{}{uri_path}", self.host())
        } else {
            format!("https://{}{uri_path}?{query}", self.host())
        };

        let response = self
            .client
            .get(&url)
            .header("authorization", authorization)
            .header("x-amz-date", amz_date)
            .header("x-amz-content-sha256", EMPTY_PAYLOAD_HASH)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::ServiceError(format!(
                "S3 returned {status}: {body}"
            )));
        }

        Ok(response)
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    // HMAC-SHA256 accepts keys of any length.
    let mut mac = HmacSha256::new_from_slice(key).expect("hmac key");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

#[async_trait]
impl BlobSource for S3Source {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        // Canonical query order: list-type before prefix.
        let query = format!("list-type=2&prefix={}", uri_encode(prefix, false));
        let response = self.get("/", &query).await?;
        let body = response.text().await?;

        let keys = self
            .key_pattern
            .captures_iter(&body)
            .map(|c| xml_unescape(&c[1]))
            .filter(|key| !key.ends_with('/'))
            .collect();

        Ok(keys)
    }

    async fn download(&self, remote: &str, local: &Path) -> Result<PathBuf, StorageError> {
        let uri_path = format!("/{}", uri_encode(remote, true));
        let response = self.get(&uri_path, "").await?;
        let bytes = response.bytes().await?;

        if let Some(parent) = local.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(local, &bytes)?;

        Ok(local.to_path_buf())
    }
}
