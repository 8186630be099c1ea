//! Pinata pinning client
//!
//! Both JSON documents and binary files go through `pinFileToIPFS` so the bytes
//! stored on IPFS are exactly the bytes that were hashed. `pinJSONToIPFS` would
//! let Pinata re-serialize the document.

use reqwest::{
    multipart::{Form, Part},
    Client,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::PinataConfig;
use crate::services::content_hash::{canonical_json_bytes, ContentDigest};

#[derive(Debug, thiserror::Error)]
pub enum PinataError {
    #[error("Pinata request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Pinata API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Gateway fetch failed with status {0}")]
    Gateway(u16),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Result of a successful pin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedContent {
    pub cid: String,
    /// Public gateway URL for `cid`
    pub url: String,
    /// SHA-256 of the bytes that were pinned
    pub digest: ContentDigest,
}

#[derive(Clone)]
pub struct PinataService {
    client: Client,
    api_url: String,
    jwt: String,
    gateway_url: String,
}

impl PinataService {
    pub fn new(client: Client, config: &PinataConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            jwt: config.jwt.clone(),
            gateway_url: config.gateway_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn gateway_url_for(&self, cid: &str) -> String {
        format!("{}/{}", self.gateway_url, cid)
    }

    /// Pins the canonical serialization of `value`.
    pub async fn upload_json(&self, value: &Value, name: &str) -> Result<PinnedContent, PinataError> {
        let bytes = canonical_json_bytes(value);
        self.upload_file(bytes, name, "application/json").await
    }

    pub async fn upload_file(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> Result<PinnedContent, PinataError> {
        if bytes.is_empty() {
            return Err(PinataError::InvalidUpload("empty payload".to_string()));
        }

        // Hash first, then hand the same buffer to the multipart body
        let digest = ContentDigest::of(&bytes);
        let size = bytes.len();

        info!(file_name = %file_name, content_type = %content_type, size, "Pinning file to IPFS");

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| PinataError::InvalidUpload(format!("bad content type: {}", e)))?;

        let form = Form::new()
            .part("file", part)
            .text("pinataMetadata", serde_json::json!({ "name": file_name }).to_string());

        let url = format!("{}/pinning/pinFileToIPFS", self.api_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.jwt)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(PinataError::Api { status, body });
        }

        let pinned: PinResponse = response.json().await?;
        let url = self.gateway_url_for(&pinned.ipfs_hash);

        info!(cid = %pinned.ipfs_hash, digest = %digest, "Pinned to IPFS");

        Ok(PinnedContent {
            cid: pinned.ipfs_hash,
            url,
            digest,
        })
    }

    /// Downloads pinned content back through the gateway.
    pub async fn fetch_pinned(&self, cid: &str) -> Result<Vec<u8>, PinataError> {
        let response = self.client.get(self.gateway_url_for(cid)).send().await?;

        if !response.status().is_success() {
            return Err(PinataError::Gateway(response.status().as_u16()));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// True when the gateway serves bytes with the digest recorded at upload.
    pub async fn verify_pinned(&self, pinned: &PinnedContent) -> Result<bool, PinataError> {
        let bytes = self.fetch_pinned(&pinned.cid).await?;
        let matches = ContentDigest::of(&bytes) == pinned.digest;
        debug!(cid = %pinned.cid, matches, "Verified pinned content");
        Ok(matches)
    }
}
