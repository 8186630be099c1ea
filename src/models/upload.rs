//! Upload endpoint models (image, metadata, whitepaper PDF)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadImageResponse {
    #[serde(rename = "IpfsHash")]
    pub ipfs_hash: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    /// SHA-256 of the exact bytes pinned, `0x`-prefixed
    #[serde(rename = "imageHash")]
    pub image_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadataRequest {
    #[serde(default)]
    pub ip_metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub nft_metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadMetadataResponse {
    #[serde(rename = "ipMetadataURI")]
    pub ip_metadata_uri: String,
    #[serde(rename = "ipMetadataHash")]
    pub ip_metadata_hash: String,
    #[serde(rename = "nftMetadataURI")]
    pub nft_metadata_uri: String,
    #[serde(rename = "nftMetadataHash")]
    pub nft_metadata_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadPdfRequest {
    #[serde(default)]
    pub whitepaper: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPdfResponse {
    #[serde(rename = "IpfsHash")]
    pub ipfs_hash: String,
    #[serde(rename = "pdfUrl")]
    pub pdf_url: String,
    #[serde(rename = "pdfHash")]
    pub pdf_hash: String,
}
