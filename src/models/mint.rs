//! Mint request/response models
//!
//! Models for the POST /mint endpoint that pins both metadata documents and
//! registers the brand as an IP asset on Story.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    #[serde(default)]
    pub ip_metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub nft_metadata: Option<serde_json::Value>,
    /// Recipient wallet, `0x` + 40 hex
    #[serde(default)]
    pub wallet_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintResponse {
    pub message: String,
    pub transaction_hash: String,
    pub ip_id: String,
    pub token_id: String,
    pub license_terms_ids: Vec<String>,
    pub explorer_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attached_license: Option<String>,
}
