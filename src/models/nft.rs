//! NFT read-back models
//!
//! `OwnedNft` mirrors the Alchemy v3 owned-NFT record closely enough to reach
//! the mint transaction; unknown indexer fields are passed through untouched.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct UserNftQuery {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftContract {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedNft {
    pub contract: NftContract,
    pub token_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mint: Option<MintInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OwnedNft {
    pub fn mint_transaction_hash(&self) -> Option<&str> {
        self.mint
            .as_ref()
            .and_then(|m| m.transaction_hash.as_deref())
            .filter(|h| !h.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub address: String,
    /// Third-party documents may carry fractional shares or none at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution_percent: Option<f64>,
}

fn string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Keeps the creators that parse and drops the rest, so one odd entry does
/// not hide the whole document.
fn lenient_creators<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Creator>, D::Error> {
    let creators = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(entries)) => entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect(),
        _ => Vec::new(),
    };
    Ok(creators)
}

/// IP metadata document as pinned by the upload flow
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMetadataDocument {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_creators")]
    pub creators: Vec<Creator>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
}

impl AssetMetadataDocument {
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref().or(self.image_url.as_deref())
    }

    /// Media that is not simply the cover image is treated as the whitepaper.
    pub fn whitepaper_url(&self) -> Option<String> {
        let media = self.media_url.as_deref().filter(|m| !m.is_empty())?;
        let is_pdf = self.media_type.as_deref() == Some("application/pdf");
        if is_pdf || Some(media) != self.image() {
            Some(media.to_string())
        } else {
            None
        }
    }
}

/// Indexer record plus whatever enrichment succeeded
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedNft {
    #[serde(flatten)]
    pub nft: OwnedNft,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creators: Option<Vec<Creator>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whitepaper_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub ip_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub creators: Vec<Creator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whitepaper_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_owned_nft_keeps_unknown_fields() {
        let raw = json!({
            "contract": { "address": "0x95f8", "name": "Brand NFT", "symbol": "BRN", "tokenType": "ERC721" },
            "tokenId": "7",
            "name": "Solar Kettle",
            "mint": { "transactionHash": "0xabc", "blockNumber": 12 },
            "timeLastUpdated": "2025-06-01T00:00:00Z"
        });
        let nft: OwnedNft = serde_json::from_value(raw).unwrap();
        assert_eq!(nft.mint_transaction_hash(), Some("0xabc"));

        let back = serde_json::to_value(&nft).unwrap();
        assert_eq!(back["timeLastUpdated"], "2025-06-01T00:00:00Z");
        assert_eq!(back["contract"]["tokenType"], "ERC721");
        assert_eq!(back["mint"]["blockNumber"], 12);
    }

    #[test]
    fn test_whitepaper_url_from_pdf_media() {
        let doc = AssetMetadataDocument {
            image: Some("https://ipfs.io/ipfs/img".into()),
            media_url: Some("https://ipfs.io/ipfs/pdf".into()),
            media_type: Some("application/pdf".into()),
            ..Default::default()
        };
        assert_eq!(doc.whitepaper_url().as_deref(), Some("https://ipfs.io/ipfs/pdf"));
    }

    #[test]
    fn test_media_equal_to_image_is_not_a_whitepaper() {
        let doc = AssetMetadataDocument {
            image: Some("https://ipfs.io/ipfs/img".into()),
            media_url: Some("https://ipfs.io/ipfs/img".into()),
            media_type: Some("image/jpeg".into()),
            ..Default::default()
        };
        assert!(doc.whitepaper_url().is_none());
    }

    #[test]
    fn test_creator_share_may_be_null_or_fractional() {
        let raw = json!({
            "title": "Co-op Mill",
            "creators": [
                { "name": "Amara", "address": "0x1", "contributionPercent": 33.5 },
                { "name": "Jon", "address": "0x2", "contributionPercent": null },
                { "name": null, "address": "0x3" }
            ]
        });
        let doc: AssetMetadataDocument = serde_json::from_value(raw).unwrap();
        assert_eq!(doc.title.as_deref(), Some("Co-op Mill"));
        assert_eq!(doc.creators.len(), 3);
        assert_eq!(doc.creators[0].contribution_percent, Some(33.5));
        assert_eq!(doc.creators[1].contribution_percent, None);
        assert_eq!(doc.creators[2].name, "");

        let back = serde_json::to_value(&doc.creators[1]).unwrap();
        assert!(back.get("contributionPercent").is_none());
    }

    #[test]
    fn test_malformed_creator_entries_are_skipped() {
        let raw = json!({
            "title": "Co-op Mill",
            "image": "https://ipfs.io/ipfs/img",
            "creators": [
                "Amara",
                { "name": "Jon", "contributionPercent": "fifty" },
                { "name": "Lee", "address": "0x4", "contributionPercent": 100 }
            ]
        });
        let doc: AssetMetadataDocument = serde_json::from_value(raw).unwrap();
        assert_eq!(doc.image(), Some("https://ipfs.io/ipfs/img"));
        assert_eq!(doc.creators.len(), 1);
        assert_eq!(doc.creators[0].name, "Lee");

        let doc: AssetMetadataDocument =
            serde_json::from_value(json!({ "title": "x", "creators": null })).unwrap();
        assert!(doc.creators.is_empty());
    }
}
