//! Reads minted brand assets back from the Alchemy NFT indexer and the Story
//! asset API.

use futures_util::future::join_all;
use moka::future::Cache;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::IndexerConfig;
use crate::models::nft::{AssetMetadataDocument, EnrichedNft, GalleryItem, OwnedNft};

/// Upper bound on indexer pages followed for one owner
const MAX_PAGES: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum AssetQueryError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("No IP asset found for transaction {0}")]
    NoIpAsset(String),

    #[error("No metadata URI for IP asset {0}")]
    NoMetadataUri(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnedNftsPage {
    #[serde(default)]
    owned_nfts: Vec<OwnedNft>,
    #[serde(default)]
    page_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionActions {
    #[serde(default)]
    data: Vec<TransactionAction>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionAction {
    #[serde(default)]
    action_type: Option<String>,
    #[serde(default)]
    ip_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetMetadataPointer {
    #[serde(default)]
    metadata_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssetList {
    #[serde(default)]
    data: Vec<AssetSummary>,
}

#[derive(Debug, Deserialize)]
struct AssetSummary {
    id: String,
}

/// IP id of a mint transaction: the `Register` action when present,
/// otherwise the first action that carries an IP id.
fn ip_id_from_actions(actions: &[TransactionAction]) -> Option<String> {
    let has_ip = |a: &&TransactionAction| a.ip_id.as_deref().is_some_and(|id| !id.is_empty());

    actions
        .iter()
        .filter(has_ip)
        .find(|a| a.action_type.as_deref() == Some("Register"))
        .or_else(|| actions.iter().find(has_ip))
        .and_then(|a| a.ip_id.clone())
}

#[derive(Clone)]
pub struct AssetQueryService {
    client: Client,
    alchemy_nft_url: String,
    alchemy_api_key: String,
    story_api_url: String,
    story_api_key: String,
    story_api_chain: String,
    collection_address: String,
    metadata_cache: Arc<Cache<String, Arc<AssetMetadataDocument>>>,
}

impl AssetQueryService {
    pub fn new(client: Client, config: &IndexerConfig) -> Self {
        // Pinned metadata never changes; the TTL only bounds memory
        let cache = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(config.metadata_cache_ttl)
            .build();

        Self {
            client,
            alchemy_nft_url: config.alchemy_nft_url.trim_end_matches('/').to_string(),
            alchemy_api_key: config.alchemy_api_key.clone(),
            story_api_url: config.story_api_url.trim_end_matches('/').to_string(),
            story_api_key: config.story_api_key.clone(),
            story_api_chain: config.story_api_chain.clone(),
            collection_address: config.collection_address.clone(),
            metadata_cache: Arc::new(cache),
        }
    }

    /// Every token of the brand collection held by `owner`.
    pub async fn owned_nfts(&self, owner: &str) -> Result<Vec<OwnedNft>, AssetQueryError> {
        let url = format!("{}/{}/getNFTsForOwner", self.alchemy_nft_url, self.alchemy_api_key);
        let mut nfts = Vec::new();
        let mut page_key: Option<String> = None;

        for page in 0..MAX_PAGES {
            let mut query = vec![
                ("owner", owner.to_string()),
                ("contractAddresses[]", self.collection_address.clone()),
                ("withMetadata", "true".to_string()),
            ];
            if let Some(key) = &page_key {
                query.push(("pageKey", key.clone()));
            }

            let response = self
                .client
                .get(&url)
                .header("accept", "application/json")
                .query(&query)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(AssetQueryError::Api {
                    service: "NFT indexer",
                    status,
                    body,
                });
            }

            let parsed: OwnedNftsPage = response.json().await?;
            debug!(page, count = parsed.owned_nfts.len(), "Fetched owned NFT page");
            nfts.extend(parsed.owned_nfts);

            match parsed.page_key.filter(|k| !k.is_empty()) {
                Some(next) => page_key = Some(next),
                None => break,
            }
        }

        info!(owner = %owner, count = nfts.len(), "Fetched owned NFTs");
        Ok(nfts)
    }

    async fn story_get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, AssetQueryError> {
        let response = self
            .client
            .get(format!("{}/{}", self.story_api_url, path))
            .header("accept", "application/json")
            .header("X-Api-Key", &self.story_api_key)
            .header("X-Chain", &self.story_api_chain)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AssetQueryError::Api {
                service: "Story API",
                status,
                body,
            });
        }

        Ok(response.json().await?)
    }

    pub async fn ip_id_for_transaction(&self, tx_hash: &str) -> Result<String, AssetQueryError> {
        let actions: TransactionActions = self.story_get(&format!("transactions/{}", tx_hash)).await?;
        ip_id_from_actions(&actions.data).ok_or_else(|| AssetQueryError::NoIpAsset(tx_hash.to_string()))
    }

    /// Metadata document registered for `ip_id`, cached per IP id.
    pub async fn asset_metadata(&self, ip_id: &str) -> Result<Arc<AssetMetadataDocument>, AssetQueryError> {
        if let Some(cached) = self.metadata_cache.get(ip_id).await {
            debug!(ip_id = %ip_id, "Metadata cache hit");
            return Ok(cached);
        }

        let pointer: AssetMetadataPointer = self.story_get(&format!("assets/{}/metadata", ip_id)).await?;
        let uri = pointer
            .metadata_uri
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AssetQueryError::NoMetadataUri(ip_id.to_string()))?;

        let response = self.client.get(&uri).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AssetQueryError::Api {
                service: "IPFS gateway",
                status,
                body,
            });
        }

        let document: Arc<AssetMetadataDocument> = Arc::new(response.json().await?);
        self.metadata_cache
            .insert(ip_id.to_string(), document.clone())
            .await;

        Ok(document)
    }

    /// Adds IP id, creators and whitepaper link. Enrichment is partial: whatever
    /// was resolved before a failure is kept.
    pub async fn enrich(&self, nft: OwnedNft) -> EnrichedNft {
        let mut enriched = EnrichedNft {
            nft,
            ip_id: None,
            creators: None,
            whitepaper_url: None,
        };

        let Some(tx_hash) = enriched.nft.mint_transaction_hash().map(str::to_string) else {
            debug!(token_id = %enriched.nft.token_id, "No mint transaction hash; skipping enrichment");
            return enriched;
        };

        let ip_id = match self.ip_id_for_transaction(&tx_hash).await {
            Ok(ip_id) => ip_id,
            Err(e) => {
                warn!(tx_hash = %tx_hash, error = %e, "Could not resolve IP id");
                return enriched;
            }
        };
        enriched.ip_id = Some(ip_id.clone());

        match self.asset_metadata(&ip_id).await {
            Ok(doc) => {
                enriched.creators = Some(doc.creators.clone());
                enriched.whitepaper_url = doc.whitepaper_url();
            }
            Err(e) => warn!(ip_id = %ip_id, error = %e, "Could not load asset metadata"),
        }

        enriched
    }

    /// Owned NFTs, each enriched concurrently.
    pub async fn user_collection(&self, owner: &str) -> Result<Vec<EnrichedNft>, AssetQueryError> {
        let nfts = self.owned_nfts(owner).await?;
        let enriched = join_all(nfts.into_iter().map(|nft| self.enrich(nft))).await;
        Ok(enriched)
    }

    /// Every IP asset of the brand collection with its metadata.
    pub async fn marketplace(&self) -> Result<Vec<GalleryItem>, AssetQueryError> {
        let body = serde_json::json!({
            "options": { "tokenContractIds": [self.collection_address] }
        });

        let response = self
            .client
            .post(format!("{}/assets", self.story_api_url))
            .header("accept", "application/json")
            .header("X-Api-Key", &self.story_api_key)
            .header("X-Chain", &self.story_api_chain)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AssetQueryError::Api {
                service: "Story API",
                status,
                body,
            });
        }

        let assets: AssetList = response.json().await?;
        info!(count = assets.data.len(), "Fetched marketplace assets");

        let items = join_all(assets.data.into_iter().map(|asset| async move {
            match self.asset_metadata(&asset.id).await {
                Ok(doc) => GalleryItem {
                    title: doc.title.clone(),
                    description: doc.description.clone(),
                    image: doc.image().map(str::to_string),
                    creators: doc.creators.clone(),
                    whitepaper_url: doc.whitepaper_url(),
                    ip_id: asset.id,
                },
                Err(e) => {
                    warn!(ip_id = %asset.id, error = %e, "Could not load asset metadata");
                    GalleryItem {
                        ip_id: asset.id,
                        title: None,
                        description: None,
                        image: None,
                        creators: Vec::new(),
                        whitepaper_url: None,
                    }
                }
            }
        }))
        .await;

        Ok(items)
    }
}
