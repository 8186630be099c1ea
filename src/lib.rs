// src/lib.rs

use std::sync::Arc;

use config::AppConfig;
use services::{
    asset_query::AssetQueryService,
    brand_agent::BrandAgentService,
    ip_asset::{IpAssetService, MintError},
    llm::ChatCompletionClient,
    pinata::PinataService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub brand_agent: BrandAgentService,
    pub pinata: PinataService,
    pub ip_assets: Arc<IpAssetService>,
    pub asset_query: AssetQueryService,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Minting(#[from] MintError),
}

impl AppState {
    /// Builds every service from configuration. No network access happens here.
    pub fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let pinata = PinataService::new(client.clone(), &config.pinata);
        let llm = ChatCompletionClient::new(client.clone(), &config.llm);
        let brand_agent = BrandAgentService::new(llm, pinata.clone());
        let ip_assets = IpAssetService::new(&config.chain)?;
        let asset_query = AssetQueryService::new(client, &config.indexer);

        Ok(Self {
            config: Arc::new(config),
            brand_agent,
            pinata,
            ip_assets: Arc::new(ip_assets),
            asset_query,
        })
    }
}

pub mod services {
    pub mod asset_query;
    pub mod brand_agent;
    pub mod brand_parser;
    pub mod content_hash;
    pub mod ip_asset;
    pub mod llm;
    pub mod pinata;
    pub mod whitepaper_pdf;
}

pub mod handlers {
    pub mod agent;
    pub mod mint;
    pub mod nft;
    pub mod upload;
}

pub mod config;
pub mod models;
pub mod routes;
