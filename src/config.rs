//! Environment-driven configuration.
//!
//! Every external collaborator (LLM, Pinata, Story RPC, Alchemy, Story API) is
//! addressed through a base URL read here, so tests can point the whole service
//! at local mocks.

use std::env;
use std::time::Duration;

use crate::services::ip_asset::MintPipeline;

/// Story Aeneid testnet chain id
pub const STORY_AENEID_CHAIN_ID: u64 = 1315;

/// Brand NFT collection used for minting and for reading back owned assets
pub const DEFAULT_SPG_NFT_CONTRACT: &str = "0x95f8c494Bf35912921f3Fd654381612Ea5990244";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub pinata: PinataConfig,
    pub chain: ChainConfig,
    pub indexer: IndexerConfig,
    pub http_timeout: Duration,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub referer: String,
    pub app_title: String,
}

#[derive(Debug, Clone)]
pub struct PinataConfig {
    pub api_url: String,
    pub jwt: String,
    pub gateway_url: String,
}

/// Story Protocol deployment the minting service talks to.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub private_key: String,
    pub pipeline: MintPipeline,
    pub explorer_url: String,
    pub contracts: StoryContracts,
}

#[derive(Debug, Clone)]
pub struct StoryContracts {
    pub spg_nft: String,
    pub registration_workflows: String,
    pub license_attachment_workflows: String,
    pub pil_license_template: String,
    pub licensing_module: String,
    pub ip_asset_registry: String,
    pub royalty_policy_lap: String,
    pub wip_token: String,
}

impl StoryContracts {
    /// Aeneid testnet deployments
    pub fn aeneid() -> Self {
        Self {
            spg_nft: DEFAULT_SPG_NFT_CONTRACT.to_string(),
            registration_workflows: "0xbe39E1C756e921BD25DF86e7AAa31106d1eb0424".to_string(),
            license_attachment_workflows: "0xcC2E862bCee5B6036Db0de6E06Ae87e524a79fd8".to_string(),
            pil_license_template: "0x2E896b0b2Fdb7457499B56AAaA4AE55BCB4Cd316".to_string(),
            licensing_module: "0x04fbd8a2e56dd85CFD5500A4A4DfA955B9f1dE6f".to_string(),
            ip_asset_registry: "0x77319B4031e6eF1250907aa00018B8B1c67a244b".to_string(),
            royalty_policy_lap: "0xBe54FB168b3c982b7AaE60dB6CF75Bd8447b390E".to_string(),
            wip_token: "0x1514000000000000000000000000000000000000".to_string(),
        }
    }
}

/// Read-side APIs: Alchemy NFT indexer and the Story asset API.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    pub alchemy_nft_url: String,
    pub alchemy_api_key: String,
    pub story_api_url: String,
    pub story_api_key: String,
    pub story_api_chain: String,
    pub collection_address: String,
    pub metadata_cache_ttl: Duration,
}

impl AppConfig {
    /// Build the configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        let contracts = StoryContracts {
            spg_nft: var_or("SPG_NFT_CONTRACT", DEFAULT_SPG_NFT_CONTRACT),
            registration_workflows: var_or(
                "REGISTRATION_WORKFLOWS_ADDRESS",
                &StoryContracts::aeneid().registration_workflows,
            ),
            license_attachment_workflows: var_or(
                "LICENSE_ATTACHMENT_WORKFLOWS_ADDRESS",
                &StoryContracts::aeneid().license_attachment_workflows,
            ),
            pil_license_template: var_or(
                "PIL_LICENSE_TEMPLATE_ADDRESS",
                &StoryContracts::aeneid().pil_license_template,
            ),
            licensing_module: var_or(
                "LICENSING_MODULE_ADDRESS",
                &StoryContracts::aeneid().licensing_module,
            ),
            ip_asset_registry: var_or(
                "IP_ASSET_REGISTRY_ADDRESS",
                &StoryContracts::aeneid().ip_asset_registry,
            ),
            royalty_policy_lap: var_or(
                "ROYALTY_POLICY_LAP_ADDRESS",
                &StoryContracts::aeneid().royalty_policy_lap,
            ),
            wip_token: var_or("WIP_TOKEN_ADDRESS", &StoryContracts::aeneid().wip_token),
        };

        let collection_address = contracts.spg_nft.clone();

        Ok(Self {
            server: ServerConfig {
                host: var_or("SERVER_HOST", "0.0.0.0"),
                port: parse_var("SERVER_PORT", 3000)?,
            },
            llm: LlmConfig {
                base_url: var_or("LLM_BASE_URL", "https://openrouter.ai/api/v1"),
                api_key: required("OPENAI_API_KEY")?,
                model: var_or("LLM_MODEL", "openai/gpt-4o"),
                referer: var_or("LLM_REFERER", "http://localhost:3000"),
                app_title: var_or("LLM_APP_TITLE", "Jumapel"),
            },
            pinata: PinataConfig {
                api_url: var_or("PINATA_API_URL", "https://api.pinata.cloud"),
                jwt: required("PINATA_JWT")?,
                gateway_url: var_or("IPFS_GATEWAY_URL", "https://ipfs.io/ipfs"),
            },
            chain: ChainConfig {
                rpc_url: var_or("RPC_PROVIDER_URL", "https://aeneid.storyrpc.io"),
                chain_id: parse_var("STORY_CHAIN_ID", STORY_AENEID_CHAIN_ID)?,
                private_key: normalize_private_key(&required("WALLET_PRIVATE_KEY")?)?,
                pipeline: parse_var("MINT_PIPELINE", MintPipeline::AttachPilTerms)?,
                explorer_url: var_or("EXPLORER_URL", "https://aeneid.explorer.story.foundation"),
                contracts,
            },
            indexer: IndexerConfig {
                alchemy_nft_url: var_or(
                    "ALCHEMY_NFT_URL",
                    "https://story-aeneid.g.alchemy.com/nft/v3",
                ),
                alchemy_api_key: required("ALCHEMY_API_KEY")?,
                story_api_url: var_or("STORY_API_URL", "https://api.storyapis.com/api/v3"),
                story_api_key: required("STORY_API_KEY")?,
                story_api_chain: var_or("STORY_API_CHAIN", "story-aeneid"),
                collection_address,
                metadata_cache_ttl: Duration::from_secs(parse_var("METADATA_CACHE_TTL_SECS", 600)?),
            },
            http_timeout: Duration::from_secs(parse_var("HTTP_TIMEOUT_SECS", 120)?),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}

/// Accepts a 64-character hex key with or without `0x` and returns it `0x`-prefixed.
pub fn normalize_private_key(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);

    if hex_part.len() != 64 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::Invalid {
            name: "WALLET_PRIVATE_KEY",
            reason: "must be a 64-character hex string".to_string(),
        });
    }

    Ok(format!("0x{}", hex_part))
}
