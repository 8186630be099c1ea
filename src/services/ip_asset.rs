//! IP asset minting on Story Protocol
//!
//! Mints a brand NFT into the SPG collection, registers it as an IP asset and,
//! depending on the pipeline, attaches the brand's PIL license terms. Every
//! transaction waits for its receipt and the receipt status is checked
//! explicitly. Nothing here retries: repeating a mint that actually landed
//! would mint twice.

use alloy::{
    network::EthereumWallet,
    primitives::{Address, Bytes, B256, U256},
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
    sol,
    transports::http::{Client, Http},
};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error, info, warn};

use crate::config::ChainConfig;
use crate::services::content_hash::ContentDigest;

/// `commercialRevShare` is expressed with 100% == 100_000_000
const REV_SHARE_SCALE: u32 = 1_000_000;

sol! {
    struct IPMetadata {
        string ipMetadataURI;
        bytes32 ipMetadataHash;
        string nftMetadataURI;
        bytes32 nftMetadataHash;
    }

    struct PILTerms {
        bool transferable;
        address royaltyPolicy;
        uint256 defaultMintingFee;
        uint256 expiration;
        bool commercialUse;
        bool commercialAttribution;
        address commercializerChecker;
        bytes commercializerCheckerData;
        uint32 commercialRevShare;
        uint256 commercialRevCeiling;
        bool derivativesAllowed;
        bool derivativesAttribution;
        bool derivativesApproval;
        bool derivativesReciprocal;
        uint256 derivativeRevCeiling;
        address currency;
        string uri;
    }

    struct LicensingConfig {
        bool isSet;
        uint256 mintingFee;
        address licensingHook;
        bytes hookData;
        uint32 commercialRevShare;
        bool disabled;
        uint32 expectMinimumGroupRewardShare;
        address expectGroupRewardPool;
    }

    struct LicenseTermsData {
        PILTerms terms;
        LicensingConfig licensingConfig;
    }

    #[sol(rpc)]
    interface IRegistrationWorkflows {
        function mintAndRegisterIp(
            address spgNftContract,
            address recipient,
            IPMetadata calldata ipMetadata,
            bool allowDuplicates
        ) external returns (address ipId, uint256 tokenId);
    }

    #[sol(rpc)]
    interface ILicenseAttachmentWorkflows {
        function mintAndRegisterIpAndAttachPILTerms(
            address spgNftContract,
            address recipient,
            IPMetadata calldata ipMetadata,
            LicenseTermsData[] calldata licenseTermsData,
            bool allowDuplicates
        ) external returns (address ipId, uint256 tokenId, uint256[] memory licenseTermsIds);
    }

    #[sol(rpc)]
    interface IPILicenseTemplate {
        function registerLicenseTerms(PILTerms calldata terms) external returns (uint256 selectedLicenseTermsId);
        function getLicenseTermsId(PILTerms calldata terms) external view returns (uint256 selectedLicenseTermsId);
    }

    #[sol(rpc)]
    interface ILicensingModule {
        function attachLicenseTerms(address ipId, address licenseTemplate, uint256 licenseTermsId) external;
    }

    #[sol(rpc)]
    interface ISpgNft {
        function safeTransferFrom(address from, address to, uint256 tokenId) external;
    }

    interface IIPAssetRegistry {
        event IPRegistered(
            address ipId,
            uint256 indexed chainId,
            address indexed tokenContract,
            uint256 indexed tokenId,
            string name,
            string uri,
            uint256 registrationDate
        );
    }
}

/// Which sequence of on-chain calls a mint performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintPipeline {
    /// mintAndRegisterIp only
    RegisterOnly,
    /// mintAndRegisterIpAndAttachPILTerms in one transaction
    AttachPilTerms,
    /// Register terms if needed, mint to the service wallet, attach, then
    /// transfer the NFT (and with it the IP account) to the recipient
    RegisterThenAttach,
}

impl FromStr for MintPipeline {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "register" => Ok(MintPipeline::RegisterOnly),
            "pil-terms" => Ok(MintPipeline::AttachPilTerms),
            "register-attach" => Ok(MintPipeline::RegisterThenAttach),
            other => Err(format!(
                "unknown mint pipeline '{}' (expected register, pil-terms or register-attach)",
                other
            )),
        }
    }
}

impl fmt::Display for MintPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MintPipeline::RegisterOnly => "register",
            MintPipeline::AttachPilTerms => "pil-terms",
            MintPipeline::RegisterThenAttach => "register-attach",
        };
        f.write_str(name)
    }
}

/// The brand's fixed PIL terms. Not user-editable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseTerms {
    pub transferable: bool,
    pub royalty_policy: Address,
    pub default_minting_fee: U256,
    pub expiration: U256,
    pub commercial_use: bool,
    pub commercial_attribution: bool,
    pub commercializer_checker: Address,
    pub commercializer_checker_data: Bytes,
    /// Percent, 0..=100
    pub commercial_rev_share: u32,
    pub commercial_rev_ceiling: U256,
    pub derivatives_allowed: bool,
    pub derivatives_attribution: bool,
    pub derivatives_approval: bool,
    pub derivatives_reciprocal: bool,
    pub derivative_rev_ceiling: U256,
    pub currency: Address,
    pub uri: String,
}

/// Whole tokens to wei
pub fn ether(amount: u64) -> U256 {
    U256::from(amount) * U256::from(10u64).pow(U256::from(18u64))
}

impl LicenseTerms {
    /// Commercial remix terms: 10 IP minting fee, 15% revenue share,
    /// derivatives allowed with approval and reciprocal licensing.
    pub fn brand_default(royalty_policy: Address, currency: Address) -> Self {
        Self {
            transferable: true,
            royalty_policy,
            default_minting_fee: ether(10),
            expiration: U256::ZERO,
            commercial_use: true,
            commercial_attribution: true,
            commercializer_checker: Address::ZERO,
            commercializer_checker_data: Bytes::new(),
            commercial_rev_share: 15,
            commercial_rev_ceiling: U256::ZERO,
            derivatives_allowed: true,
            derivatives_attribution: true,
            derivatives_approval: true,
            derivatives_reciprocal: true,
            derivative_rev_ceiling: ether(100_000),
            currency,
            uri: String::new(),
        }
    }

    pub fn to_pil_terms(&self) -> PILTerms {
        PILTerms {
            transferable: self.transferable,
            royaltyPolicy: self.royalty_policy,
            defaultMintingFee: self.default_minting_fee,
            expiration: self.expiration,
            commercialUse: self.commercial_use,
            commercialAttribution: self.commercial_attribution,
            commercializerChecker: self.commercializer_checker,
            commercializerCheckerData: self.commercializer_checker_data.clone(),
            commercialRevShare: self.commercial_rev_share.saturating_mul(REV_SHARE_SCALE),
            commercialRevCeiling: self.commercial_rev_ceiling,
            derivativesAllowed: self.derivatives_allowed,
            derivativesAttribution: self.derivatives_attribution,
            derivativesApproval: self.derivatives_approval,
            derivativesReciprocal: self.derivatives_reciprocal,
            derivativeRevCeiling: self.derivative_rev_ceiling,
            currency: self.currency,
            uri: self.uri.clone(),
        }
    }

    pub fn to_terms_data(&self) -> LicenseTermsData {
        LicenseTermsData {
            terms: self.to_pil_terms(),
            licensingConfig: LicensingConfig {
                isSet: false,
                mintingFee: U256::ZERO,
                licensingHook: Address::ZERO,
                hookData: Bytes::new(),
                commercialRevShare: 0,
                disabled: false,
                expectMinimumGroupRewardShare: 0,
                expectGroupRewardPool: Address::ZERO,
            },
        }
    }
}

/// Pinned metadata locations and the digests of their exact bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRefs {
    pub ip_metadata_uri: String,
    pub ip_metadata_hash: ContentDigest,
    pub nft_metadata_uri: String,
    pub nft_metadata_hash: ContentDigest,
}

impl MetadataRefs {
    fn to_ip_metadata(&self) -> IPMetadata {
        IPMetadata {
            ipMetadataURI: self.ip_metadata_uri.clone(),
            ipMetadataHash: B256::from(*self.ip_metadata_hash.as_bytes()),
            nftMetadataURI: self.nft_metadata_uri.clone(),
            nftMetadataHash: B256::from(*self.nft_metadata_hash.as_bytes()),
        }
    }
}

/// Minted and registered asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintedAsset {
    pub token_id: String,
    pub ip_id: String,
    /// Hash of the mint/register transaction
    pub tx_hash: String,
    pub license_terms_ids: Vec<String>,
    /// Hash of the transaction that attached the license terms, when separate
    /// from the mint
    pub license_tx_hash: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum MintError {
    #[error("Transaction rejected by signer: {0}")]
    Rejected(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Transaction reverted: {reason}")]
    Reverted {
        tx_hash: Option<String>,
        reason: String,
    },

    #[error("Wrong chain: expected {expected}, connected to {actual}")]
    WrongChain { expected: u64, actual: u64 },

    #[error("Transaction {tx_hash} confirmed but no IPRegistered event was found")]
    MissingEvent { tx_hash: String },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown minting error: {0}")]
    Unknown(String),

    /// The asset exists on-chain but a follow-up transaction failed
    #[error(
        "IP asset {} (token {}) was minted in transaction {} but {step} failed: {source}",
        .asset.ip_id,
        .asset.token_id,
        .asset.tx_hash
    )]
    Incomplete {
        asset: Box<MintedAsset>,
        step: &'static str,
        source: Box<MintError>,
    },
}

impl MintError {
    /// Classifies an error raised while submitting a transaction.
    pub fn from_send_error(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        if lower.contains("user rejected")
            || lower.contains("user denied")
            || lower.contains("rejected the request")
            || lower.contains("denied transaction signature")
        {
            MintError::Rejected(message)
        } else if lower.contains("insufficient funds") || lower.contains("insufficient balance") {
            MintError::InsufficientFunds(message)
        } else if lower.contains("revert") {
            MintError::Reverted {
                tx_hash: None,
                reason: message,
            }
        } else if lower.contains("error sending request")
            || lower.contains("connection")
            || lower.contains("timed out")
        {
            MintError::Provider(message)
        } else {
            MintError::Unknown(message)
        }
    }

    /// Wraps a failure that happened after `asset` was already minted.
    pub fn after_mint(asset: &MintedAsset, step: &'static str, source: MintError) -> Self {
        MintError::Incomplete {
            asset: Box::new(asset.clone()),
            step,
            source: Box::new(source),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            MintError::Rejected(_) => "USER_REJECTED",
            MintError::InsufficientFunds(_) => "INSUFFICIENT_FUNDS",
            MintError::Reverted { .. } => "TX_REVERTED",
            MintError::WrongChain { .. } => "WRONG_CHAIN",
            MintError::MissingEvent { .. } => "MISSING_EVENT",
            MintError::Provider(_) => "PROVIDER_ERROR",
            MintError::InvalidConfig(_) => "CONFIG_ERROR",
            MintError::Unknown(_) => "UNKNOWN",
            MintError::Incomplete { .. } => "MINT_INCOMPLETE",
        }
    }

    /// Message shown to the user; never suggests an automatic retry.
    pub fn user_message(&self) -> &'static str {
        match self {
            MintError::Rejected(_) => "The minting transaction was rejected by the signer.",
            MintError::InsufficientFunds(_) => {
                "The minting wallet does not have enough funds to pay for the transaction."
            }
            MintError::Reverted { .. } => "The minting transaction was reverted on-chain.",
            MintError::WrongChain { .. } => "The RPC endpoint is connected to the wrong chain.",
            MintError::MissingEvent { .. } => {
                "The transaction was confirmed but the IP registration could not be read back. Check the explorer before minting again."
            }
            MintError::Provider(_) => "Could not reach the blockchain RPC endpoint.",
            MintError::InvalidConfig(_) => "Server configuration error.",
            MintError::Unknown(_) => "Failed to mint and register IP asset.",
            MintError::Incomplete { .. } => {
                "The IP asset was minted but a follow-up step failed. Do not mint again; finish it from the explorer."
            }
        }
    }

    pub fn tx_hash(&self) -> Option<&str> {
        match self {
            MintError::Reverted { tx_hash, .. } => tx_hash.as_deref(),
            MintError::MissingEvent { tx_hash } => Some(tx_hash),
            MintError::Incomplete { asset, .. } => Some(&asset.tx_hash),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("walletAddress must be a 0x-prefixed 40-character hex address")]
pub struct InvalidWalletAddress;

/// Strict recipient check, done before any chain access.
pub fn parse_wallet_address(raw: &str) -> Result<Address, InvalidWalletAddress> {
    let hex_part = raw.strip_prefix("0x").ok_or(InvalidWalletAddress)?;
    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(InvalidWalletAddress);
    }
    Address::from_str(raw).map_err(|_| InvalidWalletAddress)
}

fn parse_contract(name: &str, raw: &str) -> Result<Address, MintError> {
    Address::from_str(raw)
        .map_err(|e| MintError::InvalidConfig(format!("Invalid {} address: {}", name, e)))
}

fn ensure_success(receipt: &TransactionReceipt, tx_hash: &str) -> Result<(), MintError> {
    if receipt.status() {
        Ok(())
    } else {
        Err(MintError::Reverted {
            tx_hash: Some(tx_hash.to_string()),
            reason: "Transaction reverted".to_string(),
        })
    }
}

fn find_registration(
    receipt: &TransactionReceipt,
    registry: Address,
    token_contract: Address,
) -> Option<IIPAssetRegistry::IPRegistered> {
    receipt
        .inner
        .logs()
        .iter()
        .filter(|log| log.address() == registry)
        .filter_map(|log| log.log_decode::<IIPAssetRegistry::IPRegistered>().ok())
        .map(|log| log.inner.data)
        .find(|event| event.tokenContract == token_contract)
}

#[derive(Debug, Clone)]
struct Contracts {
    spg_nft: Address,
    registration_workflows: Address,
    license_attachment_workflows: Address,
    pil_license_template: Address,
    licensing_module: Address,
    ip_asset_registry: Address,
}

/// IP asset minting service
pub struct IpAssetService {
    rpc_url: String,
    chain_id: u64,
    wallet: EthereumWallet,
    signer_address: Address,
    contracts: Contracts,
    pipeline: MintPipeline,
    license_terms: LicenseTerms,
}

impl IpAssetService {
    /// Parses keys and addresses; performs no network access.
    pub fn new(config: &ChainConfig) -> Result<Self, MintError> {
        reqwest::Url::parse(&config.rpc_url)
            .map_err(|e| MintError::InvalidConfig(format!("Invalid RPC URL: {}", e)))?;

        let signer: PrivateKeySigner = config
            .private_key
            .parse()
            .map_err(|e| MintError::InvalidConfig(format!("Invalid private key: {}", e)))?;
        let signer_address = signer.address();

        let c = &config.contracts;
        let contracts = Contracts {
            spg_nft: parse_contract("SPG NFT", &c.spg_nft)?,
            registration_workflows: parse_contract("RegistrationWorkflows", &c.registration_workflows)?,
            license_attachment_workflows: parse_contract(
                "LicenseAttachmentWorkflows",
                &c.license_attachment_workflows,
            )?,
            pil_license_template: parse_contract("PILicenseTemplate", &c.pil_license_template)?,
            licensing_module: parse_contract("LicensingModule", &c.licensing_module)?,
            ip_asset_registry: parse_contract("IPAssetRegistry", &c.ip_asset_registry)?,
        };
        let license_terms = LicenseTerms::brand_default(
            parse_contract("RoyaltyPolicyLAP", &c.royalty_policy_lap)?,
            parse_contract("WIP token", &c.wip_token)?,
        );

        info!(
            rpc_url = %config.rpc_url,
            signer = %signer_address,
            spg_nft = %contracts.spg_nft,
            pipeline = %config.pipeline,
            "IpAssetService configured"
        );

        Ok(Self {
            rpc_url: config.rpc_url.clone(),
            chain_id: config.chain_id,
            wallet: EthereumWallet::from(signer),
            signer_address,
            contracts,
            pipeline: config.pipeline,
            license_terms,
        })
    }

    pub fn pipeline(&self) -> MintPipeline {
        self.pipeline
    }

    pub fn license_terms(&self) -> &LicenseTerms {
        &self.license_terms
    }

    fn wallet_provider(&self) -> Result<impl Provider<Http<Client>>, MintError> {
        Ok(ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(self.wallet.clone())
            .on_http(
                self.rpc_url
                    .parse()
                    .map_err(|e| MintError::InvalidConfig(format!("RPC URL error: {}", e)))?,
            ))
    }

    /// Compares the RPC endpoint's chain id with the configured one.
    pub async fn verify_chain(&self) -> Result<u64, MintError> {
        let provider = ProviderBuilder::new().on_http(
            self.rpc_url
                .parse()
                .map_err(|e| MintError::InvalidConfig(format!("RPC URL error: {}", e)))?,
        );

        let actual = provider.get_chain_id().await.map_err(|e| {
            error!(error = %e, "Failed to connect to Story RPC");
            MintError::Provider(format!("Connection failed: {}", e))
        })?;

        if actual != self.chain_id {
            return Err(MintError::WrongChain {
                expected: self.chain_id,
                actual,
            });
        }

        Ok(actual)
    }

    /// Runs the configured pipeline and blocks until every transaction is mined.
    pub async fn mint(
        &self,
        metadata: &MetadataRefs,
        recipient: Address,
    ) -> Result<MintedAsset, MintError> {
        info!(
            recipient = %recipient,
            pipeline = %self.pipeline,
            ip_metadata_uri = %metadata.ip_metadata_uri,
            nft_metadata_uri = %metadata.nft_metadata_uri,
            "Minting IP asset"
        );

        match self.pipeline {
            MintPipeline::RegisterOnly => self.mint_and_register(metadata, recipient).await,
            MintPipeline::AttachPilTerms => self.mint_with_pil_terms(metadata, recipient).await,
            MintPipeline::RegisterThenAttach => {
                let terms_id = self.ensure_license_terms().await?;
                let mut asset = self.mint_and_register(metadata, self.signer_address).await?;

                // From here on the asset exists; failures must still report it
                let attach_tx = self
                    .attach_license_terms(&asset.ip_id, terms_id)
                    .await
                    .map_err(|e| MintError::after_mint(&asset, "license attachment", e))?;
                asset.license_terms_ids = vec![terms_id.to_string()];
                asset.license_tx_hash = Some(attach_tx);

                self.transfer_token(&asset.token_id, recipient)
                    .await
                    .map_err(|e| MintError::after_mint(&asset, "transfer to recipient", e))?;
                Ok(asset)
            }
        }
    }

    async fn mint_and_register(
        &self,
        metadata: &MetadataRefs,
        recipient: Address,
    ) -> Result<MintedAsset, MintError> {
        let provider = self.wallet_provider()?;
        let workflows = IRegistrationWorkflows::new(self.contracts.registration_workflows, &provider);

        let pending = workflows
            .mintAndRegisterIp(self.contracts.spg_nft, recipient, metadata.to_ip_metadata(), true)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send mintAndRegisterIp transaction");
                MintError::from_send_error(e.to_string())
            })?;

        let tx_hash = format!("{:?}", pending.tx_hash());
        info!(tx_hash = %tx_hash, "mintAndRegisterIp sent, waiting for confirmation");

        let receipt = pending.get_receipt().await.map_err(|e| {
            error!(tx_hash = %tx_hash, error = %e, "Failed to get transaction receipt");
            MintError::Provider(format!("Receipt failed for {}: {}", tx_hash, e))
        })?;
        ensure_success(&receipt, &tx_hash)?;

        let event = find_registration(&receipt, self.contracts.ip_asset_registry, self.contracts.spg_nft)
            .ok_or_else(|| MintError::MissingEvent { tx_hash: tx_hash.clone() })?;

        info!(
            tx_hash = %tx_hash,
            ip_id = %event.ipId,
            token_id = %event.tokenId,
            "IP asset registered"
        );

        Ok(MintedAsset {
            token_id: event.tokenId.to_string(),
            ip_id: event.ipId.to_string(),
            tx_hash,
            license_terms_ids: Vec::new(),
            license_tx_hash: None,
        })
    }

    async fn mint_with_pil_terms(
        &self,
        metadata: &MetadataRefs,
        recipient: Address,
    ) -> Result<MintedAsset, MintError> {
        let provider = self.wallet_provider()?;
        let workflows =
            ILicenseAttachmentWorkflows::new(self.contracts.license_attachment_workflows, &provider);

        let pending = workflows
            .mintAndRegisterIpAndAttachPILTerms(
                self.contracts.spg_nft,
                recipient,
                metadata.to_ip_metadata(),
                vec![self.license_terms.to_terms_data()],
                true,
            )
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send mintAndRegisterIpAndAttachPILTerms transaction");
                MintError::from_send_error(e.to_string())
            })?;

        let tx_hash = format!("{:?}", pending.tx_hash());
        info!(tx_hash = %tx_hash, "mintAndRegisterIpAndAttachPILTerms sent, waiting for confirmation");

        let receipt = pending.get_receipt().await.map_err(|e| {
            error!(tx_hash = %tx_hash, error = %e, "Failed to get transaction receipt");
            MintError::Provider(format!("Receipt failed for {}: {}", tx_hash, e))
        })?;
        ensure_success(&receipt, &tx_hash)?;

        let event = find_registration(&receipt, self.contracts.ip_asset_registry, self.contracts.spg_nft)
            .ok_or_else(|| MintError::MissingEvent { tx_hash: tx_hash.clone() })?;

        // The workflow registers the terms if they are new; look the id up afterwards
        let license_terms_ids = match self.license_terms_id().await {
            Ok(id) if id != U256::ZERO => vec![id.to_string()],
            Ok(_) => Vec::new(),
            Err(e) => {
                warn!(tx_hash = %tx_hash, error = %e, "Minted, but license terms id lookup failed");
                Vec::new()
            }
        };

        info!(
            tx_hash = %tx_hash,
            ip_id = %event.ipId,
            token_id = %event.tokenId,
            license_terms_ids = ?license_terms_ids,
            "IP asset registered with license terms"
        );

        Ok(MintedAsset {
            token_id: event.tokenId.to_string(),
            ip_id: event.ipId.to_string(),
            tx_hash,
            license_terms_ids,
            license_tx_hash: None,
        })
    }

    /// Looks up the id of the brand terms; zero when not yet registered.
    async fn license_terms_id(&self) -> Result<U256, MintError> {
        let provider = self.wallet_provider()?;
        let template = IPILicenseTemplate::new(self.contracts.pil_license_template, &provider);

        let id = template
            .getLicenseTermsId(self.license_terms.to_pil_terms())
            .call()
            .await
            .map_err(|e| MintError::Provider(format!("getLicenseTermsId failed: {}", e)))?
            .selectedLicenseTermsId;

        Ok(id)
    }

    /// Registers the brand terms unless an identical entry already exists.
    async fn ensure_license_terms(&self) -> Result<U256, MintError> {
        let existing = self.license_terms_id().await?;
        if existing != U256::ZERO {
            debug!(license_terms_id = %existing, "License terms already registered");
            return Ok(existing);
        }

        let provider = self.wallet_provider()?;
        let template = IPILicenseTemplate::new(self.contracts.pil_license_template, &provider);

        let pending = template
            .registerLicenseTerms(self.license_terms.to_pil_terms())
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send registerLicenseTerms transaction");
                MintError::from_send_error(e.to_string())
            })?;

        let tx_hash = format!("{:?}", pending.tx_hash());
        let receipt = pending.get_receipt().await.map_err(|e| {
            MintError::Provider(format!("Receipt failed for {}: {}", tx_hash, e))
        })?;
        ensure_success(&receipt, &tx_hash)?;

        let id = self.license_terms_id().await?;
        info!(tx_hash = %tx_hash, license_terms_id = %id, "License terms registered");
        Ok(id)
    }

    async fn attach_license_terms(&self, ip_id: &str, terms_id: U256) -> Result<String, MintError> {
        let ip_id = Address::from_str(ip_id)
            .map_err(|e| MintError::Unknown(format!("Invalid IP id {}: {}", ip_id, e)))?;

        let provider = self.wallet_provider()?;
        let module = ILicensingModule::new(self.contracts.licensing_module, &provider);

        let pending = module
            .attachLicenseTerms(ip_id, self.contracts.pil_license_template, terms_id)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, ip_id = %ip_id, "Failed to send attachLicenseTerms transaction");
                MintError::from_send_error(e.to_string())
            })?;

        let tx_hash = format!("{:?}", pending.tx_hash());
        let receipt = pending.get_receipt().await.map_err(|e| {
            MintError::Provider(format!("Receipt failed for {}: {}", tx_hash, e))
        })?;
        ensure_success(&receipt, &tx_hash)?;

        info!(tx_hash = %tx_hash, ip_id = %ip_id, license_terms_id = %terms_id, "License terms attached");
        Ok(tx_hash)
    }

    async fn transfer_token(&self, token_id: &str, recipient: Address) -> Result<(), MintError> {
        let token_id = U256::from_str(token_id)
            .map_err(|e| MintError::Unknown(format!("Invalid token id {}: {}", token_id, e)))?;

        let provider = self.wallet_provider()?;
        let collection = ISpgNft::new(self.contracts.spg_nft, &provider);

        let pending = collection
            .safeTransferFrom(self.signer_address, recipient, token_id)
            .send()
            .await
            .map_err(|e| MintError::from_send_error(e.to_string()))?;

        let tx_hash = format!("{:?}", pending.tx_hash());
        let receipt = pending.get_receipt().await.map_err(|e| {
            MintError::Provider(format!("Receipt failed for {}: {}", tx_hash, e))
        })?;
        ensure_success(&receipt, &tx_hash)?;

        info!(tx_hash = %tx_hash, token_id = %token_id, recipient = %recipient, "Token transferred to recipient");
        Ok(())
    }
}
