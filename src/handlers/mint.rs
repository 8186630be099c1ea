//! Mint handler
//!
//! POST /mint pins the IP and NFT metadata, then mints the brand NFT and
//! registers it as an IP asset with the brand's license terms. The wallet
//! address is validated before anything is uploaded or sent on-chain.

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use tracing::{error, info, warn};

use crate::handlers::upload::{metadata_objects, pin_metadata_pair};
use crate::models::error::ErrorResponse;
use crate::models::mint::{MintRequest, MintResponse};
use crate::services::ip_asset::{parse_wallet_address, MintError, MintedAsset};
use crate::AppState;

type HandlerError = (StatusCode, Json<ErrorResponse>);

const MISSING_FIELDS: &str = "Missing required fields: ipMetadata, nftMetadata and walletAddress.";

pub async fn mint_ip_asset(
    State(state): State<AppState>,
    payload: Result<Json<MintRequest>, JsonRejection>,
) -> Result<Json<MintResponse>, HandlerError> {
    let correlation_id = uuid::Uuid::new_v4().to_string();

    let Json(request) =
        payload.map_err(|_| (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(MISSING_FIELDS))))?;

    let wallet = request
        .wallet_address
        .as_deref()
        .map(str::trim)
        .filter(|w| !w.is_empty());
    let (Some(wallet), Some((ip_metadata, nft_metadata))) =
        (wallet, metadata_objects(request.ip_metadata, request.nft_metadata))
    else {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(MISSING_FIELDS))));
    };

    let recipient = parse_wallet_address(wallet).map_err(|e| {
        warn!(correlation_id = %correlation_id, wallet = %wallet, "Malformed wallet address");
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(e.to_string()).with_code("INVALID_WALLET")),
        )
    })?;

    info!(
        correlation_id = %correlation_id,
        recipient = %recipient,
        pipeline = %state.ip_assets.pipeline(),
        "Mint request received"
    );

    let refs = pin_metadata_pair(&state.pinata, &ip_metadata, &nft_metadata)
        .await
        .map_err(|e| {
            error!(correlation_id = %correlation_id, error = %e, "Metadata upload failed before mint");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(
                    ErrorResponse::new("Failed to upload metadata to IPFS.")
                        .with_details(e.to_string())
                        .with_code("UPLOAD_FAILED"),
                ),
            )
        })?;

    let asset = state.ip_assets.mint(&refs, recipient).await.map_err(|e| {
        error!(
            correlation_id = %correlation_id,
            code = e.code(),
            tx_hash = e.tx_hash().unwrap_or("-"),
            error = %e,
            "Minting failed"
        );
        map_mint_error(e)
    })?;

    info!(
        correlation_id = %correlation_id,
        tx_hash = %asset.tx_hash,
        ip_id = %asset.ip_id,
        token_id = %asset.token_id,
        "Mint completed"
    );

    Ok(Json(to_response(asset, &state.config.chain.explorer_url)))
}

fn to_response(asset: MintedAsset, explorer_url: &str) -> MintResponse {
    let attached_license = (!asset.license_terms_ids.is_empty()).then(|| {
        format!(
            "Attached License Terms to IPA at transaction hash {}",
            asset.license_tx_hash.as_deref().unwrap_or(&asset.tx_hash)
        )
    });

    MintResponse {
        message: "IP Asset minted and registered successfully".to_string(),
        explorer_url: format!("{}/ipa/{}", explorer_url.trim_end_matches('/'), asset.ip_id),
        transaction_hash: asset.tx_hash,
        ip_id: asset.ip_id,
        token_id: asset.token_id,
        license_terms_ids: asset.license_terms_ids,
        attached_license,
    }
}

fn map_mint_error(err: MintError) -> HandlerError {
    let mut details = err.to_string();
    if let Some(hash) = err.tx_hash().filter(|h| !details.contains(*h)) {
        details = format!("{} (transaction {})", details, hash);
    }

    let body = ErrorResponse::new(err.user_message())
        .with_details(details)
        .with_code(err.code());
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(license_ids: Vec<&str>, license_tx: Option<&str>) -> MintedAsset {
        MintedAsset {
            token_id: "7".into(),
            ip_id: "0xIp".into(),
            tx_hash: "0xmint".into(),
            license_terms_ids: license_ids.into_iter().map(String::from).collect(),
            license_tx_hash: license_tx.map(String::from),
        }
    }

    #[test]
    fn test_response_links_explorer() {
        let response = to_response(asset(vec![], None), "https://aeneid.explorer.story.foundation/");
        assert_eq!(response.explorer_url, "https://aeneid.explorer.story.foundation/ipa/0xIp");
        assert!(response.attached_license.is_none());
    }

    #[test]
    fn test_attached_license_uses_attach_tx_when_separate() {
        let response = to_response(asset(vec!["1"], Some("0xattach")), "https://x");
        assert_eq!(
            response.attached_license.as_deref(),
            Some("Attached License Terms to IPA at transaction hash 0xattach")
        );

        let response = to_response(asset(vec!["1"], None), "https://x");
        assert!(response.attached_license.unwrap().ends_with("0xmint"));
    }

    #[test]
    fn test_missing_event_error_carries_code_and_hash() {
        let (status, Json(body)) = map_mint_error(MintError::MissingEvent { tx_hash: "0xdead".into() });
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code.as_deref(), Some("MISSING_EVENT"));
        assert!(body.details.unwrap().contains("0xdead"));
    }

    #[test]
    fn test_failure_after_mint_reports_the_minted_asset() {
        let minted = asset(vec!["1"], Some("0xattach"));
        let err = MintError::after_mint(
            &minted,
            "transfer to recipient",
            MintError::Provider("connection reset".into()),
        );

        let (status, Json(body)) = map_mint_error(err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code.as_deref(), Some("MINT_INCOMPLETE"));
        assert!(body.error.contains("Do not mint again"));

        let details = body.details.unwrap();
        assert!(details.contains("0xIp"));
        assert!(details.contains("0xmint"));
        assert!(details.contains("transfer to recipient"));
    }
}
