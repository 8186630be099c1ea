//! Asset read-back handlers: a wallet's brand NFTs and the marketplace gallery.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info};

use crate::models::error::ErrorResponse;
use crate::models::nft::{EnrichedNft, GalleryItem, UserNftQuery};
use crate::services::ip_asset::parse_wallet_address;
use crate::AppState;

type HandlerError = (StatusCode, Json<ErrorResponse>);

/// GET /user-nft?address=0x...
pub async fn get_user_nfts(
    State(state): State<AppState>,
    Query(query): Query<UserNftQuery>,
) -> Result<Json<Vec<EnrichedNft>>, HandlerError> {
    let correlation_id = uuid::Uuid::new_v4().to_string();

    let address = query
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Missing wallet address.")),
            )
        })?;

    parse_wallet_address(address)
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string()))))?;

    info!(correlation_id = %correlation_id, owner = %address, "User NFT request received");

    let nfts = state.asset_query.user_collection(address).await.map_err(|e| {
        error!(correlation_id = %correlation_id, error = %e, "Failed to fetch NFTs");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("Failed to fetch NFTs.").with_details(e.to_string())),
        )
    })?;

    info!(
        correlation_id = %correlation_id,
        count = nfts.len(),
        enriched = nfts.iter().filter(|n| n.ip_id.is_some()).count(),
        "User NFT request completed"
    );

    Ok(Json(nfts))
}

/// GET /marketplace
pub async fn get_marketplace(
    State(state): State<AppState>,
) -> Result<Json<Vec<GalleryItem>>, HandlerError> {
    let correlation_id = uuid::Uuid::new_v4().to_string();

    let items = state.asset_query.marketplace().await.map_err(|e| {
        error!(correlation_id = %correlation_id, error = %e, "Failed to fetch marketplace assets");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("Failed to fetch marketplace assets.").with_details(e.to_string())),
        )
    })?;

    info!(correlation_id = %correlation_id, count = items.len(), "Marketplace request completed");

    Ok(Json(items))
}
