//! Upload handlers: cover image, metadata pair and whitepaper PDF.

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::models::agent::Whitepaper;
use crate::models::error::ErrorResponse;
use crate::models::upload::{
    UploadImageResponse, UploadMetadataRequest, UploadMetadataResponse, UploadPdfRequest,
    UploadPdfResponse,
};
use crate::services::ip_asset::MetadataRefs;
use crate::services::pinata::{PinataError, PinataService};
use crate::AppState;

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: &str) -> HandlerError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

fn upload_failed(message: &str, err: &PinataError) -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(message).with_details(err.to_string())),
    )
}

/// Pins both metadata documents concurrently; both must succeed.
pub(crate) async fn pin_metadata_pair(
    pinata: &PinataService,
    ip_metadata: &Value,
    nft_metadata: &Value,
) -> Result<MetadataRefs, PinataError> {
    let (ip, nft) = tokio::try_join!(
        pinata.upload_json(ip_metadata, "ip-metadata.json"),
        pinata.upload_json(nft_metadata, "nft-metadata.json"),
    )?;

    Ok(MetadataRefs {
        ip_metadata_uri: ip.url,
        ip_metadata_hash: ip.digest,
        nft_metadata_uri: nft.url,
        nft_metadata_hash: nft.digest,
    })
}

/// Both documents must be JSON objects.
pub(crate) fn metadata_objects(
    ip_metadata: Option<Value>,
    nft_metadata: Option<Value>,
) -> Option<(Value, Value)> {
    match (ip_metadata, nft_metadata) {
        (Some(ip @ Value::Object(_)), Some(nft @ Value::Object(_))) => Some((ip, nft)),
        _ => None,
    }
}

/// POST /upload-image
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadImageResponse>, HandlerError> {
    let correlation_id = uuid::Uuid::new_v4().to_string();

    let mut multipart = multipart.map_err(|e| {
        warn!(correlation_id = %correlation_id, error = %e, "Rejected non-multipart image upload");
        bad_request("Content-Type must be multipart/form-data.")
    })?;

    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| bad_request("Malformed multipart body."))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("image").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| bad_request("Malformed multipart body."))?;
        file = Some((file_name, content_type, bytes));
        break;
    }

    let (file_name, content_type, bytes) = file
        .filter(|(_, _, bytes)| !bytes.is_empty())
        .ok_or_else(|| bad_request("No file uploaded."))?;

    info!(
        correlation_id = %correlation_id,
        file_name = %file_name,
        content_type = %content_type,
        size = bytes.len(),
        "Image upload received"
    );

    let pinned = state
        .pinata
        .upload_file(bytes.to_vec(), &file_name, &content_type)
        .await
        .map_err(|e| {
            error!(correlation_id = %correlation_id, error = %e, "Image upload failed");
            upload_failed("Failed to upload image to IPFS.", &e)
        })?;

    Ok(Json(UploadImageResponse {
        image_hash: pinned.digest.to_hex(),
        image_url: pinned.url,
        ipfs_hash: pinned.cid,
    }))
}

/// POST /upload-metadata
pub async fn upload_metadata(
    State(state): State<AppState>,
    payload: Result<Json<UploadMetadataRequest>, JsonRejection>,
) -> Result<Json<UploadMetadataResponse>, HandlerError> {
    let correlation_id = uuid::Uuid::new_v4().to_string();

    let (ip_metadata, nft_metadata) = payload
        .ok()
        .and_then(|Json(req)| metadata_objects(req.ip_metadata, req.nft_metadata))
        .ok_or_else(|| bad_request("Missing ipMetadata or nftMetadata."))?;

    info!(correlation_id = %correlation_id, "Metadata upload received");

    let refs = pin_metadata_pair(&state.pinata, &ip_metadata, &nft_metadata)
        .await
        .map_err(|e| {
            error!(correlation_id = %correlation_id, error = %e, "Metadata upload failed");
            upload_failed("Failed to upload metadata to IPFS.", &e)
        })?;

    info!(
        correlation_id = %correlation_id,
        ip_metadata_hash = %refs.ip_metadata_hash,
        nft_metadata_hash = %refs.nft_metadata_hash,
        "Metadata pinned"
    );

    Ok(Json(UploadMetadataResponse {
        ip_metadata_uri: refs.ip_metadata_uri,
        ip_metadata_hash: refs.ip_metadata_hash.to_hex(),
        nft_metadata_uri: refs.nft_metadata_uri,
        nft_metadata_hash: refs.nft_metadata_hash.to_hex(),
    }))
}

/// POST /upload-pdf
pub async fn upload_pdf(
    State(state): State<AppState>,
    payload: Result<Json<UploadPdfRequest>, JsonRejection>,
) -> Result<Json<UploadPdfResponse>, HandlerError> {
    let correlation_id = uuid::Uuid::new_v4().to_string();

    let whitepaper: Whitepaper = payload
        .ok()
        .and_then(|Json(req)| req.whitepaper)
        .filter(Value::is_object)
        .and_then(|v| serde_json::from_value(v).ok())
        .ok_or_else(|| bad_request("Invalid whitepaper data."))?;

    info!(correlation_id = %correlation_id, empty = whitepaper.is_empty(), "Whitepaper PDF request received");

    let artifact = state
        .brand_agent
        .publish_whitepaper(&whitepaper)
        .await
        .map_err(|e| {
            error!(correlation_id = %correlation_id, error = %e, "Whitepaper PDF failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to generate or upload whitepaper PDF.").with_details(e.to_string())),
            )
        })?;

    Ok(Json(UploadPdfResponse {
        ipfs_hash: artifact.cid,
        pdf_url: artifact.url,
        pdf_hash: artifact.pdf_hash.to_hex(),
    }))
}
