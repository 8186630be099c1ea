//! Brand agent handler
//!
//! POST /agent turns a product idea into a brand pitch and, when the model
//! drafted one, a pinned whitepaper PDF.

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use tracing::{error, info};

use crate::models::agent::{AgentRequest, AgentResponse};
use crate::models::error::ErrorResponse;
use crate::services::brand_agent::AgentOutcome;
use crate::services::brand_parser::BrandReply;
use crate::AppState;

const INVALID_IDEA: &str = "Missing or invalid product idea.";

pub async fn generate_brand(
    State(state): State<AppState>,
    payload: Result<Json<AgentRequest>, JsonRejection>,
) -> Result<Json<AgentResponse>, (StatusCode, Json<ErrorResponse>)> {
    let correlation_id = uuid::Uuid::new_v4().to_string();

    let idea = payload
        .ok()
        .and_then(|Json(req)| req.idea)
        .and_then(|v| v.as_str().map(str::trim).map(str::to_string))
        .filter(|idea| !idea.is_empty())
        .ok_or_else(|| (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(INVALID_IDEA))))?;

    info!(correlation_id = %correlation_id, idea_chars = idea.len(), "Brand agent request received");

    let outcome = state.brand_agent.generate(&idea).await.map_err(|e| {
        error!(correlation_id = %correlation_id, error = %e, "Brand agent failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("Failed to generate brand content.").with_details(e.to_string())),
        )
    })?;

    let response = to_response(outcome);
    info!(
        correlation_id = %correlation_id,
        brand_name = %response.brand_name,
        degraded = response.json_error.is_some(),
        has_pdf = !response.whitepaper_pdf_url.is_empty(),
        "Brand agent request completed"
    );

    Ok(Json(response))
}

fn to_response(outcome: AgentOutcome) -> AgentResponse {
    let (whitepaper_pdf_url, pdf_hash) = outcome
        .whitepaper
        .map(|wp| (wp.url, wp.pdf_hash.to_hex()))
        .unwrap_or_default();

    match outcome.reply {
        BrandReply::Parsed(result) => AgentResponse {
            creator: result.creator,
            brand_name: result.brand_name,
            domain: result.available_domain,
            refined_idea: result.refined_idea,
            market_value: result.market_value,
            whitepaper: result.whitepaper,
            whitepaper_pdf_url,
            pdf_hash,
            raw: None,
            json_error: None,
        },
        BrandReply::Degraded { raw, json_error } => AgentResponse {
            creator: "Unknown".to_string(),
            brand_name: String::new(),
            domain: "N/A".to_string(),
            refined_idea: String::new(),
            market_value: Default::default(),
            whitepaper: None,
            whitepaper_pdf_url,
            pdf_hash,
            raw: Some(raw),
            json_error: Some(json_error),
        },
    }
}
