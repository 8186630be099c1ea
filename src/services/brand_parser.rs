//! Recovers a brand pitch from free-text model output.
//!
//! Models wrap JSON in markdown fences, pad it with prose and leave trailing
//! commas. Parsing never fails outright: unusable output becomes a
//! [`BrandReply::Degraded`] carrying the raw text and the parse error.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::models::agent::{BrandResult, MarketValue, Whitepaper};

lazy_static! {
    // First '{' to last '}', across lines
    static ref OBJECT_SPAN: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
    static ref CODE_FENCE: Regex = Regex::new(r"```(?:json|JSON)?").unwrap();
    static ref BLANK_LINES: Regex = Regex::new(r"\n(?:[ \t]*\r?\n)+").unwrap();
    static ref TRAILING_COMMA: Regex = Regex::new(r",(\s*[}\]])").unwrap();
}

const UNKNOWN_CREATOR: &str = "Unknown";
const NO_DOMAIN: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrandReply {
    Parsed(BrandResult),
    Degraded { raw: String, json_error: String },
}

impl BrandReply {
    pub fn whitepaper(&self) -> Option<&Whitepaper> {
        match self {
            BrandReply::Parsed(result) => result.whitepaper.as_ref(),
            BrandReply::Degraded { .. } => None,
        }
    }
}

/// Model output shape; every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawBrand {
    creator: Option<String>,
    refined_idea: Option<String>,
    brand_name: Option<String>,
    #[serde(alias = "domain")]
    available_domain: Option<String>,
    market_value: Option<Value>,
    whitepaper: Option<Whitepaper>,
}

/// Text that should hold the JSON object: the greedy `{...}` span, or the
/// whole trimmed response when there are no braces.
pub fn extract_candidate(content: &str) -> &str {
    match OBJECT_SPAN.find(content) {
        Some(m) => m.as_str(),
        None => content.trim(),
    }
}

/// Strips code fences, collapses blank lines and removes trailing commas.
pub fn clean_json_text(candidate: &str) -> String {
    let without_fences = CODE_FENCE.replace_all(candidate, "");
    let collapsed = BLANK_LINES.replace_all(&without_fences, "\n");
    let no_trailing = TRAILING_COMMA.replace_all(&collapsed, "$1");
    no_trailing.trim().to_string()
}

pub fn parse_brand_reply(content: &str) -> BrandReply {
    let cleaned = clean_json_text(extract_candidate(content));

    let parsed = serde_json::from_str::<Value>(&cleaned)
        .and_then(serde_json::from_value::<RawBrand>);

    match parsed {
        Ok(raw) => BrandReply::Parsed(normalize(raw)),
        Err(e) => BrandReply::Degraded {
            raw: content.to_string(),
            json_error: e.to_string(),
        },
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn value_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => non_empty(Some(s.clone())),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn market_value(value: Option<Value>) -> MarketValue {
    let default = MarketValue::default();
    match value {
        Some(Value::Object(map)) => MarketValue {
            estimate: value_text(map.get("estimate")).unwrap_or(default.estimate),
            justification: value_text(map.get("justification")).unwrap_or(default.justification),
        },
        // A bare figure is taken as the estimate
        Some(other @ (Value::String(_) | Value::Number(_))) => MarketValue {
            estimate: value_text(Some(&other)).unwrap_or(default.estimate),
            ..default
        },
        _ => default,
    }
}

fn normalize(raw: RawBrand) -> BrandResult {
    BrandResult {
        creator: non_empty(raw.creator).unwrap_or_else(|| UNKNOWN_CREATOR.to_string()),
        refined_idea: non_empty(raw.refined_idea).unwrap_or_default(),
        brand_name: non_empty(raw.brand_name).unwrap_or_default(),
        available_domain: non_empty(raw.available_domain).unwrap_or_else(|| NO_DOMAIN.to_string()),
        market_value: market_value(raw.market_value),
        whitepaper: raw.whitepaper,
    }
}
