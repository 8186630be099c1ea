//! Brand agent request/response models
//!
//! Models for the POST /agent endpoint that turns a product idea into a brand
//! pitch with an optional whitepaper PDF.

use serde::{Deserialize, Serialize};

/// Raw body of POST /agent; `idea` is validated by the handler
#[derive(Debug, Clone, Deserialize)]
pub struct AgentRequest {
    #[serde(default)]
    pub idea: Option<serde_json::Value>,
}

/// Six whitepaper sections, each optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Whitepaper {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problems: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technologies: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
}

impl Whitepaper {
    /// Sections in rendering order, paired with their headings
    pub fn sections(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("Introduction:", self.introduction.as_deref()),
            ("Background:", self.background.as_deref()),
            ("Problems:", self.problems.as_deref()),
            ("Solution:", self.solution.as_deref()),
            ("Technologies:", self.technologies.as_deref()),
            ("Conclusion:", self.conclusion.as_deref()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.sections()
            .iter()
            .all(|(_, text)| text.map_or(true, str::is_empty))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketValue {
    pub estimate: String,
    pub justification: String,
}

impl Default for MarketValue {
    fn default() -> Self {
        Self {
            estimate: "N/A".to_string(),
            justification: "N/A".to_string(),
        }
    }
}

/// Structured brand pitch with every optional field already defaulted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandResult {
    pub creator: String,
    pub refined_idea: String,
    pub brand_name: String,
    pub available_domain: String,
    pub market_value: MarketValue,
    pub whitepaper: Option<Whitepaper>,
}

/// Response for POST /agent
///
/// Degraded replies (model output that was not valid JSON) still answer 200 and
/// carry `raw` plus `jsonError`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub creator: String,
    pub brand_name: String,
    pub domain: String,
    pub refined_idea: String,
    pub market_value: MarketValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whitepaper: Option<Whitepaper>,
    /// Empty when no whitepaper was produced or its upload failed
    pub whitepaper_pdf_url: String,
    pub pdf_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_error: Option<String>,
}
