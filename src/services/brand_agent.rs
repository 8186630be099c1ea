//! Brand agent: idea in, brand pitch and optional whitepaper PDF out.
//!
//! The pitch is the primary result. The whitepaper PDF is a best-effort
//! artifact: if rendering or pinning fails the failure is logged and the pitch
//! is still returned.

use tracing::{info, warn};

use crate::models::agent::Whitepaper;
use crate::services::brand_parser::{parse_brand_reply, BrandReply};
use crate::services::content_hash::ContentDigest;
use crate::services::llm::{ChatCompletionClient, LlmError};
use crate::services::pinata::PinataService;
use crate::services::whitepaper_pdf;

const SYSTEM_PROMPT: &str = "You are a creative branding assistant. \
Respond with a single JSON object only. Do not add explanations, markdown or code fences.";

const WHITEPAPER_FILE_NAME: &str = "whitepaper.pdf";

/// Pinned whitepaper PDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitepaperArtifact {
    pub cid: String,
    pub url: String,
    pub pdf_hash: ContentDigest,
}

/// Agent result: the reply always exists, the whitepaper only when it could be
/// rendered and pinned.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub reply: BrandReply,
    pub whitepaper: Option<WhitepaperArtifact>,
}

#[derive(Debug, thiserror::Error)]
pub enum WhitepaperError {
    #[error(transparent)]
    Render(#[from] whitepaper_pdf::PdfError),

    #[error(transparent)]
    Upload(#[from] crate::services::pinata::PinataError),
}

pub fn build_prompt(idea: &str) -> String {
    format!(
        r#"Work through the following steps for the product idea below.

1. If the person describing the idea introduces themselves by name (for example "I'm Priya" or "my name is Alex"), extract that name as "creator". Otherwise use "Unknown".
2. Rewrite the idea as a neutral product description in "refinedIdea". Do not use pronouns or names that refer to the creator.
3. Propose a catchy, unique brand name in "brandName".
4. Suggest a domain for the brand that is likely to be available in "availableDomain".
5. Estimate the market value in "marketValue" as an object with "estimate" and "justification".
6. Draft a short whitepaper in "whitepaper" as an object with the text fields "introduction", "background", "problems", "solution", "technologies" and "conclusion".

Reply with exactly this JSON shape:
{{
  "creator": "...",
  "refinedIdea": "...",
  "brandName": "...",
  "availableDomain": "...",
  "marketValue": {{ "estimate": "...", "justification": "..." }},
  "whitepaper": {{
    "introduction": "...",
    "background": "...",
    "problems": "...",
    "solution": "...",
    "technologies": "...",
    "conclusion": "..."
  }}
}}

Product idea: "{}""#,
        idea.trim()
    )
}

#[derive(Clone)]
pub struct BrandAgentService {
    llm: ChatCompletionClient,
    pinata: PinataService,
}

impl BrandAgentService {
    pub fn new(llm: ChatCompletionClient, pinata: PinataService) -> Self {
        Self { llm, pinata }
    }

    /// Only the completion call itself can fail; parsing problems come back as
    /// a degraded reply.
    pub async fn generate(&self, idea: &str) -> Result<AgentOutcome, LlmError> {
        let content = self.llm.complete(SYSTEM_PROMPT, &build_prompt(idea)).await?;
        let reply = parse_brand_reply(&content);

        if let BrandReply::Degraded { json_error, .. } = &reply {
            warn!(error = %json_error, "Model output was not valid brand JSON");
        }

        let whitepaper = match reply.whitepaper() {
            Some(wp) => match self.publish_whitepaper(wp).await {
                Ok(artifact) => Some(artifact),
                Err(e) => {
                    warn!(error = %e, "Whitepaper PDF generation failed; continuing without it");
                    None
                }
            },
            None => None,
        };

        Ok(AgentOutcome { reply, whitepaper })
    }

    /// Renders and pins a whitepaper.
    pub async fn publish_whitepaper(
        &self,
        whitepaper: &Whitepaper,
    ) -> Result<WhitepaperArtifact, WhitepaperError> {
        let pdf = whitepaper_pdf::render(whitepaper)?;
        let pinned = self
            .pinata
            .upload_file(pdf, WHITEPAPER_FILE_NAME, "application/pdf")
            .await?;

        info!(cid = %pinned.cid, "Whitepaper PDF pinned");

        Ok(WhitepaperArtifact {
            cid: pinned.cid,
            url: pinned.url,
            pdf_hash: pinned.digest,
        })
    }
}
