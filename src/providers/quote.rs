//! Generative-text provider client.
//!
//! Request/response shapes for the `generateContent` endpoint. The sampling
//! parameters are fixed; the caller only supplies the prompt text.

use serde::{Deserialize, Serialize};

use crate::constants::{GEMINI_MODEL, QUOTE_FETCH_FAILED, UNKNOWN_UPSTREAM_ERROR};
use crate::error::QuoteCardError;

/// Request body for POST /v1/models/{model}:generateContent
#[derive(Serialize, Debug)]
pub struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize, Debug)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize, Debug)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f64,
    top_p: f64,
    top_k: u32,
}

impl<'a> GenerateContentRequest<'a> {
    /// Builds the fixed-parameter request around the caller's prompt.
    pub fn new(prompt: &'a str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: 100,
                temperature: 0.9,
                top_p: 1.0,
                top_k: 1,
            },
        }
    }
}

/// Success payload from the generateContent endpoint.
#[derive(Deserialize, Debug, Default)]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate's first content part, if present.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

/// Error payload from the generateContent endpoint.
#[derive(Deserialize, Debug, Default)]
pub struct UpstreamErrorBody {
    #[serde(default)]
    error: Option<UpstreamErrorDetail>,
}

#[derive(Deserialize, Debug)]
struct UpstreamErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

impl UpstreamErrorBody {
    /// The upstream's message, or the generic fallback.
    pub fn message(self) -> String {
        self.error
            .and_then(|detail| detail.message)
            .unwrap_or_else(|| UNKNOWN_UPSTREAM_ERROR.to_string())
    }
}

/// Asks the provider for a quote. A structurally absent candidate is not an
/// error; the caller receives `None` and substitutes its placeholder.
pub async fn generate(
    client: &reqwest::Client,
    base: &str,
    api_key: &str,
    prompt: &str,
) -> Result<Option<String>, QuoteCardError> {
    let url = format!("{base}/v1/models/{GEMINI_MODEL}:generateContent?key={api_key}");

    let response = client
        .post(&url)
        .json(&GenerateContentRequest::new(prompt))
        .send()
        .await
        .map_err(|err| QuoteCardError::internal(QUOTE_FETCH_FAILED, err.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let message = response
            .json::<UpstreamErrorBody>()
            .await
            .unwrap_or_default()
            .message();
        return Err(QuoteCardError::Upstream { status, message });
    }

    let body: GenerateContentResponse = response
        .json()
        .await
        .map_err(|err| QuoteCardError::internal(QUOTE_FETCH_FAILED, err.to_string()))?;

    Ok(body.first_text().map(str::to_string))
}
