/*!
 * Google Gemini `generateContent` requests.
 *
 * The model goes into the URL path and the API key into the query string;
 * there is no Authorization header.
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::relay::RelayRequest;
use super::{AiPlatform, ProviderSettings};
use crate::errors::{AppError, AppResult, ProviderError};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// `{BASE_URL}/{model}:generateContent?key={api_key}`
pub fn endpoint(model: &str, api_key: &str) -> AppResult<Url> {
    let base = format!("{}/{}:generateContent", BASE_URL, model);
    Url::parse_with_params(&base, &[("key", api_key)])
        .map_err(|e| AppError::Configuration(format!("Invalid Google model '{}': {}", model, e)))
}

pub fn build_request(prompt: &str, settings: &ProviderSettings) -> AppResult<RelayRequest> {
    let url = endpoint(&settings.model, &settings.api_key)?;
    let body = GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: Some(prompt.to_string()),
            }],
        }],
    };

    Ok(RelayRequest::post_json(
        url.as_str(),
        serde_json::to_value(&body)?,
        settings.proxy.clone(),
    ))
}

/// First part of `candidates[0].content.parts` that has text
pub fn extract_text(body: &Value) -> Result<String, ProviderError> {
    let malformed = |detail: &str| ProviderError::MalformedResponse {
        platform: AiPlatform::Google,
        detail: detail.to_string(),
    };

    let response: GenerateContentResponse =
        serde_json::from_value(body.clone()).map_err(|e| malformed(&e.to_string()))?;

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| malformed("no candidates"))?;

    candidate
        .content
        .into_iter()
        .flat_map(|c| c.parts)
        .filter_map(|p| p.text)
        .find(|t| !t.is_empty())
        .ok_or_else(|| malformed("first candidate has no text part"))
}
