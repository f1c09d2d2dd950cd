//! Provider adapter for the hosted generation API.
//!
//! Sends prompts to the Google Generative Language endpoints and normalizes
//! the response or raises a typed failure. One attempt per call, no retries:
//! fallback policy belongs to the orchestrator, not this layer. The response
//! shape is treated as untrusted; any deviation becomes a `ProviderError`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::artifact::{ensure_output_dir, unique_artifact_path};

/// Default base URL for the generation API.
pub const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used for text generation.
pub const TEXT_MODEL: &str = "gemini-1.5-flash";

/// Model used for image generation.
pub const IMAGE_MODEL: &str = "imagegeneration";

/// Timeout for text generation requests.
const TEXT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for image generation requests.
const IMAGE_TIMEOUT: Duration = Duration::from_secs(90);

/// Connection timeout for all requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur during a provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("failed to decode image payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a successful text generation call.
///
/// An empty response is a soft success, not an error: the orchestrator
/// surfaces it as a marker string rather than falling back.
#[derive(Debug, Clone, PartialEq)]
pub enum TextReply {
    /// Trimmed, non-empty generated text.
    Content(String),
    /// The provider answered with no usable text.
    Empty,
}

/// The live-call seam of the generation pipeline.
///
/// Requiring an `api_key` argument encodes provider availability in the
/// types: the orchestrator can only call this after deciding the live path
/// applies. Tests inject counting or failing implementations.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate text for a prompt.
    async fn generate_text(&self, api_key: &str, prompt: &str) -> Result<TextReply, ProviderError>;

    /// Generate an image for a prompt, writing the decoded payload to a
    /// uniquely named file inside `output_dir`.
    async fn generate_image(
        &self,
        api_key: &str,
        prompt: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, ProviderError>;
}

/// Client for the hosted generation API.
pub struct GeminiClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Create a client against the production endpoint.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(API_BASE_URL.to_string())
    }

    /// Create a client with a custom base URL.
    ///
    /// Useful for testing against a mock server.
    pub fn with_base_url(base_url: String) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Provider for GeminiClient {
    async fn generate_text(&self, api_key: &str, prompt: &str) -> Result<TextReply, ProviderError> {
        let endpoint = format!("{}/models/{}:generateContent", self.base_url, TEXT_MODEL);
        log::debug!("POST {}", endpoint);

        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .http_client
            .post(format!("{}?key={}", endpoint, api_key))
            .timeout(TEXT_TIMEOUT)
            .json(&request_body)
            .send()
            .await?;

        let response = check_status(response).await?;
        let parsed: GenerateResponse = response.json().await?;
        text_from_response(parsed)
    }

    async fn generate_image(
        &self,
        api_key: &str,
        prompt: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, ProviderError> {
        let endpoint = format!("{}/models/{}:generate", self.base_url, IMAGE_MODEL);
        log::debug!("POST {}", endpoint);

        let request_body = ImageGenerationRequest {
            prompt: ImagePrompt {
                text: prompt.to_string(),
            },
        };

        let response = self
            .http_client
            .post(format!("{}?key={}", endpoint, api_key))
            .timeout(IMAGE_TIMEOUT)
            .json(&request_body)
            .send()
            .await?;

        let response = check_status(response).await?;
        let parsed: GenerateResponse = response.json().await?;
        let InlineData { data, mime_type } = inline_data_from_response(parsed)?;
        let bytes = base64::engine::general_purpose::STANDARD.decode(data)?;
        log::debug!(
            "Decoded provider image payload: {} bytes, mime type {:?}",
            bytes.len(),
            mime_type
        );

        ensure_output_dir(output_dir)?;
        let path = unique_artifact_path(output_dir, "png");
        tokio::fs::write(&path, &bytes).await?;
        log::info!("Provider image written to {:?}", path);
        Ok(path)
    }
}

/// Map a non-2xx response to `ProviderError::Status`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ProviderError::Status {
        status: status.as_u16(),
        body: body.trim().to_string(),
    })
}

/// Extract trimmed text from a generation response.
fn text_from_response(response: GenerateResponse) -> Result<TextReply, ProviderError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::MalformedResponse("no candidates".to_string()))?;

    let text: String = candidate
        .content
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    let trimmed = text.trim();
    if trimmed.is_empty() {
        Ok(TextReply::Empty)
    } else {
        Ok(TextReply::Content(trimmed.to_string()))
    }
}

/// Extract the base64 inline payload from a generation response.
fn inline_data_from_response(response: GenerateResponse) -> Result<InlineData, ProviderError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::MalformedResponse("no candidates".to_string()))?;

    candidate
        .content
        .parts
        .into_iter()
        .find_map(|part| part.inline_data)
        .ok_or_else(|| ProviderError::MalformedResponse("no inline image data".to_string()))
}

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

/// Request body for `models/imagegeneration:generate`.
#[derive(Debug, Serialize)]
struct ImageGenerationRequest {
    prompt: ImagePrompt,
}

#[derive(Debug, Serialize)]
struct ImagePrompt {
    text: String,
}

/// Response envelope shared by the text and image endpoints.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

/// A response part carrying either text or an inline base64 payload.
#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "inline_data", alias = "inlineData")]
    inline_data: Option<InlineData>,
}

/// Base64 inline payload for generated images.
#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
    #[serde(default, rename = "mime_type", alias = "mimeType")]
    mime_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_base_url_creates_client() {
        let client = GeminiClient::with_base_url("https://custom.api".to_string()).unwrap();
        assert_eq!(client.base_url(), "https://custom.api");
    }

    #[test]
    fn test_new_uses_default_base_url() {
        let client = GeminiClient::new().unwrap();
        assert_eq!(client.base_url(), API_BASE_URL);
    }

    #[test]
    fn test_text_request_serialization() {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: "a cozy cabin".to_string(),
                }],
            }],
        };

        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(
            json,
            r#"{"contents":[{"parts":[{"text":"a cozy cabin"}]}]}"#
        );
    }

    #[test]
    fn test_image_request_serialization() {
        let request = ImageGenerationRequest {
            prompt: ImagePrompt {
                text: "a red door".to_string(),
            },
        };

        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"prompt":{"text":"a red door"}}"#);
    }

    #[test]
    fn test_text_from_response_trims_content() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "  generated copy \n"}]}}
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        let reply = text_from_response(response).unwrap();
        assert_eq!(reply, TextReply::Content("generated copy".to_string()));
    }

    #[test]
    fn test_text_from_response_joins_parts() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "first "}, {"text": "second"}]}}
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        let reply = text_from_response(response).unwrap();
        assert_eq!(reply, TextReply::Content("first second".to_string()));
    }

    #[test]
    fn test_text_from_response_whitespace_only_is_empty() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "   \n  "}]}}
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(text_from_response(response).unwrap(), TextReply::Empty);
    }

    #[test]
    fn test_text_from_response_no_candidates_is_malformed() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        let err = text_from_response(response).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn test_inline_data_snake_case_deserialization() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"inline_data": {"data": "aGVsbG8=", "mime_type": "image/png"}}]}}
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        let inline = inline_data_from_response(response).unwrap();
        assert_eq!(inline.data, "aGVsbG8=");
        assert_eq!(inline.mime_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_inline_data_camel_case_alias() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"inlineData": {"data": "aGVsbG8="}}]}}
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        let inline = inline_data_from_response(response).unwrap();
        assert_eq!(inline.data, "aGVsbG8=");
    }

    #[test]
    fn test_inline_data_missing_is_malformed() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "not an image"}]}}
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        let err = inline_data_from_response(response).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::Status {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "provider returned status 503: overloaded");

        let err = ProviderError::MalformedResponse("no candidates".to_string());
        assert_eq!(err.to_string(), "malformed provider response: no candidates");
    }

    #[test]
    fn test_timeout_constants() {
        assert_eq!(TEXT_TIMEOUT, Duration::from_secs(30));
        assert_eq!(IMAGE_TIMEOUT, Duration::from_secs(90));
    }
}
