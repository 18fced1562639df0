//! Gemini-backed background removal client
//!
//! One logical request per removal: the encoded image plus a fixed
//! instruction go to the `generateContent` endpoint with image-typed
//! output requested, and the first inline image part of the response is
//! taken as the PNG result. Single attempt, no retries, no caching.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::encoder::strip_data_uri_prefix;
use crate::error::{BgRemovalError, Result};

/// Default image-capable Gemini model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// Environment variable holding the API credential
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Fixed instruction sent with every removal request
const REMOVAL_INSTRUCTION: &str = "You are an expert at image segmentation. \
    Your task is to remove the background from this image. Isolate the main \
    subject and make the background transparent. Output only the resulting image.";

/// A service that removes the background from an encoded image.
///
/// The production implementation is [`GeminiClient`]; tests substitute a
/// stub so the state controller can be exercised without network access.
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Remove the background from a base64-encoded image.
    ///
    /// Returns the base64-encoded PNG result (no data-URI prefix).
    ///
    /// # Errors
    /// - [`BgRemovalError::Upstream`] on any network or service failure
    /// - [`BgRemovalError::NoImageInResponse`] when the service responds
    ///   without an inline image part
    async fn remove_background(&self, encoded_data: &str, media_type: &str) -> Result<String>;
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Debug)]
pub struct GeminiClient {
    api_key: String,
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a client with the default endpoint and model.
    ///
    /// # Errors
    /// Returns [`BgRemovalError::InvalidConfig`] if the API key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL (test seam).
    ///
    /// # Errors
    /// Returns [`BgRemovalError::InvalidConfig`] if the API key is empty.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(BgRemovalError::invalid_config(
                "Gemini API key is required",
            ));
        }
        Ok(Self {
            api_key,
            client: Client::new(),
            base_url: base_url.into(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Create a client from the `GEMINI_API_KEY` environment variable.
    ///
    /// Absence of the variable is a fatal startup condition.
    ///
    /// # Errors
    /// Returns [`BgRemovalError::InvalidConfig`] if the variable is unset
    /// or empty.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            BgRemovalError::invalid_config(format!("{API_KEY_ENV} environment variable is not set"))
        })?;
        Self::new(api_key)
    }

    /// Override the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Model name this client sends requests to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(encoded_data: &str, media_type: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            data: encoded_data.to_string(),
                            mime_type: media_type.to_string(),
                        }),
                        text: None,
                    },
                    Part {
                        inline_data: None,
                        text: Some(REMOVAL_INSTRUCTION.to_string()),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
            },
        }
    }

    fn extract_image(response: GenerateContentResponse) -> Result<String> {
        let parts = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default();

        for part in parts {
            if let Some(inline) = part.inline_data {
                if !inline.data.is_empty() {
                    return Ok(inline.data);
                }
            }
        }
        Err(BgRemovalError::NoImageInResponse)
    }
}

#[async_trait]
impl BackgroundRemover for GeminiClient {
    async fn remove_background(&self, encoded_data: &str, media_type: &str) -> Result<String> {
        let payload = strip_data_uri_prefix(encoded_data);
        if payload.is_empty() {
            return Err(BgRemovalError::decode("empty image payload"));
        }

        debug!(model = %self.model, media_type, "sending background removal request");

        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = Self::request_body(payload, media_type);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini request failed: {e}");
                BgRemovalError::upstream(format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Gemini request rejected: {error_text}");
            return Err(BgRemovalError::upstream_status(status.as_u16(), &error_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            error!("malformed Gemini response: {e}");
            BgRemovalError::upstream(format!("malformed response: {e}"))
        })?;

        Self::extract_image(parsed).map_err(|e| {
            warn!("Gemini response contained no inline image part");
            e
        })
    }
}

/// `generateContent` request format
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    data: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

/// `generateContent` response format
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}
