//! Gemini integration
//!
//! Provides:
//! - Image-conditioned generation via `generateContent`
//! - Extraction of the inline image from the first candidate

mod types;

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::GeminiConfig;
use types::{GenerateRequest, GenerateResponse};

/// Errors talking to the generative model
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Gemini API key not configured")]
    NotConfigured,

    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("prompt blocked: {0}")]
    Blocked(String),

    #[error("no candidates returned from Gemini")]
    NoCandidates,

    #[error("no image data in Gemini response")]
    NoImage,

    #[error("invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl From<reqwest::Error> for GeminiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GeminiError::Timeout
        } else {
            GeminiError::Http(err)
        }
    }
}

impl GeminiError {
    /// True when the service answered but gave nothing usable
    pub fn is_empty_result(&self) -> bool {
        matches!(
            self,
            GeminiError::NoCandidates | GeminiError::NoImage | GeminiError::Base64(_)
        )
    }
}

/// Decoded image returned by the model
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// Gemini API client
#[derive(Debug)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: f32,
}

impl GeminiClient {
    /// Create a client from configuration
    pub fn new(config: &GeminiConfig) -> Result<Self, GeminiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Check if API key is configured
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Model identifier requests are sent to
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate an image from a prompt and a reference image
    pub async fn generate_image(
        &self,
        prompt: &str,
        image: &[u8],
        mime_type: &str,
    ) -> Result<GeneratedImage, GeminiError> {
        let api_key = self.api_key.as_ref().ok_or(GeminiError::NotConfigured)?;

        let request = GenerateRequest::new(prompt, image, mime_type, self.temperature);
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        debug!(
            "Sending generateContent request to {} ({} image bytes)",
            self.model,
            image.len()
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API error: {} - {}", status, body);
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let response: GenerateResponse = response.json().await?;
        extract_image(response)
    }
}

/// Pull the inline image out of the first candidate
fn extract_image(response: GenerateResponse) -> Result<GeneratedImage, GeminiError> {
    let block_reason = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason);

    // No candidates is an empty result whatever the feedback says
    let Some(candidate) = response.candidates.into_iter().next() else {
        if let Some(reason) = block_reason {
            warn!("Gemini returned no candidates (block reason: {})", reason);
        }
        return Err(GeminiError::NoCandidates);
    };

    if let Some(reason) = block_reason {
        return Err(GeminiError::Blocked(reason));
    }

    let inline = candidate
        .content
        .into_iter()
        .flat_map(|content| content.parts)
        .find_map(|part| part.inline_data)
        .ok_or(GeminiError::NoImage)?;

    let data = BASE64.decode(inline.data.as_bytes())?;
    Ok(GeneratedImage {
        data,
        mime_type: inline.mime_type,
    })
}
