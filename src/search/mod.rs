//! Photo search helpers
//!
//! Provides:
//! - Unsplash photo search (results passed through as raw JSON records)
//! - Downloading an image URL and decoding it to RGB

use std::time::Duration;

use image::RgbImage;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Default Unsplash API base URL
pub const UNSPLASH_BASE_URL: &str = "https://api.unsplash.com";

/// Default number of results per search
pub const DEFAULT_PER_PAGE: u32 = 15;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Photo search errors
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Unsplash access key required")]
    MissingAccessKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

/// Unsplash search client
#[derive(Debug, Clone)]
pub struct PhotoSearchClient {
    client: Client,
    base_url: String,
}

impl PhotoSearchClient {
    /// Client against the public Unsplash API
    pub fn new() -> Result<Self, SearchError> {
        Self::with_base_url(UNSPLASH_BASE_URL)
    }

    /// Client against a custom base URL
    pub fn with_base_url(base_url: &str) -> Result<Self, SearchError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search landscape photos matching `query`
    ///
    /// The access key is supplied by the caller; it is never read from the
    /// environment.
    pub async fn search(
        &self,
        query: &str,
        per_page: u32,
        access_key: Option<&str>,
    ) -> Result<Vec<serde_json::Value>, SearchError> {
        let access_key = access_key.ok_or(SearchError::MissingAccessKey)?;

        debug!("Searching Unsplash for '{}' ({} per page)", query, per_page);

        let per_page = per_page.to_string();
        let response = self
            .client
            .get(format!("{}/search/photos", self.base_url))
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("orientation", "landscape"),
            ])
            .header("Accept-Version", "v1")
            .header("Authorization", format!("Client-ID {}", access_key))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Unsplash API error: {}", status);
            return Err(SearchError::Status(status.as_u16()));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.results)
    }

    /// Fetch an image and decode it as RGB
    pub async fn download_image(&self, url: &str) -> Result<RgbImage, SearchError> {
        download_with(&self.client, url).await
    }
}

/// Fetch an image from any URL and decode it as RGB
pub async fn download_image(url: &str) -> Result<RgbImage, SearchError> {
    let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    download_with(&client, url).await
}

async fn download_with(client: &Client, url: &str) -> Result<RgbImage, SearchError> {
    debug!("Downloading image from: {}", url);

    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(SearchError::Status(response.status().as_u16()));
    }

    let bytes = response.bytes().await?;
    Ok(image::load_from_memory(&bytes)?.to_rgb8())
}
