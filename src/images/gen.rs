//! Interior design generation pipeline
//!
//! 1. Save the reference image to the uploads store
//! 2. Ask Gemini for an aluminum-themed variant of it
//! 3. Save the returned image to the generated store

use tracing::{debug, info};

use super::naming::{output_name, upload_name, GENERATED_FILENAME};
use super::store::{sniff_mime, ImageStore};
use crate::config::NamingMode;
use crate::error::Error;
use crate::gemini::{GeminiClient, GeminiError};

/// A validated generation request
#[derive(Debug, Clone)]
pub struct DesignRequest {
    /// Sanitized client filename
    pub filename: String,
    pub image: Vec<u8>,
    /// Content type the client declared for the image part
    pub content_type: Option<String>,
    pub keyword: String,
}

/// Where the pipeline left its artifacts
#[derive(Debug, Clone)]
pub struct DesignResult {
    pub upload_name: String,
    pub output_name: String,
}

/// Prompt sent along with the reference image
pub fn design_prompt(keyword: &str) -> String {
    format!(
        "You are an AI interior designer. Using the provided reference image as inspiration, \
         generate a realistic aluminum-themed interior design for a {keyword}. \
         Focus on aluminum frames, partitions, furniture, and decor. \
         Maintain the same room layout, lighting, and realism."
    )
}

/// Run the full pipeline for one request
pub async fn generate_design(
    gemini: &GeminiClient,
    uploads: &ImageStore,
    generated: &ImageStore,
    naming: NamingMode,
    request: &DesignRequest,
) -> Result<DesignResult, Error> {
    if !gemini.is_configured() {
        return Err(Error::Upstream(GeminiError::NotConfigured));
    }

    let upload_name = upload_name(naming, &request.filename);
    let upload_path = uploads.store(&upload_name, &request.image).await?;
    info!("Uploaded image saved to {}", upload_path.display());

    let prompt = design_prompt(&request.keyword);
    debug!("Prompt ready: {}", prompt);

    let mime_type = sniff_mime(&request.image)
        .map(str::to_string)
        .or_else(|| {
            request
                .content_type
                .clone()
                .filter(|ct| ct.starts_with("image/"))
        })
        .unwrap_or_else(|| "image/png".to_string());

    info!(
        "Generating design for '{}' with {}",
        request.keyword,
        gemini.model()
    );
    let image = gemini
        .generate_image(&prompt, &request.image, &mime_type)
        .await?;

    let output_name = output_name(naming);
    let output_path = generated.store(&output_name, &image.data).await?;
    if output_name != GENERATED_FILENAME {
        generated.store(GENERATED_FILENAME, &image.data).await?;
    }

    info!(
        "Generated design saved to {} ({} bytes, {})",
        output_path.display(),
        image.data.len(),
        image.mime_type
    );

    Ok(DesignResult {
        upload_name,
        output_name,
    })
}
