//! Design generation endpoint
//!
//! POST /generate - multipart `image` (file) + `keyword` (text)

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::{debug, info};

use super::AppState;
use crate::error::Error;
use crate::images::{generate_design, sanitize_filename, DesignRequest};

const MISSING_FIELDS: &str = "Missing image or keyword";

/// Build the generate router
pub fn router() -> Router<AppState> {
    Router::new().route("/generate", post(generate))
}

/// Generation response
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub generated_image: String,
}

/// Uploaded image part
struct ImagePart {
    filename: String,
    content_type: Option<String>,
    data: Vec<u8>,
}

async fn generate(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerateResponse>, Error> {
    info!("/generate called");

    let multipart = multipart.map_err(|_| Error::Validation(MISSING_FIELDS.to_string()))?;
    let request = read_form(multipart).await?;

    let result = generate_design(
        &state.gemini,
        &state.uploads,
        &state.generated,
        state.config.naming,
        &request,
    )
    .await?;

    info!(
        "Design for upload {} ready as {}",
        result.upload_name, result.output_name
    );

    Ok(Json(GenerateResponse {
        generated_image: state.config.generated_url(&result.output_name),
    }))
}

/// Read every form field before anything touches the disk
async fn read_form(mut multipart: Multipart) -> Result<DesignRequest, Error> {
    let mut image: Option<ImagePart> = None;
    let mut keyword: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                image = Some(ImagePart {
                    filename,
                    content_type,
                    data: data.to_vec(),
                });
            }
            Some("keyword") => {
                keyword = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    // A zero-byte file part counts as no image at all
    let image = image.filter(|part| !part.filename.is_empty() && !part.data.is_empty());
    let keyword = keyword
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());

    let (Some(image), Some(keyword)) = (image, keyword) else {
        return Err(Error::Validation(MISSING_FIELDS.to_string()));
    };

    let filename = sanitize_filename(&image.filename)
        .ok_or_else(|| Error::Validation("Invalid image filename".to_string()))?;

    Ok(DesignRequest {
        filename,
        image: image.data,
        content_type: image.content_type,
        keyword,
    })
}

fn multipart_error(err: MultipartError) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge
    } else {
        debug!("Unreadable multipart body: {}", err.body_text());
        Error::Validation(MISSING_FIELDS.to_string())
    }
}
