//! Static file endpoints
//!
//! GET /uploads/{filename}   - Serve a previously uploaded image
//! GET /generated/{filename} - Serve a generated design

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use super::AppState;
use crate::error::Error;
use crate::images::{ImageData, ImageStore};

/// Build the static files router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/uploads/{filename}", get(get_upload))
        .route("/generated/{filename}", get(get_generated))
}

async fn get_upload(
    Path(filename): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, Error> {
    let image = load(&state.uploads, &filename).await?;
    Ok(image_response(image, "public, max-age=3600"))
}

/// Generated files can be replaced under the same name
async fn get_generated(
    Path(filename): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, Error> {
    let image = load(&state.generated, &filename).await?;
    Ok(image_response(image, "no-cache"))
}

async fn load(store: &ImageStore, filename: &str) -> Result<ImageData, Error> {
    store.get(filename).await?.ok_or(Error::NotFound)
}

fn image_response(image: ImageData, cache_control: &'static str) -> Response {
    (
        [
            (header::CONTENT_TYPE, image.mime_type),
            (header::ETAG, format!("\"{}\"", image.hash)),
            (header::CACHE_CONTROL, cache_control.to_string()),
        ],
        image.data,
    )
        .into_response()
}
