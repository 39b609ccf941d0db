//! Image storage and generation module
//!
//! Provides:
//! - Flat-directory storage for uploads and generated results
//! - Artifact naming and filename sanitization
//! - The interior design generation pipeline

mod gen;
mod naming;
mod store;

pub use gen::{design_prompt, generate_design, DesignRequest, DesignResult};
pub use naming::{
    is_safe_name, output_name, sanitize_filename, upload_name, GENERATED_FILENAME,
};
pub use store::{mime_for_name, sniff_mime, ImageData, ImageStore};
