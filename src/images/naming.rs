//! Artifact naming and filename sanitization

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use crate::config::NamingMode;

/// Name of the shared generated-result file
pub const GENERATED_FILENAME: &str = "generated_design.png";

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid regex"));

static SAFE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-][A-Za-z0-9._-]*$").expect("valid regex"));

/// Reduce a client-supplied filename to a safe single path component
///
/// Returns `None` when nothing usable remains.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = UNSAFE_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Whether a requested name can be looked up in a store directory
pub fn is_safe_name(name: &str) -> bool {
    SAFE_NAME.is_match(name)
}

fn request_prefix() -> String {
    format!(
        "{}-{}",
        chrono::Utc::now().format("%Y%m%dT%H%M%S"),
        Uuid::new_v4().simple()
    )
}

/// Storage name for an upload whose filename was already sanitized
pub fn upload_name(mode: NamingMode, sanitized: &str) -> String {
    match mode {
        NamingMode::Fixed => sanitized.to_string(),
        NamingMode::PerRequest => format!("{}-{}", request_prefix(), sanitized),
    }
}

/// Storage name for a generated result
pub fn output_name(mode: NamingMode) -> String {
    match mode {
        NamingMode::Fixed => GENERATED_FILENAME.to_string(),
        NamingMode::PerRequest => format!("{}.png", request_prefix()),
    }
}
