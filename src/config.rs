//! Server configuration
//!
//! Layered with figment: built-in defaults, an optional TOML file, then
//! `ALUGEN_`-prefixed environment variables (`__` separates nested keys).

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Environment variable holding the Gemini API key
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// How stored artifacts are named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingMode {
    /// Client filename for uploads, one shared name for the generated result
    #[default]
    Fixed,
    /// Unique name per request for both uploads and results
    PerRequest,
}

/// Gemini client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            temperature: 0.8,
            timeout_secs: 120,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Base URL clients use to reach this server; prefixes returned links
    pub public_url: String,
    pub uploads_dir: PathBuf,
    pub generated_dir: PathBuf,
    pub naming: NamingMode,
    pub max_upload_bytes: usize,
    pub gemini: GeminiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            public_url: "http://127.0.0.1:8000".to_string(),
            uploads_dir: PathBuf::from("uploads"),
            generated_dir: PathBuf::from("generated"),
            naming: NamingMode::Fixed,
            max_upload_bytes: 20 * 1024 * 1024,
            gemini: GeminiConfig::default(),
        }
    }
}

impl Config {
    /// Build the layered figment, with an optional TOML file in the middle
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("ALUGEN_").split("__"))
    }

    /// Load configuration, falling back to `GEMINI_API_KEY` for the API key
    pub fn load(file: Option<&Path>) -> Result<Self, figment::Error> {
        let mut config: Config = Self::figment(file).extract()?;
        if config.gemini.api_key.is_none() {
            config.gemini.api_key = std::env::var(GEMINI_API_KEY_VAR)
                .ok()
                .filter(|key| !key.is_empty());
        }
        Ok(config)
    }

    /// Absolute URL for a file under the generated route
    pub fn generated_url(&self, name: &str) -> String {
        format!("{}/generated/{}", self.public_url.trim_end_matches('/'), name)
    }
}
