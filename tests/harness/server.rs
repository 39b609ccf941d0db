//! AlugenTest - End-to-end test harness
//!
//! Runs the real `Server` on a random port with its storage directories in a
//! temp dir and Gemini pointed at a `StubUpstream`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alugen::{Config, GeminiConfig, NamingMode, Server};
use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tempfile::TempDir;
use tokio::task::JoinHandle;

use super::stub::StubUpstream;

/// Test harness that runs a real alugen server
pub struct AlugenTest {
    pub addr: SocketAddr,
    pub client: Client,
    pub upstream: StubUpstream,
    server: Arc<Server>,
    _handle: JoinHandle<()>,
    /// Temp directory for uploads and generated files (cleaned up on drop)
    temp_dir: TempDir,
}

impl AlugenTest {
    /// Start with fixed artifact naming and an API key
    pub async fn start() -> Result<Self> {
        Self::start_with(NamingMode::Fixed, Some("test-key")).await
    }

    /// Start with the given naming mode and optional API key
    pub async fn start_with(naming: NamingMode, api_key: Option<&str>) -> Result<Self> {
        Self::start_configured(naming, api_key, 5).await
    }

    /// Start with full control over naming, API key and Gemini timeout
    pub async fn start_configured(
        naming: NamingMode,
        api_key: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let upstream = StubUpstream::start().await?;

        // Find a random available port
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        drop(listener);

        let config = Config {
            bind_addr: addr,
            public_url: format!("http://{}", addr),
            uploads_dir: temp_dir.path().join("uploads"),
            generated_dir: temp_dir.path().join("generated"),
            naming,
            max_upload_bytes: 1024 * 1024,
            gemini: GeminiConfig {
                api_key: api_key.map(str::to_string),
                base_url: upstream.base_url(),
                timeout_secs,
                ..GeminiConfig::default()
            },
        };

        let server = Arc::new(Server::new(config).await?);
        let server_clone = server.clone();

        // Spawn the server in a background task
        let handle = tokio::spawn(async move {
            if let Err(e) = server_clone.run().await {
                eprintln!("Server error: {}", e);
            }
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        // Poll until server is ready (max 2 seconds)
        let mut ready = false;
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if client
                .get(format!("http://{}/", addr))
                .send()
                .await
                .is_ok()
            {
                ready = true;
                break;
            }
        }

        if !ready {
            panic!("Server failed to start within 2 seconds");
        }

        Ok(Self {
            addr,
            client,
            upstream,
            server,
            _handle: handle,
            temp_dir,
        })
    }

    /// Get the base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Directory holding uploaded images
    pub fn uploads_dir(&self) -> PathBuf {
        self.temp_dir.path().join("uploads")
    }

    /// Directory holding generated images
    pub fn generated_dir(&self) -> PathBuf {
        self.temp_dir.path().join("generated")
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(format!("{}{}", self.base_url(), path))
            .send()
            .await?)
    }

    /// Fetch an absolute URL
    pub async fn fetch(&self, url: &str) -> Result<reqwest::Response> {
        Ok(self.client.get(url).send().await?)
    }

    /// POST a multipart form to /generate
    pub async fn post_form(&self, form: Form) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}/generate", self.base_url()))
            .multipart(form)
            .send()
            .await?)
    }

    /// POST an image and keyword to /generate
    pub async fn generate(
        &self,
        filename: &str,
        image: &[u8],
        keyword: &str,
    ) -> Result<reqwest::Response> {
        let form = Form::new()
            .part("image", image_part(filename, image)?)
            .text("keyword", keyword.to_string());
        self.post_form(form).await
    }
}

impl Drop for AlugenTest {
    fn drop(&mut self) {
        self.server.shutdown();
    }
}

/// Multipart file part tagged as PNG
pub fn image_part(filename: &str, data: &[u8]) -> Result<Part> {
    Ok(Part::bytes(data.to_vec())
        .file_name(filename.to_string())
        .mime_str("image/png")?)
}
