//! alugen - Aluminum interior design generator
//!
//! Accepts a room photo and a keyword, asks Gemini for an aluminum-themed
//! redesign, and serves both the upload and the result over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod gemini;
pub mod images;
pub mod search;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

pub use config::{Config, GeminiConfig, NamingMode};
pub use error::Error;

use api::AppState;
use gemini::GeminiClient;
use images::ImageStore;

/// The alugen server instance
pub struct Server {
    config: Arc<Config>,
    gemini: Arc<GeminiClient>,
    uploads: ImageStore,
    generated: ImageStore,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Create a new server instance, creating storage directories if absent
    pub async fn new(config: Config) -> Result<Self> {
        let uploads = ImageStore::open(&config.uploads_dir).await?;
        let generated = ImageStore::open(&config.generated_dir).await?;
        let gemini = GeminiClient::new(&config.gemini)?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        if !gemini.is_configured() {
            tracing::warn!(
                "{} not set; /generate will fail until a key is configured",
                config::GEMINI_API_KEY_VAR
            );
        }

        Ok(Self {
            config: Arc::new(config),
            gemini: Arc::new(gemini),
            uploads,
            generated,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Build the router
    fn router(&self) -> Router {
        api::router(AppState {
            config: self.config.clone(),
            gemini: self.gemini.clone(),
            uploads: self.uploads.clone(),
            generated: self.generated.clone(),
        })
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("alugen listening on {}", local_addr);
        info!(
            "Serving uploads from {} and results from {}",
            self.uploads.dir().display(),
            self.generated.dir().display()
        );

        let router = self.router();
        let mut shutdown_rx = self.shutdown_rx.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await?;

        info!("alugen shutdown complete");
        Ok(())
    }

    /// Signal the server to shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}
