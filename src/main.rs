//! alugen - Aluminum interior design generator server

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use alugen::{Config, Server};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Aluminum interior design generator API
#[derive(Parser, Debug)]
#[command(name = "alugen", version, about = "Aluminum interior design generator API")]
struct Args {
    /// TOML configuration file (defaults to ./alugen.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Directory for uploaded images
    #[arg(long)]
    uploads_dir: Option<PathBuf>,

    /// Directory for generated images
    #[arg(long)]
    generated_dir: Option<PathBuf>,

    /// Base URL used in returned links
    #[arg(long)]
    public_url: Option<String>,
}

impl Args {
    fn config_file(&self) -> Option<PathBuf> {
        self.config.clone().or_else(|| {
            let default = PathBuf::from("alugen.toml");
            default.exists().then_some(default)
        })
    }

    fn apply(self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(dir) = self.uploads_dir {
            config.uploads_dir = dir;
        }
        if let Some(dir) = self.generated_dir {
            config.generated_dir = dir;
        }
        if let Some(url) = self.public_url {
            config.public_url = url;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alugen=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = Config::load(args.config_file().as_deref())?;
    args.apply(&mut config);

    // Create and run server
    let server = Arc::new(Server::new(config).await?);

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, shutting down");
            signal_server.shutdown();
        }
    });

    server.run().await?;

    Ok(())
}
