//! cherry-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) and `CHERRY_*`
//! environment variables, opens the SQLite store and the filesystem content
//! store, and serves the JSON API over HTTP.
//!
//! ```toml
//! host         = "127.0.0.1"
//! port         = 8080
//! store_path   = "~/.local/share/cherry/cherry.db"
//! content_root = "~/.local/share/cherry/content"
//! auditor      = "cherry"
//! ```

mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use cherry_api::AppState;
use cherry_content_fs::FilesystemContentStore;
use cherry_core::service::DocumentService;
use cherry_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Cherry commerce entity server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ServerConfig::load(&cli.config)?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  let content = FilesystemContentStore::open(cfg.content_root.clone())
    .await
    .with_context(|| format!("failed to open content store at {:?}", cfg.content_root))?;

  let documents =
    DocumentService::new(Arc::new(store), Arc::new(content)).with_auditor(cfg.auditor.clone());

  let app = axum::Router::new()
    .nest("/api", cherry_api::api_router(AppState::new(documents)))
    .layer(TraceLayer::new_for_http());

  let address = cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
