//! Server configuration: an optional TOML file layered with `CHERRY_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  /// SQLite database file. `~/` is expanded.
  pub store_path:   PathBuf,
  /// Directory holding document payloads. `~/` is expanded.
  #[serde(default)]
  pub content_root: PathBuf,
  /// Name recorded in audit fields.
  #[serde(default = "default_auditor")]
  pub auditor:      String,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_auditor() -> String { cherry_core::service::DEFAULT_AUDITOR.to_owned() }

impl ServerConfig {
  /// Read `path` (if it exists) and the environment, then validate.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("CHERRY"))
      .build()
      .context("failed to read config file")?;

    let mut cfg: ServerConfig = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;

    if cfg.content_root.as_os_str().is_empty() {
      bail!("`content_root` must be set to the directory holding document content");
    }
    cfg.store_path = expand_tilde(&cfg.store_path);
    cfg.content_root = expand_tilde(&cfg.content_root);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
