//! Runtime server configuration.
//!
//! Read from an optional TOML file, then overridden by `ANEKANTA_*`
//! environment variables (`ANEKANTA_PORT=9000`, `ANEKANTA_STORE_PATH=...`).

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, ConfigBuilder, Environment, builder::DefaultState};
use serde::Deserialize;

const ENV_PREFIX: &str = "ANEKANTA";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  /// SQLite database file; a leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/anekanta/anekanta.db") }

impl ServerConfig {
  /// Load `path` (if it exists) layered under the process environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let file = Config::builder().add_source(config::File::from(path).required(false));
    Self::build(file, Environment::with_prefix(ENV_PREFIX))
  }

  fn build(builder: ConfigBuilder<DefaultState>, env: Environment) -> anyhow::Result<Self> {
    builder
      .add_source(env.try_parsing(true))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
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
