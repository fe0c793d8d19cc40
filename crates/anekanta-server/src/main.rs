//! anekanta server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store and serves the JSON API over HTTP.
//!
//! # Creating accounts
//!
//! Users are added from the command line; the password is read from stdin:
//!
//! ```text
//! anekanta add-user alice --display-name "Alice" [--admin]
//! ```

mod settings;

use std::{
  io::{self, BufRead, Read as _, Write},
  path::PathBuf,
  sync::Arc,
};

use anekanta_core::{
  moderation,
  store::DebateStore,
  user::{NewUser, Role},
};
use anekanta_store_sqlite::SqliteStore;
use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::{Parser, Subcommand};
use rand_core::OsRng;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Anekanta structured debate server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Create an account; the password is read from stdin.
  AddUser {
    username:     String,
    #[arg(long)]
    display_name: Option<String>,
    /// Grant access to the moderation review queue.
    #[arg(long)]
    admin:        bool,
  },
  /// Score a piece of text and print the moderation result as JSON.
  Moderate {
    /// Text to score; read from stdin when omitted.
    text: Option<String>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  match cli.command.unwrap_or(Command::Serve) {
    Command::Moderate { text } => {
      let text = match text {
        Some(text) => text,
        None => {
          let mut buf = String::new();
          io::stdin().read_to_string(&mut buf).context("failed to read stdin")?;
          buf
        }
      };
      let result = moderation::score(&text);
      println!("{}", serde_json::to_string_pretty(&result)?);
      Ok(())
    }
    Command::AddUser { username, display_name, admin } => {
      let server_cfg = ServerConfig::load(&cli.config)?;
      let store = open_store(&server_cfg).await?;
      add_user(&store, username, display_name, admin).await
    }
    Command::Serve => {
      let server_cfg = ServerConfig::load(&cli.config)?;
      let store = open_store(&server_cfg).await?;
      serve(store, &server_cfg).await
    }
  }
}

async fn open_store(server_cfg: &ServerConfig) -> anyhow::Result<SqliteStore> {
  let store_path = server_cfg.resolved_store_path();
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))
}

async fn serve(store: SqliteStore, server_cfg: &ServerConfig) -> anyhow::Result<()> {
  let app = anekanta_api::api_router(Arc::new(store)).layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn add_user(
  store: &SqliteStore,
  username: String,
  display_name: Option<String>,
  admin: bool,
) -> anyhow::Result<()> {
  let password = read_password()?;
  if password.is_empty() {
    anyhow::bail!("password must not be empty");
  }

  let salt = SaltString::generate(&mut OsRng);
  let password_hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
    .to_string();

  let user = store
    .add_user(NewUser {
      display_name: display_name.unwrap_or_else(|| username.clone()),
      username,
      password_hash,
      role: if admin { Role::Admin } else { Role::User },
    })
    .await
    .context("failed to add user")?;

  println!("{}", serde_json::to_string_pretty(&user)?);
  Ok(())
}

/// Read one line from stdin as the password.
fn read_password() -> anyhow::Result<String> {
  let stdin = io::stdin();
  eprint!("Password: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
