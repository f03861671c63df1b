//! cartograph server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `CARTOGRAPH_*` environment variables, builds the services, and serves the
//! JSON API over HTTP until interrupted.
//!
//! Nested keys use a double underscore, e.g.
//! `CARTOGRAPH_SYNTHESIZER__ENDPOINT=https://...`.

use std::path::PathBuf;

use anyhow::Context as _;
use cartograph_server::{ServerConfig, Services};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Cartograph cultural knowledge-graph query server")]
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

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("CARTOGRAPH")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let services = Services::init(&server_cfg)
    .await
    .context("failed to initialise services")?;

  let address = server_cfg.address();
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("Listening on http://{address}");

  axum::serve(listener, services.router())
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  services.shutdown();
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
  }
}
