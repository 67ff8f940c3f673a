//! rehome-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), loads the
//! adoption catalog, connects the configured ledger backend, runs one
//! startup reconciliation, and serves the JSON API over HTTP.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use clap::Parser;
use rehome_core::{
  address::Address,
  catalog::Catalog,
  ledger::{LedgerClient, OwnershipContract},
  view::CatalogView,
};
use rehome_engine::{Coordinator, CoordinatorConfig, LogView};
use rehome_ledger_mem::MemLedger;
use rehome_ledger_rpc::{RpcClient, RpcConfig, RpcContract};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "rehome adoption server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

/// Runtime server configuration, deserialised from `config.toml` with
/// `REHOME_*` environment overrides.
#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host: String,
  #[serde(default = "default_port")]
  port: u16,
  /// Catalog JSON file. Item ids double as owner-table indices, so the
  /// catalog size fixes the expected table size.
  catalog_path: PathBuf,
  #[serde(default)]
  ledger: LedgerMode,
  /// JSON-RPC endpoint; `rpc` mode only.
  #[serde(default = "default_rpc_url")]
  rpc_url: String,
  /// Deployed registry contract address; `rpc` mode only.
  #[serde(default)]
  contract_address: Option<Address>,
  #[serde(default = "default_confirmation_timeout_secs")]
  confirmation_timeout_secs: u64,
  #[serde(default = "default_receipt_poll_ms")]
  receipt_poll_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum LedgerMode {
  /// In-process ledger; no external chain required.
  #[default]
  Mem,
  /// JSON-RPC chain with the deployed registry contract.
  Rpc,
}

fn default_host() -> String {
  "127.0.0.1".to_string()
}

fn default_port() -> u16 {
  5380
}

fn default_rpc_url() -> String {
  rehome_ledger_rpc::DEFAULT_ENDPOINT.to_string()
}

fn default_confirmation_timeout_secs() -> u64 {
  120
}

fn default_receipt_poll_ms() -> u64 {
  500
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

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("REHOME"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Load the catalog.
  let raw = std::fs::read_to_string(&server_cfg.catalog_path).with_context(
    || format!("failed to read catalog at {:?}", server_cfg.catalog_path),
  )?;
  let catalog =
    Arc::new(Catalog::from_json(&raw).context("failed to parse catalog")?);
  tracing::info!(items = catalog.len(), "catalog loaded");

  let coordinator_cfg = CoordinatorConfig {
    confirmation_timeout: Duration::from_secs(
      server_cfg.confirmation_timeout_secs,
    ),
  };

  // Wire the selected backend.
  let app = match server_cfg.ledger {
    LedgerMode::Mem => {
      tracing::info!("using the in-memory ledger");
      let ledger = MemLedger::new(catalog.len());
      let coordinator = Arc::new(Coordinator::new(
        catalog,
        ledger.clone(),
        Arc::new(ledger),
        LogView,
        coordinator_cfg,
      ));
      startup_reconcile(&coordinator).await;
      rehome_api::api_router(coordinator)
    }
    LedgerMode::Rpc => {
      let contract_address = server_cfg
        .contract_address
        .context("rpc mode requires contract_address")?;
      let client = RpcClient::new(RpcConfig {
        url:           server_cfg.rpc_url.clone(),
        poll_interval: Duration::from_millis(server_cfg.receipt_poll_ms),
      })?;
      let contract =
        RpcContract::new(client.clone(), contract_address, catalog.len());
      tracing::info!(
        url = %server_cfg.rpc_url,
        contract = %contract_address,
        "using the JSON-RPC ledger"
      );
      let coordinator = Arc::new(Coordinator::new(
        catalog,
        client,
        Arc::new(contract),
        LogView,
        coordinator_cfg,
      ));
      startup_reconcile(&coordinator).await;
      rehome_api::api_router(coordinator)
    }
  }
  .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Prime the record so ownership guards work from the first request. An
/// unreachable ledger at boot is logged, not fatal; a later pass retries.
async fn startup_reconcile<L, C, V>(coordinator: &Coordinator<L, C, V>)
where
  L: LedgerClient,
  C: OwnershipContract,
  V: CatalogView,
{
  match coordinator.reconcile().await {
    Ok(events) => {
      tracing::info!(events = events.len(), "startup reconciliation complete");
    }
    Err(e) => tracing::warn!(error = %e, "startup reconciliation failed"),
  }
}
