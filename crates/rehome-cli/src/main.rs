//! `rehome` — command-line client for the rehome adoption server.
//!
//! # Usage
//!
//! ```
//! rehome list
//! rehome adopt 3 --account 0xdeadbeef00000000000000000000000000000001
//! rehome attempts
//! rehome reconcile
//! ```

mod client;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig, CatalogRow};
use rehome_core::{
  address::Address,
  attempt::{AdoptionAttempt, AttemptState},
  catalog::ItemId,
  event::OwnershipEvent,
};
use serde::Deserialize;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
  name = "rehome",
  about = "Command-line client for the rehome adoption server"
)]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the rehome server (default: http://localhost:5380).
  #[arg(long, env = "REHOME_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Show the catalog with ownership and attempt state.
  List,
  /// Request adoption of an item and wait for the outcome.
  Adopt {
    item_id: ItemId,
    /// Ledger account to submit from (first provider account if omitted).
    #[arg(long)]
    account: Option<Address>,
  },
  /// Show attempt snapshots, optionally for a single item.
  Attempts { item_id: Option<ItemId> },
  /// Run a reconciliation pass and print what changed.
  Reconcile,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:5380".to_string()),
  };
  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::List => list(&client).await,
    Command::Adopt { item_id, account } => {
      adopt(&client, item_id, account).await
    }
    Command::Attempts { item_id } => attempts(&client, item_id).await,
    Command::Reconcile => reconcile(&client).await,
  }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn list(client: &ApiClient) -> Result<()> {
  let rows = client.catalog().await?;
  println!(
    "{:<4} {:<12} {:<22} {:<8} {:<16} {}",
    "ID", "NAME", "BREED", "AGE", "LOCATION", "STATUS"
  );
  for row in rows {
    println!(
      "{:<4} {:<12} {:<22} {:<8} {:<16} {}",
      row.id,
      row.name,
      row.breed,
      row.age_band,
      row.location_tag,
      status_of(&row),
    );
  }
  Ok(())
}

fn status_of(row: &CatalogRow) -> String {
  match (&row.owner, &row.attempt) {
    (Some(owner), _) => format!("owned by {owner}"),
    (None, Some(attempt)) if !attempt.state.is_terminal() => {
      state_label(attempt.state).to_string()
    }
    _ => "available".to_string(),
  }
}

async fn adopt(
  client: &ApiClient,
  item_id: ItemId,
  account: Option<Address>,
) -> Result<()> {
  let attempt = client.adopt(item_id, account).await?;
  print_attempt(&attempt);
  Ok(())
}

async fn attempts(client: &ApiClient, item_id: Option<ItemId>) -> Result<()> {
  let attempts = match item_id {
    Some(id) => vec![client.attempt(id).await?],
    None => client.attempts().await?,
  };
  if attempts.is_empty() {
    println!("no attempts");
    return Ok(());
  }
  for attempt in attempts {
    print_attempt(&attempt);
  }
  Ok(())
}

async fn reconcile(client: &ApiClient) -> Result<()> {
  let outcome = client.reconcile().await?;
  if outcome.events.is_empty() {
    println!("no changes");
    return Ok(());
  }
  for event in outcome.events {
    match event {
      OwnershipEvent::Adopted { item_id, owner } => {
        println!("adopted: item {item_id} by {owner}");
      }
      OwnershipEvent::AnomalousChange {
        item_id,
        previous,
        current,
      } => {
        println!(
          "anomalous change: item {item_id} owner {previous} -> {current}"
        );
      }
    }
  }
  Ok(())
}

// ─── Rendering ────────────────────────────────────────────────────────────────

fn print_attempt(attempt: &AdoptionAttempt) {
  println!("item {}: {}", attempt.item_id, state_label(attempt.state));
  if let Some(account) = attempt.submitted_by {
    println!("  account  {account}");
  }
  if let Some(tx) = attempt.tx_hash {
    println!("  tx       {tx}");
  }
  if let Some(error) = &attempt.last_error {
    println!("  error    {error}");
  }
}

fn state_label(state: AttemptState) -> &'static str {
  match state {
    AttemptState::Idle => "idle",
    AttemptState::Submitting => "submitting",
    AttemptState::AwaitingConfirmation => "awaiting confirmation",
    AttemptState::Confirmed => "confirmed",
    AttemptState::Failed => "failed",
  }
}
