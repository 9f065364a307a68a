//! caretrack server binary.
//!
//! Reads `caretrack.toml` (or the path given with `--config`) plus
//! `CARETRACK_*` environment variables, opens the SQLite store in the
//! configured data directory, and serves the JSON API over HTTP.
//!
//! # First run
//!
//! ```text
//! caretrack add-staff S001 "Admin" admin@example.com --role admin
//! caretrack serve
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use caretrack_api::password::hash_password;
use caretrack_core::{
  staff::{NewStaff, StaffRole},
  store::CaseStore,
};
use caretrack_server::{AppState, ServerConfig};
use caretrack_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "CareTrack case record server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "caretrack.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API.
  Serve,
  /// Print the argon2 hash for a password entered on stdin.
  HashPassword,
  /// Create a staff account; the password is read from stdin.
  AddStaff {
    staff_number: String,
    name:         String,
    email:        String,
    #[arg(long, default_value = "staff")]
    role:         StaffRole,
  },
  /// Copy the database file to a timestamped backup next to it.
  Backup,
  /// Print the row count of every table.
  Stats,
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

  if let Command::HashPassword = cli.command {
    let password = read_password()?;
    println!("{}", hash_password(&password)?);
    return Ok(());
  }

  let cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let store = SqliteStore::open(&cfg.data_dir)
    .await
    .with_context(|| format!("failed to open store in {:?}", cfg.data_dir))?;

  let outcome = run(cli.command, &cfg, &store).await;
  store.close().await.context("failed to close store")?;
  outcome
}

async fn run(command: Command, cfg: &ServerConfig, store: &SqliteStore) -> anyhow::Result<()> {
  match command {
    Command::Serve => {
      let app = caretrack_server::router(AppState { store: Arc::new(store.clone()) });
      let address = cfg.address();

      tracing::info!("Listening on http://{address}");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

      axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    }
    Command::AddStaff { staff_number, name, email, role } => {
      let password = read_password()?;
      let input = NewStaff::new(staff_number, name, email, role, hash_password(&password)?);
      let staff = store.insert_staff(input).await.context("failed to add staff")?;
      println!("added staff {} ({}, {})", staff.id, staff.email, staff.role);
    }
    Command::Backup => {
      let path = store.backup().await.context("backup failed")?;
      println!("{}", path.display());
    }
    Command::Stats => {
      for (table, count) in store.row_counts().await.context("failed to count rows")? {
        println!("{table:<20} {count}");
      }
    }
    Command::HashPassword => {}
  }
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::warn!(error = %e, "cannot listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
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
