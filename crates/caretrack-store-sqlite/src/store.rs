//! [`SqliteStore`]: lifecycle, raw access, transactions and backups.
//!
//! The typed [`caretrack_core::store::CaseStore`] implementation lives in
//! `crate::repo` and goes through the same primitives.

use std::{
  fs::{File, OpenOptions},
  io,
  path::{Path, PathBuf},
  sync::Arc,
};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use tokio::sync::Mutex;

use crate::{
  Error, Result,
  row::{Row, RunResult, query_rows, run_statement},
  schema::{SCHEMA, SCHEMA_VERSION, TABLES},
};

/// File name of the database inside the data directory.
pub const DB_FILE_NAME: &str = "caretrack.db";

/// Name of the backup file written at `at`: the RFC 3339 timestamp (UTC,
/// millisecond precision) with `:` replaced by `-`.
pub fn backup_file_name(at: DateTime<Utc>) -> String {
  numbered_backup_name(at, 0)
}

/// Attempts at finding a free backup name before giving up.
const BACKUP_NAME_ATTEMPTS: u32 = 100;

fn numbered_backup_name(at: DateTime<Utc>, n: u32) -> String {
  let stamp = at
    .to_rfc3339_opts(SecondsFormat::Millis, true)
    .replace(':', "-");
  match n {
    0 => format!("caretrack_backup_{stamp}.db"),
    n => format!("caretrack_backup_{stamp}-{n}.db"),
  }
}

/// Copy `source` into a sibling file named for `at` that did not exist
/// before. A name already taken in the same millisecond gets a `-N` suffix;
/// an existing backup is never overwritten. A partially written target is
/// removed.
pub(crate) fn copy_to_new_backup(
  source: &Path,
  at: DateTime<Utc>,
) -> io::Result<(PathBuf, u64)> {
  let mut input = File::open(source)?;
  for n in 0..BACKUP_NAME_ATTEMPTS {
    let target = source.with_file_name(numbered_backup_name(at, n));
    let mut output = match OpenOptions::new().write(true).create_new(true).open(&target) {
      Ok(file) => file,
      Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
      Err(e) => return Err(e),
    };
    let copied = io::copy(&mut input, &mut output).and_then(|bytes| {
      output.sync_all()?;
      Ok(bytes)
    });
    return match copied {
      Ok(bytes) => Ok((target, bytes)),
      Err(e) => {
        let _ = std::fs::remove_file(&target);
        Err(e)
      }
    };
  }
  Err(io::Error::new(
    io::ErrorKind::AlreadyExists,
    format!("no free backup name for {}", at.to_rfc3339()),
  ))
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Location {
  File(PathBuf),
  Memory,
}

/// `Unopened → Ready → Closed`. Initialisation happens while the state lock
/// is held; a failed attempt leaves the store `Unopened`.
enum State {
  Unopened,
  Ready(tokio_rusqlite::Connection),
  Closed,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The CareTrack store, backed by a single SQLite file.
///
/// All statements run on one connection thread owned by [`tokio_rusqlite`],
/// which serialises them in arrival order. Cloning is cheap; clones share
/// the connection and the lifecycle state.
#[derive(Clone)]
pub struct SqliteStore {
  location: Location,
  state:    Arc<Mutex<State>>,
}

impl SqliteStore {
  /// Create an unopened store whose database lives at
  /// `<data_dir>/caretrack.db`. No I/O happens until [`Self::initialize`].
  pub fn new(data_dir: impl AsRef<Path>) -> Self {
    Self {
      location: Location::File(data_dir.as_ref().join(DB_FILE_NAME)),
      state:    Arc::new(Mutex::new(State::Unopened)),
    }
  }

  /// Create and initialise a store in `data_dir`.
  pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
    let store = Self::new(data_dir);
    store.initialize().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests. Backups are unavailable.
  pub async fn open_in_memory() -> Result<Self> {
    let store = Self {
      location: Location::Memory,
      state:    Arc::new(Mutex::new(State::Unopened)),
    };
    store.initialize().await?;
    Ok(store)
  }

  /// Path of the database file; `None` for in-memory stores.
  pub fn path(&self) -> Option<&Path> {
    match &self.location {
      Location::File(path) => Some(path),
      Location::Memory => None,
    }
  }

  pub async fn is_ready(&self) -> bool {
    matches!(*self.state.lock().await, State::Ready(_))
  }

  /// Create the data directory if needed, open the database file and apply
  /// the schema.
  ///
  /// Safe to call on an already-initialised store: the schema is re-applied
  /// idempotently. Fails with [`Error::Init`] if the directory or file cannot
  /// be opened, and with [`Error::NotInitialized`] once the store is closed.
  pub async fn initialize(&self) -> Result<()> {
    let mut state = self.state.lock().await;

    let conn = match &*state {
      State::Closed => return Err(Error::NotInitialized),
      State::Ready(conn) => conn.clone(),
      State::Unopened => self.open_connection().await?,
    };

    if let Err(e) = self.apply_schema(&conn).await {
      if matches!(*state, State::Unopened) {
        let _ = conn.close().await;
      }
      return Err(e);
    }

    *state = State::Ready(conn);
    tracing::debug!(location = %self.describe(), version = SCHEMA_VERSION, "store ready");
    Ok(())
  }

  async fn open_connection(&self) -> Result<tokio_rusqlite::Connection> {
    let opened = match &self.location {
      Location::File(path) => {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
          tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| self.init_error(e))?;
        }
        tokio_rusqlite::Connection::open(path).await
      }
      Location::Memory => tokio_rusqlite::Connection::open_in_memory().await,
    };
    opened.map_err(|e| {
      tracing::error!(location = %self.describe(), error = %e, "cannot open database");
      self.init_error(e)
    })
  }

  async fn apply_schema(&self, conn: &tokio_rusqlite::Connection) -> Result<()> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(|e| self.init_error(e))
  }

  fn init_error(&self, e: impl std::fmt::Display) -> Error {
    Error::Init { path: self.describe(), message: e.to_string() }
  }

  fn describe(&self) -> String {
    match &self.location {
      Location::File(path) => path.display().to_string(),
      Location::Memory => ":memory:".to_owned(),
    }
  }

  /// Close the connection. Idempotent; afterwards every operation fails with
  /// [`Error::NotInitialized`].
  pub async fn close(&self) -> Result<()> {
    let mut state = self.state.lock().await;
    let previous = std::mem::replace(&mut *state, State::Closed);
    if let State::Ready(conn) = previous {
      conn.close().await?;
      tracing::info!(location = %self.describe(), "store closed");
    }
    Ok(())
  }

  async fn connection(&self) -> Result<tokio_rusqlite::Connection> {
    match &*self.state.lock().await {
      State::Ready(conn) => Ok(conn.clone()),
      State::Unopened | State::Closed => Err(Error::NotInitialized),
    }
  }

  /// Run `f` on the connection thread.
  pub(crate) async fn call<F, R>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R> + Send + 'static,
    R: Send + 'static,
  {
    let conn = self.connection().await?;
    conn.call(move |conn| Ok(f(conn))).await?
  }

  // ── Raw access ────────────────────────────────────────────────────────

  /// Execute a read statement and return every row. Parameters are bound
  /// positionally, never interpolated. No match yields an empty `Vec`.
  pub async fn query(
    &self,
    sql: impl Into<String>,
    params: Vec<Value>,
  ) -> Result<Vec<Row>> {
    let sql = sql.into();
    self
      .call(move |conn| query_rows(conn, &sql, &params))
      .await
  }

  /// Execute an INSERT/UPDATE/DELETE. A statement matching no rows returns
  /// `rows_affected == 0` rather than an error.
  pub async fn run(
    &self,
    sql: impl Into<String>,
    params: Vec<Value>,
  ) -> Result<RunResult> {
    let sql = sql.into();
    self
      .call(move |conn| run_statement(conn, &sql, &params))
      .await
  }

  /// Run `body` between `BEGIN` and `COMMIT`.
  ///
  /// If `body` returns an error (including one from a nested
  /// [`Tx::query`]/[`Tx::run`]) the transaction is rolled back and the error
  /// returned unchanged, so no partial writes survive. Transactions cannot
  /// be nested: [`Tx`] offers no way to open another one.
  pub async fn transaction<F, T>(&self, body: F) -> Result<T>
  where
    F: FnOnce(&Tx<'_>) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self
      .call(move |conn| {
        let tx = conn.transaction()?;
        let outcome = body(&Tx { conn: &tx });
        match outcome {
          Ok(value) => {
            tx.commit()?;
            Ok(value)
          }
          Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
              tracing::warn!(error = %rollback_err, "rollback failed");
            }
            tracing::debug!(error = %err, "transaction rolled back");
            Err(err)
          }
        }
      })
      .await
  }

  // ── Maintenance ───────────────────────────────────────────────────────

  /// Copy the database file to a timestamped sibling and return its path.
  /// Fails with [`Error::Backup`] carrying the underlying I/O error.
  ///
  /// The copy runs on the connection thread, so it never interleaves with a
  /// statement or transaction issued through this store. The source file is
  /// never modified.
  pub async fn backup(&self) -> Result<PathBuf> {
    let conn = self.connection().await?;
    let Location::File(source) = &self.location else {
      return Err(Error::Backup(io::Error::new(
        io::ErrorKind::Unsupported,
        "in-memory store has no database file",
      )));
    };

    let from = source.clone();
    let (target, bytes) = conn
      .call(move |_| Ok(copy_to_new_backup(&from, Utc::now())))
      .await?
      .map_err(|e| {
        tracing::error!(source = %source.display(), error = %e, "backup failed");
        Error::Backup(e)
      })?;

    tracing::info!(path = %target.display(), bytes, "database backed up");
    Ok(target)
  }

  /// Row count of every table, in schema order.
  pub async fn row_counts(&self) -> Result<Vec<(&'static str, i64)>> {
    self
      .call(|conn| {
        TABLES
          .iter()
          .map(|&table| -> Result<(&'static str, i64)> {
            let count: i64 = conn.query_row(
              &format!("SELECT COUNT(*) FROM {table}"),
              [],
              |r| r.get(0),
            )?;
            Ok((table, count))
          })
          .collect()
      })
      .await
  }
}

// ─── Transaction handle ──────────────────────────────────────────────────────

/// Handle passed to a [`SqliteStore::transaction`] body. Statements issued
/// through it run inside the open transaction.
pub struct Tx<'a> {
  conn: &'a rusqlite::Connection,
}

impl Tx<'_> {
  pub fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
    query_rows(self.conn, sql, params)
  }

  pub fn run(&self, sql: &str, params: &[Value]) -> Result<RunResult> {
    run_statement(self.conn, sql, params)
  }

  pub(crate) fn connection(&self) -> &rusqlite::Connection { self.conn }
}
