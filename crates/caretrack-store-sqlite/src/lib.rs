//! SQLite backend for the CareTrack case store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a single dedicated
//! thread without blocking the async runtime. [`SqliteStore`] owns the one
//! database file, exposes raw parameterised access ([`SqliteStore::query`],
//! [`SqliteStore::run`], [`SqliteStore::transaction`]) and implements the
//! typed [`caretrack_core::store::CaseStore`] repository on top of it.

mod encode;
mod repo;
mod row;
mod schema;
mod store;

pub mod error;

pub use error::{ConstraintKind, ConstraintViolation, Error, Result};
pub use row::{Row, RunResult};
pub use rusqlite::types::Value;
pub use store::{DB_FILE_NAME, SqliteStore, Tx, backup_file_name};
