//! Error type for `caretrack-store-sqlite`.

use caretrack_core::{
  Id,
  store::{Classify, FailureKind},
};
use rusqlite::{ErrorCode, ffi};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The data directory or database file could not be opened, or the schema
  /// could not be applied. Fatal to the session.
  #[error("failed to initialise store at {path}: {message}")]
  Init { path: String, message: String },

  /// An operation was attempted before `initialize` or after `close`.
  #[error("store is not initialised")]
  NotInitialized,

  /// Malformed SQL or any other engine failure that is not a constraint.
  #[error("query error: {0}")]
  Query(String),

  #[error("constraint violation: {0}")]
  Constraint(ConstraintViolation),

  #[error("backup failed: {0}")]
  Backup(#[source] std::io::Error),

  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: Id },

  #[error(transparent)]
  Core(#[from] caretrack_core::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A stored value could not be decoded into its domain type.
  #[error("decode error: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Constraint violations ───────────────────────────────────────────────────

/// Which declared rule rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
  Unique,
  PrimaryKey,
  Check,
  ForeignKey,
  NotNull,
  Other,
}

impl ConstraintKind {
  fn from_extended_code(code: i32) -> Self {
    match code {
      ffi::SQLITE_CONSTRAINT_UNIQUE => Self::Unique,
      ffi::SQLITE_CONSTRAINT_PRIMARYKEY => Self::PrimaryKey,
      ffi::SQLITE_CONSTRAINT_CHECK => Self::Check,
      ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Self::ForeignKey,
      ffi::SQLITE_CONSTRAINT_NOTNULL => Self::NotNull,
      _ => Self::Other,
    }
  }
}

/// A write rejected by a UNIQUE, CHECK, FOREIGN KEY or NOT NULL rule.
///
/// `message` is SQLite's own text, e.g.
/// `UNIQUE constraint failed: clients.client_number`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
  pub kind:    ConstraintKind,
  pub message: String,
}

impl ConstraintViolation {
  /// The part of the message naming the offending column(s) or expression,
  /// e.g. `clients.client_number`. `None` for foreign-key failures, which
  /// SQLite does not attribute.
  pub fn target(&self) -> Option<&str> {
    self
      .message
      .split_once("failed: ")
      .map(|(_, target)| target.trim())
      .filter(|t| !t.is_empty())
  }

  /// Whether the violation is a uniqueness failure on `table.column`.
  pub fn is_unique_on(&self, column: &str) -> bool {
    matches!(self.kind, ConstraintKind::Unique | ConstraintKind::PrimaryKey)
      && self
        .target()
        .is_some_and(|t| t.split(", ").any(|c| c == column))
  }
}

impl std::fmt::Display for ConstraintViolation {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.message)
  }
}

// ─── Conversions ─────────────────────────────────────────────────────────────

impl From<rusqlite::Error> for Error {
  fn from(err: rusqlite::Error) -> Self {
    match &err {
      rusqlite::Error::SqliteFailure(code, message)
        if code.code == ErrorCode::ConstraintViolation =>
      {
        Error::Constraint(ConstraintViolation {
          kind:    ConstraintKind::from_extended_code(code.extended_code),
          message: message.clone().unwrap_or_else(|| err.to_string()),
        })
      }
      _ => Error::Query(err.to_string()),
    }
  }
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(err: tokio_rusqlite::Error) -> Self {
    match err {
      tokio_rusqlite::Error::ConnectionClosed => Error::NotInitialized,
      tokio_rusqlite::Error::Rusqlite(e) => e.into(),
      other => Error::Query(other.to_string()),
    }
  }
}

impl Classify for Error {
  fn failure_kind(&self) -> FailureKind {
    match self {
      Error::NotFound { .. } => FailureKind::NotFound,
      Error::Constraint(_) => FailureKind::Conflict,
      Error::Core(
        caretrack_core::Error::InvalidTransition { .. }
        | caretrack_core::Error::Locked { .. },
      ) => FailureKind::Conflict,
      Error::Core(_) => FailureKind::Invalid,
      Error::NotInitialized | Error::Init { .. } => FailureKind::Unavailable,
      Error::Query(_) | Error::Backup(_) | Error::Json(_) | Error::Decode(_) => {
        FailureKind::Internal
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn target_names_the_column() {
    let v = ConstraintViolation {
      kind:    ConstraintKind::Unique,
      message: "UNIQUE constraint failed: clients.client_number".into(),
    };
    assert_eq!(v.target(), Some("clients.client_number"));
    assert!(v.is_unique_on("clients.client_number"));
    assert!(!v.is_unique_on("staff.email"));
  }

  #[test]
  fn foreign_key_failures_have_no_target() {
    let v = ConstraintViolation {
      kind:    ConstraintKind::ForeignKey,
      message: "FOREIGN KEY constraint failed".into(),
    };
    assert_eq!(v.target(), None);
  }

  #[test]
  fn closed_connection_maps_to_not_initialised() {
    let err: Error = tokio_rusqlite::Error::ConnectionClosed.into();
    assert!(matches!(err, Error::NotInitialized));
    assert_eq!(err.failure_kind(), FailureKind::Unavailable);
  }
}
