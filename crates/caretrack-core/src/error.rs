//! Error types for `caretrack-core`.

use thiserror::Error;

use crate::Id;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown {kind} value: {value:?}")]
  UnknownVariant { kind: &'static str, value: String },

  #[error("{field} must be between {min} and {max}, got {value}")]
  OutOfRange {
    field: String,
    min:   i64,
    max:   i64,
    value: i64,
  },

  #[error("invalid input: {0}")]
  Invalid(String),

  #[error("{entity} {id} cannot move from {from} to {to}")]
  InvalidTransition {
    entity: &'static str,
    id:     Id,
    from:   String,
    to:     String,
  },

  /// Approved records are read-only.
  #[error("{entity} {id} is {status} and can no longer be edited")]
  Locked {
    entity: &'static str,
    id:     Id,
    status: String,
  },

  /// The staff member named as approver or finaliser may not sign off.
  #[error("staff {id} cannot {action}: {reason}")]
  NotSignatory {
    id:     Id,
    action: &'static str,
    reason: &'static str,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reject blank required text fields.
pub(crate) fn require(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::Invalid(format!("{field} must not be empty")));
  }
  Ok(())
}

/// Check an integer against a closed range.
pub(crate) fn check_range(
  field: &str,
  value: i64,
  min: i64,
  max: i64,
) -> Result<()> {
  if value < min || value > max {
    return Err(Error::OutOfRange { field: field.to_owned(), min, max, value });
  }
  Ok(())
}
