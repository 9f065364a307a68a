//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps written by this crate are RFC 3339 strings; rows defaulted by
//! SQLite carry `CURRENT_TIMESTAMP` (`YYYY-MM-DD HH:MM:SS`, UTC) and both
//! forms decode. Lists and score maps are stored as compact JSON, with `NULL`
//! meaning empty.

use std::str::FromStr;

use caretrack_core::Id;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::types::Value;
use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.with_timezone(&Utc));
  }
  NaiveDateTime::parse_from_str(s, SQLITE_TIMESTAMP_FORMAT)
    .map(|naive| naive.and_utc())
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

/// Decode a `created_at`/`updated_at` column. These are defaulted but
/// nullable, so a raw write can leave `NULL`; that is reported against the
/// row it belongs to.
pub fn decode_stamp(
  table: &str,
  id: Id,
  column: &str,
  s: Option<String>,
) -> Result<DateTime<Utc>> {
  match s {
    Some(s) => decode_dt(&s),
    None => Err(Error::Decode(format!("{table} row {id}: {column} is NULL"))),
  }
}

// ─── NaiveDate / NaiveTime ───────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

pub fn decode_opt_date(s: Option<String>) -> Result<Option<NaiveDate>> {
  s.as_deref().map(decode_date).transpose()
}

pub fn encode_time(t: NaiveTime) -> String { t.format(TIME_FORMAT).to_string() }

/// Accepts `HH:MM` and `HH:MM:SS`.
pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, TIME_FORMAT)
    .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
    .map_err(|e| Error::Decode(format!("time {s:?}: {e}")))
}

// ─── Enumerations ────────────────────────────────────────────────────────────

pub fn decode_enum<T>(s: &str) -> Result<T>
where
  T: FromStr<Err = caretrack_core::Error>,
{
  Ok(s.parse()?)
}

/// Decode a defaulted status column; `NULL` reads as the column default.
pub fn decode_enum_or_default<T>(s: Option<String>) -> Result<T>
where
  T: FromStr<Err = caretrack_core::Error> + Default,
{
  Ok(decode_opt_enum(s)?.unwrap_or_default())
}

pub fn decode_opt_enum<T>(s: Option<String>) -> Result<Option<T>>
where
  T: FromStr<Err = caretrack_core::Error>,
{
  s.as_deref().map(decode_enum::<T>).transpose()
}

// ─── JSON columns ────────────────────────────────────────────────────────────

/// Encode a collection as JSON, or `None` (SQL `NULL`) when it is empty.
pub fn encode_json_list<T: Serialize>(items: &[T]) -> Result<Option<String>> {
  if items.is_empty() {
    return Ok(None);
  }
  Ok(Some(serde_json::to_string(items)?))
}

/// Decode a JSON column; `NULL` and the empty string decode as the default.
pub fn decode_json_or_default<T>(s: Option<String>) -> Result<T>
where
  T: DeserializeOwned + Default,
{
  match s.as_deref().map(str::trim) {
    None | Some("") => Ok(T::default()),
    Some(text) => Ok(serde_json::from_str(text)?),
  }
}

// ─── Small integers ──────────────────────────────────────────────────────────

pub fn decode_opt_u8(field: &str, v: Option<i64>) -> Result<Option<u8>> {
  v.map(|n| {
    u8::try_from(n).map_err(|_| Error::Decode(format!("{field} {n} out of range")))
  })
  .transpose()
}

// ─── Parameter values ────────────────────────────────────────────────────────

pub fn text(s: impl Into<String>) -> Value { Value::Text(s.into()) }

pub fn integer(n: i64) -> Value { Value::Integer(n) }

#[cfg(test)]
mod tests {
  use caretrack_core::client::ClientStatus;

  use super::*;

  #[test]
  fn sqlite_default_timestamps_decode_as_utc() {
    let dt = decode_dt("2024-03-01 09:15:00").unwrap();
    assert_eq!(encode_dt(dt), "2024-03-01T09:15:00+00:00");
  }

  #[test]
  fn null_defaulted_columns() {
    let status: ClientStatus = decode_enum_or_default(None).unwrap();
    assert_eq!(status, ClientStatus::Active);
    let status: ClientStatus = decode_enum_or_default(Some("suspended".into())).unwrap();
    assert_eq!(status, ClientStatus::Suspended);

    let err = decode_stamp("clients", 7, "created_at", None).unwrap_err();
    assert_eq!(err.to_string(), "decode error: clients row 7: created_at is NULL");
  }

  #[test]
  fn times_accept_optional_seconds() {
    let expected = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
    assert_eq!(decode_time("09:30").unwrap(), expected);
    assert_eq!(decode_time("09:30:00").unwrap(), expected);
    assert!(decode_time("9.30").is_err());
  }

  #[test]
  fn empty_json_columns_decode_to_default() {
    let empty: Vec<i64> = decode_json_or_default(None).unwrap();
    assert!(empty.is_empty());
    let blank: Vec<i64> = decode_json_or_default(Some(" ".into())).unwrap();
    assert!(blank.is_empty());
    let ids: Vec<i64> = decode_json_or_default(Some("[1,2]".into())).unwrap();
    assert_eq!(ids, [1, 2]);
    assert_eq!(encode_json_list::<i64>(&[]).unwrap(), None);
  }
}
