//! Untyped rows and statement results for the raw query interface.

use std::sync::Arc;

use rusqlite::{Connection, params_from_iter, types::Value};

use crate::Result;

/// One result row: column names (in select order) paired with their values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
  columns: Arc<[String]>,
  values:  Vec<Value>,
}

impl Row {
  /// The value of `column`, or `None` if the result set has no such column.
  pub fn get(&self, column: &str) -> Option<&Value> {
    self
      .columns
      .iter()
      .position(|c| c == column)
      .map(|i| &self.values[i])
  }

  pub fn get_i64(&self, column: &str) -> Option<i64> {
    match self.get(column)? {
      Value::Integer(n) => Some(*n),
      _ => None,
    }
  }

  pub fn get_str(&self, column: &str) -> Option<&str> {
    match self.get(column)? {
      Value::Text(s) => Some(s),
      _ => None,
    }
  }

  /// `true` when the column exists and holds SQL `NULL`.
  pub fn is_null(&self, column: &str) -> bool {
    matches!(self.get(column), Some(Value::Null))
  }

  pub fn columns(&self) -> &[String] { &self.columns }

  pub fn values(&self) -> &[Value] { &self.values }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.columns.iter().map(String::as_str).zip(self.values.iter())
  }
}

/// Outcome of an INSERT/UPDATE/DELETE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
  /// Row id of the most recent successful INSERT on the connection; only
  /// meaningful after a single-row INSERT.
  pub last_insert_id: i64,
  /// Rows changed by this statement. `0` when nothing matched.
  pub rows_affected:  usize,
}

/// Execute a read statement, binding `params` positionally.
pub(crate) fn query_rows(
  conn: &Connection,
  sql: &str,
  params: &[Value],
) -> Result<Vec<Row>> {
  let mut stmt = conn.prepare(sql)?;
  let columns: Arc<[String]> = stmt
    .column_names()
    .into_iter()
    .map(str::to_owned)
    .collect();
  let width = columns.len();

  let rows = stmt
    .query_map(params_from_iter(params.iter()), |row| {
      (0..width)
        .map(|i| row.get::<_, Value>(i))
        .collect::<rusqlite::Result<Vec<_>>>()
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(
    rows
      .into_iter()
      .map(|values| Row { columns: Arc::clone(&columns), values })
      .collect(),
  )
}

/// Execute a write statement, binding `params` positionally.
pub(crate) fn run_statement(
  conn: &Connection,
  sql: &str,
  params: &[Value],
) -> Result<RunResult> {
  let rows_affected = conn.execute(sql, params_from_iter(params.iter()))?;
  Ok(RunResult { last_insert_id: conn.last_insert_rowid(), rows_affected })
}
