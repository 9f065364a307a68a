//! `POST /backup`

use std::sync::Arc;

use axum::{Json, extract::State};
use caretrack_core::store::CaseStore;
use serde_json::{Value, json};

use crate::error::ApiError;

/// Copy the database file and respond with the backup's path:
/// `{"path": "/data/caretrack_backup_2024-03-01T09-15-30.123Z.db"}`.
pub async fn backup<S: CaseStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Value>, ApiError> {
  let path = store.backup().await.map_err(ApiError::store)?;
  Ok(Json(json!({ "path": path.display().to_string() })))
}
