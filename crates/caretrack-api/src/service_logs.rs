//! Handlers for `/service-logs` endpoints.
//!
//! Logs are created as drafts. `confirm` and `approve` are one-way; once
//! approved a log can no longer be edited (409).

use std::sync::Arc;

use axum::{
  Extension, Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use caretrack_core::{
  Id,
  service_log::{NewServiceLog, ServiceLog},
  staff::Staff,
  store::{CaseStore, ServiceLogQuery},
};
use serde::Deserialize;

use crate::{error::ApiError, signatory};

/// `GET /service-logs[?client_id=&staff_id=&support_plan_id=&status=&from=&to=]`
pub async fn list<S: CaseStore>(
  State(store): State<Arc<S>>,
  Query(query): Query<ServiceLogQuery>,
) -> Result<Json<Vec<ServiceLog>>, ApiError> {
  let logs = store
    .list_service_logs(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(logs))
}

/// `POST /service-logs`
pub async fn create<S: CaseStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewServiceLog>,
) -> Result<impl IntoResponse, ApiError> {
  let log = store
    .insert_service_log(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(log)))
}

/// `GET /service-logs/{id}`
pub async fn get_one<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<ServiceLog>, ApiError> {
  let log = store
    .get_service_log(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("service log", id))?;
  Ok(Json(log))
}

/// `PUT /service-logs/{id}`
pub async fn update<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
  Json(body): Json<NewServiceLog>,
) -> Result<Json<ServiceLog>, ApiError> {
  let log = store
    .update_service_log(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(log))
}

/// `POST /service-logs/{id}/confirm`
pub async fn confirm<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<ServiceLog>, ApiError> {
  let log = store
    .confirm_service_log(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(log))
}

#[derive(Debug, Default, Deserialize)]
pub struct ApproveBody {
  pub approved_by: Option<Id>,
}

/// `POST /service-logs/{id}/approve`, body: `{}` or `{"approved_by": 3}`
pub async fn approve<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
  caller: Option<Extension<Staff>>,
  Json(body): Json<ApproveBody>,
) -> Result<Json<ServiceLog>, ApiError> {
  let approved_by = signatory(caller, body.approved_by, "approved_by")?;
  let log = store
    .approve_service_log(id, approved_by)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(log))
}
