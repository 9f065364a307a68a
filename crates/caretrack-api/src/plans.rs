//! Handlers for `/support-plans` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use caretrack_core::{
  Id,
  plan::{NewSupportPlan, PlanStatus, SupportPlan},
  store::{CaseStore, PlanQuery},
};

use crate::{StatusBody, error::ApiError};

/// `GET /support-plans[?client_id=&status=]`
pub async fn list<S: CaseStore>(
  State(store): State<Arc<S>>,
  Query(query): Query<PlanQuery>,
) -> Result<Json<Vec<SupportPlan>>, ApiError> {
  let plans = store
    .list_support_plans(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(plans))
}

/// `POST /support-plans`
pub async fn create<S: CaseStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewSupportPlan>,
) -> Result<impl IntoResponse, ApiError> {
  let plan = store
    .insert_support_plan(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(plan)))
}

/// `GET /support-plans/{id}`
pub async fn get_one<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<SupportPlan>, ApiError> {
  let plan = store
    .get_support_plan(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("support plan", id))?;
  Ok(Json(plan))
}

/// `PUT /support-plans/{id}`
pub async fn update<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
  Json(body): Json<NewSupportPlan>,
) -> Result<Json<SupportPlan>, ApiError> {
  let plan = store
    .update_support_plan(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(plan))
}

/// `PUT /support-plans/{id}/status`
pub async fn set_status<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
  Json(body): Json<StatusBody<PlanStatus>>,
) -> Result<Json<SupportPlan>, ApiError> {
  let plan = store
    .set_support_plan_status(id, body.status)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(plan))
}
