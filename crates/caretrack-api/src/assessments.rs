//! Handlers for `/assessments` endpoints.

use std::sync::Arc;

use axum::{
  Extension, Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use caretrack_core::{
  Id,
  assessment::{Assessment, NewAssessment},
  staff::Staff,
  store::{AssessmentQuery, CaseStore},
};
use serde::Deserialize;

use crate::{error::ApiError, signatory};

/// `GET /assessments[?client_id=&status=&assessment_type=&from=&to=]`
pub async fn list<S: CaseStore>(
  State(store): State<Arc<S>>,
  Query(query): Query<AssessmentQuery>,
) -> Result<Json<Vec<Assessment>>, ApiError> {
  let assessments = store
    .list_assessments(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(assessments))
}

/// `POST /assessments`
pub async fn create<S: CaseStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewAssessment>,
) -> Result<impl IntoResponse, ApiError> {
  let assessment = store
    .insert_assessment(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(assessment)))
}

/// `GET /assessments/{id}`
pub async fn get_one<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<Assessment>, ApiError> {
  let assessment = store
    .get_assessment(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("assessment", id))?;
  Ok(Json(assessment))
}

/// `PUT /assessments/{id}`
pub async fn update<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
  Json(body): Json<NewAssessment>,
) -> Result<Json<Assessment>, ApiError> {
  let assessment = store
    .update_assessment(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(assessment))
}

/// `POST /assessments/{id}/submit`
pub async fn submit<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<Assessment>, ApiError> {
  let assessment = store
    .submit_assessment(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(assessment))
}

#[derive(Debug, Default, Deserialize)]
pub struct FinalizeBody {
  pub finalized_by: Option<Id>,
}

/// `POST /assessments/{id}/finalize`, body: `{}` or `{"finalized_by": 3}`
pub async fn finalize<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
  caller: Option<Extension<Staff>>,
  Json(body): Json<FinalizeBody>,
) -> Result<Json<Assessment>, ApiError> {
  let finalized_by = signatory(caller, body.finalized_by, "finalized_by")?;
  let assessment = store
    .finalize_assessment(id, finalized_by)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(assessment))
}
