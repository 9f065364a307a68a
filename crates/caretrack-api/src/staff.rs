//! Handlers for `/staff` endpoints.
//!
//! Passwords arrive in plaintext and are hashed with argon2 before they reach
//! the store. Hashes are never serialised back out.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use caretrack_core::{
  Id,
  staff::{NewStaff, Staff, StaffRole, StaffStatus, StaffUpdate},
  store::{CaseStore, StaffQuery},
};
use serde::Deserialize;

use crate::{StatusBody, error::ApiError, password::hash_password};

/// `GET /staff[?role=&status=]`
pub async fn list<S: CaseStore>(
  State(store): State<Arc<S>>,
  Query(query): Query<StaffQuery>,
) -> Result<Json<Vec<Staff>>, ApiError> {
  let staff = store.list_staff(&query).await.map_err(ApiError::store)?;
  Ok(Json(staff))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub staff_number: String,
  pub name:         String,
  #[serde(default)]
  pub name_kana:    Option<String>,
  pub email:        String,
  #[serde(default)]
  pub phone:        Option<String>,
  pub role:         StaffRole,
  #[serde(default)]
  pub specialties:  Vec<String>,
  pub password:     String,
}

/// `POST /staff`
pub async fn create<S: CaseStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewStaff {
    staff_number:  body.staff_number,
    name:          body.name,
    name_kana:     body.name_kana,
    email:         body.email,
    phone:         body.phone,
    role:          body.role,
    specialties:   body.specialties,
    password_hash: hash_password(&body.password)?,
  };
  let staff = store.insert_staff(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(staff)))
}

/// `GET /staff/{id}`
pub async fn get_one<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<Staff>, ApiError> {
  let staff = store
    .get_staff(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("staff member", id))?;
  Ok(Json(staff))
}

/// `PUT /staff/{id}`
pub async fn update<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
  Json(body): Json<StaffUpdate>,
) -> Result<Json<Staff>, ApiError> {
  let staff = store.update_staff(id, body).await.map_err(ApiError::store)?;
  Ok(Json(staff))
}

/// `PUT /staff/{id}/status`
pub async fn set_status<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
  Json(body): Json<StatusBody<StaffStatus>>,
) -> Result<Json<Staff>, ApiError> {
  let staff = store
    .set_staff_status(id, body.status)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(staff))
}

#[derive(Debug, Deserialize)]
pub struct PasswordBody {
  pub password: String,
}

/// `PUT /staff/{id}/password` responds with `204 No Content`.
pub async fn set_password<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
  Json(body): Json<PasswordBody>,
) -> Result<StatusCode, ApiError> {
  let hash = hash_password(&body.password)?;
  store
    .set_staff_password(id, hash)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
