//! Handlers for `/clients` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/clients` | Optional `?status=&text=&limit=&offset=` |
//! | `POST` | `/clients` | Body: [`NewClient`] |
//! | `GET`  | `/clients/{id}` | 404 if not found |
//! | `PUT`  | `/clients/{id}` | Full replacement of the editable fields |
//! | `PUT`  | `/clients/{id}/status` | Body: `{"status":"inactive"}` |
//! | `GET`  | `/clients/{id}/emergency-contacts` | Primary contact first |
//! | `PUT`  | `/clients/{id}/emergency-contacts` | Replaces the whole set |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use caretrack_core::{
  Id,
  client::{Client, ClientStatus, NewClient},
  contact::{EmergencyContact, NewEmergencyContact},
  store::{CaseStore, ClientQuery},
};

use crate::{StatusBody, error::ApiError};

/// `GET /clients`
pub async fn list<S: CaseStore>(
  State(store): State<Arc<S>>,
  Query(query): Query<ClientQuery>,
) -> Result<Json<Vec<Client>>, ApiError> {
  let clients = store.list_clients(&query).await.map_err(ApiError::store)?;
  Ok(Json(clients))
}

/// `POST /clients`
pub async fn create<S: CaseStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewClient>,
) -> Result<impl IntoResponse, ApiError> {
  let client = store.insert_client(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(client)))
}

/// `GET /clients/{id}`
pub async fn get_one<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<Client>, ApiError> {
  let client = store
    .get_client(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("client", id))?;
  Ok(Json(client))
}

/// `PUT /clients/{id}`
pub async fn update<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
  Json(body): Json<NewClient>,
) -> Result<Json<Client>, ApiError> {
  let client = store.update_client(id, body).await.map_err(ApiError::store)?;
  Ok(Json(client))
}

/// `PUT /clients/{id}/status`
pub async fn set_status<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
  Json(body): Json<StatusBody<ClientStatus>>,
) -> Result<Json<Client>, ApiError> {
  let client = store
    .set_client_status(id, body.status)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(client))
}

// ─── Emergency contacts ──────────────────────────────────────────────────────

/// `GET /clients/{id}/emergency-contacts`
pub async fn list_contacts<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<Vec<EmergencyContact>>, ApiError> {
  // An empty list is ambiguous; distinguish a missing client.
  if store.get_client(id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::not_found("client", id));
  }
  let contacts = store
    .list_emergency_contacts(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(contacts))
}

/// `PUT /clients/{id}/emergency-contacts`, body: a JSON array of contacts.
pub async fn replace_contacts<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
  Json(body): Json<Vec<NewEmergencyContact>>,
) -> Result<Json<Vec<EmergencyContact>>, ApiError> {
  let contacts = store
    .replace_emergency_contacts(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(contacts))
}
