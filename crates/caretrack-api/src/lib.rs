//! JSON REST API for CareTrack.
//!
//! Exposes an axum [`Router`] backed by any [`caretrack_core::store::CaseStore`].
//! Authentication, authorisation and transport concerns are the caller's
//! responsibility. A layer that authenticates requests should insert the
//! caller's [`Staff`] as a request extension; approvals and finalisations
//! are then signed by that caller.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", caretrack_api::api_router(store.clone()))
//! ```

pub mod assessments;
pub mod clients;
pub mod error;
pub mod maintenance;
pub mod password;
pub mod plans;
pub mod service_logs;
pub mod staff;

use std::sync::Arc;

use axum::{
  Extension, Router,
  routing::{get, post, put},
};
use caretrack_core::{Id, staff::Staff, store::CaseStore};
use serde::Deserialize;

pub use error::ApiError;

/// Body of the `PUT …/status` endpoints: `{"status": "<value>"}`.
#[derive(Debug, Deserialize)]
pub struct StatusBody<T> {
  pub status: T,
}

/// Resolve who signs off an approval or finalisation.
///
/// With an authenticated caller the caller signs, and a body naming anyone
/// else is refused. Without one the body must name the signatory.
pub(crate) fn signatory(
  caller: Option<Extension<Staff>>,
  claimed: Option<Id>,
  field: &str,
) -> Result<Id, ApiError> {
  match (caller, claimed) {
    (Some(Extension(staff)), Some(id)) if id != staff.id => Err(ApiError::Forbidden(
      format!("{field} must be the signed-in staff member {}, got {id}", staff.id),
    )),
    (Some(Extension(staff)), _) => Ok(staff.id),
    (None, Some(id)) => Ok(id),
    (None, None) => Err(ApiError::BadRequest(format!("{field} is required"))),
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CaseStore + 'static,
{
  Router::new()
    // Clients
    .route("/clients", get(clients::list::<S>).post(clients::create::<S>))
    .route("/clients/{id}", get(clients::get_one::<S>).put(clients::update::<S>))
    .route("/clients/{id}/status", put(clients::set_status::<S>))
    .route(
      "/clients/{id}/emergency-contacts",
      get(clients::list_contacts::<S>).put(clients::replace_contacts::<S>),
    )
    // Support plans
    .route("/support-plans", get(plans::list::<S>).post(plans::create::<S>))
    .route("/support-plans/{id}", get(plans::get_one::<S>).put(plans::update::<S>))
    .route("/support-plans/{id}/status", put(plans::set_status::<S>))
    // Service logs
    .route(
      "/service-logs",
      get(service_logs::list::<S>).post(service_logs::create::<S>),
    )
    .route(
      "/service-logs/{id}",
      get(service_logs::get_one::<S>).put(service_logs::update::<S>),
    )
    .route("/service-logs/{id}/confirm", post(service_logs::confirm::<S>))
    .route("/service-logs/{id}/approve", post(service_logs::approve::<S>))
    // Staff
    .route("/staff", get(staff::list::<S>).post(staff::create::<S>))
    .route("/staff/{id}", get(staff::get_one::<S>).put(staff::update::<S>))
    .route("/staff/{id}/status", put(staff::set_status::<S>))
    .route("/staff/{id}/password", put(staff::set_password::<S>))
    // Assessments
    .route(
      "/assessments",
      get(assessments::list::<S>).post(assessments::create::<S>),
    )
    .route(
      "/assessments/{id}",
      get(assessments::get_one::<S>).put(assessments::update::<S>),
    )
    .route("/assessments/{id}/submit", post(assessments::submit::<S>))
    .route("/assessments/{id}/finalize", post(assessments::finalize::<S>))
    // Maintenance
    .route("/backup", post(maintenance::backup::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests;
