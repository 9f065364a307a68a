//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Extension, Router,
  body::{Body, to_bytes},
  http::{Method, Request, StatusCode, header},
};
use caretrack_core::store::CaseStore as _;
use caretrack_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

async fn app() -> (Router, SqliteStore) {
  let store = SqliteStore::open_in_memory().await.unwrap();
  (api_router(Arc::new(store.clone())), store)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut req = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(json) => {
      req = req.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
  let status = res.status();
  let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

async fn create_client(app: &Router, number: &str) -> i64 {
  let (status, body) = send(
    app,
    Method::POST,
    "/clients",
    Some(json!({ "client_number": number, "name": "Yamada Taro" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["id"].as_i64().unwrap()
}

async fn create_staff(app: &Router, number: &str, role: &str) -> (i64, Value) {
  let (status, body) = send(
    app,
    Method::POST,
    "/staff",
    Some(json!({
      "staff_number": number,
      "name": "Sato Hanako",
      "email": format!("{}@example.com", number.to_lowercase()),
      "role": role,
      "password": "s3cret",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  (body["id"].as_i64().unwrap(), body)
}

// ─── Clients ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_fetch_client() {
  let (app, _) = app().await;
  let id = create_client(&app, "CL001").await;

  let (status, body) = send(&app, Method::GET, &format!("/clients/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["client_number"], "CL001");
  assert_eq!(body["status"], "active");

  let (status, body) = send(&app, Method::GET, "/clients?status=active&limit=10", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_client_number_is_conflict() {
  let (app, _) = app().await;
  create_client(&app, "CL001").await;
  let (status, body) = send(
    &app,
    Method::POST,
    "/clients",
    Some(json!({ "client_number": "CL001", "name": "Suzuki Jiro" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("clients.client_number"), "{body}");
}

#[tokio::test]
async fn missing_client_is_not_found() {
  let (app, _) = app().await;
  let (status, body) = send(&app, Method::GET, "/clients/42", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "client 42 not found");

  let (status, _) = send(&app, Method::GET, "/clients/42/emergency-contacts", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_name_is_bad_request() {
  let (app, _) = app().await;
  let (status, _) = send(
    &app,
    Method::POST,
    "/clients",
    Some(json!({ "client_number": "CL001", "name": "" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn client_status_and_contacts() {
  let (app, _) = app().await;
  let id = create_client(&app, "CL001").await;

  let (status, body) = send(
    &app,
    Method::PUT,
    &format!("/clients/{id}/status"),
    Some(json!({ "status": "suspended" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "suspended");

  let (status, body) = send(
    &app,
    Method::PUT,
    &format!("/clients/{id}/emergency-contacts"),
    Some(json!([
      { "name": "Yamada Jiro", "relationship": "brother", "phone": "090-1111-1111" },
      { "name": "Yamada Hanako", "relationship": "mother", "phone": "090-0000-0000", "is_primary": true },
    ])),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body[0]["relationship"], "mother");
  assert_eq!(body[0]["is_primary"], true);
}

async fn create_log(app: &Router, client_id: i64, staff_id: i64) -> i64 {
  let (status, body) = send(
    app,
    Method::POST,
    "/service-logs",
    Some(json!({
      "client_id": client_id,
      "staff_id": staff_id,
      "service_date": "2024-03-01",
      "start_time": "09:00:00",
      "end_time": "10:00:00",
      "service_type": "home visit",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["id"].as_i64().unwrap()
}

// ─── Service logs ────────────────────────────────────────────────────────────

#[tokio::test]
async fn approved_service_log_is_locked() {
  let (app, _) = app().await;
  let client_id = create_client(&app, "CL001").await;
  let (staff_id, _) = create_staff(&app, "S001", "admin").await;
  let log = json!({
    "client_id": client_id,
    "staff_id": staff_id,
    "service_date": "2024-03-01",
    "start_time": "09:00:00",
    "end_time": "10:30:00",
    "service_type": "home visit",
    "mood_level": 4,
  });

  let (status, body) = send(&app, Method::POST, "/service-logs", Some(log.clone())).await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  assert_eq!(body["status"], "draft");
  let id = body["id"].as_i64().unwrap();

  let approve = json!({ "approved_by": staff_id });
  let uri = format!("/service-logs/{id}/approve");
  let (status, body) = send(&app, Method::POST, &uri, Some(approve.clone())).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "approved");
  assert_eq!(body["approved_by"], staff_id);

  let (status, _) = send(&app, Method::POST, &uri, Some(approve)).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, _) = send(&app, Method::PUT, &format!("/service-logs/{id}"), Some(log)).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, body) = send(
    &app,
    Method::GET,
    &format!("/service-logs?client_id={client_id}&from=2024-03-01&to=2024-03-31"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn mood_out_of_range_is_bad_request() {
  let (app, _) = app().await;
  let client_id = create_client(&app, "CL001").await;
  let (staff_id, _) = create_staff(&app, "S001", "staff").await;
  let (status, _) = send(
    &app,
    Method::POST,
    "/service-logs",
    Some(json!({
      "client_id": client_id,
      "staff_id": staff_id,
      "service_date": "2024-03-01",
      "start_time": "09:00:00",
      "end_time": "10:00:00",
      "service_type": "home visit",
      "mood_level": 6,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Staff ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn staff_password_hash_is_never_returned() {
  let (app, store) = app().await;
  let (id, body) = create_staff(&app, "S001", "viewer").await;
  assert!(body.get("password_hash").is_none(), "{body}");

  let (status, _) = send(
    &app,
    Method::PUT,
    &format!("/staff/{id}/password"),
    Some(json!({ "password": "n3w-secret" })),
  )
  .await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  use caretrack_core::store::CaseStore as _;
  let stored = store.get_staff(id).await.unwrap().unwrap();
  assert!(crate::password::verify_password("n3w-secret", &stored.password_hash));
}

#[tokio::test]
async fn approval_needs_a_known_signatory() {
  let (app, _) = app().await;
  let client_id = create_client(&app, "CL001").await;
  let (staff_id, _) = create_staff(&app, "S001", "staff").await;
  let id = create_log(&app, client_id, staff_id).await;
  let uri = format!("/service-logs/{id}/approve");

  let (status, body) = send(&app, Method::POST, &uri, Some(json!({}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "approved_by is required");

  let (status, _) = send(&app, Method::POST, &uri, Some(json!({ "approved_by": 999 }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let not_admin = json!({ "approved_by": staff_id });
  let (status, _) = send(&app, Method::POST, &uri, Some(not_admin)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, body) = send(&app, Method::GET, &format!("/service-logs/{id}"), None).await;
  assert_eq!(body["status"], "draft");
  assert!(body["approved_by"].is_null());
}

#[tokio::test]
async fn authenticated_caller_signs_approvals() {
  let (app, store) = app().await;
  let client_id = create_client(&app, "CL001").await;
  let (admin_id, _) = create_staff(&app, "S001", "admin").await;
  let (other_admin_id, _) = create_staff(&app, "S002", "admin").await;
  let caller = store.get_staff(admin_id).await.unwrap().unwrap();
  let signed_in = app.clone().layer(Extension(caller));

  let first = create_log(&app, client_id, admin_id).await;
  let uri = format!("/service-logs/{first}/approve");
  let (status, body) =
    send(&signed_in, Method::POST, &uri, Some(json!({ "approved_by": other_admin_id }))).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(
    body["error"],
    format!("approved_by must be the signed-in staff member {admin_id}, got {other_admin_id}")
  );

  let (status, body) = send(&signed_in, Method::POST, &uri, Some(json!({}))).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["approved_by"], admin_id);
}

// ─── Assessments ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn assessment_finalize_flow() {
  let (app, _) = app().await;
  let client_id = create_client(&app, "CL001").await;
  let (staff_id, _) = create_staff(&app, "S001", "staff").await;

  let (status, body) = send(
    &app,
    Method::POST,
    "/assessments",
    Some(json!({
      "client_id": client_id,
      "staff_id": staff_id,
      "assessment_type": "initial",
      "assessment_date": "2024-04-01",
      "overall_score": 70,
      "category_scores": { "mobility": 60 },
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  let id = body["id"].as_i64().unwrap();
  assert_eq!(body["category_scores"]["mobility"], 60);

  let (status, body) = send(&app, Method::POST, &format!("/assessments/{id}/submit"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "pending");

  let finalize = format!("/assessments/{id}/finalize");
  let (status, body) =
    send(&app, Method::POST, &finalize, Some(json!({ "finalized_by": staff_id }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(
    body["error"],
    format!("staff {staff_id} cannot finalise assessments: not an administrator")
  );

  let (admin_id, _) = create_staff(&app, "S002", "admin").await;
  let (status, body) =
    send(&app, Method::POST, &finalize, Some(json!({ "finalized_by": admin_id }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "approved");
  assert_eq!(body["finalized_by"], admin_id);
  assert!(body["finalized_at"].is_string());
}

// ─── Maintenance & availability ──────────────────────────────────────────────

#[tokio::test]
async fn in_memory_backup_is_a_server_error() {
  let (app, _) = app().await;
  let (status, body) = send(&app, Method::POST, "/backup", None).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert!(body["error"].as_str().unwrap().starts_with("backup failed"), "{body}");
}

#[tokio::test]
async fn closed_store_is_unavailable() {
  let (app, store) = app().await;
  store.close().await.unwrap();
  let (status, body) = send(&app, Method::GET, "/clients", None).await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  assert_eq!(body["error"], "store is not initialised");
}
