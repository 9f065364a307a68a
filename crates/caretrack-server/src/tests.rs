//! End-to-end tests of the server router: authentication, role policy and
//! login, against an in-memory store.

use std::{io::Write as _, sync::Arc};

use axum::{
  Router,
  body::{Body, to_bytes},
  http::{Method, Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use caretrack_api::password::hash_password;
use caretrack_core::{
  client::NewClient,
  service_log::NewServiceLog,
  staff::{NewStaff, StaffRole, StaffStatus},
  store::CaseStore,
};
use caretrack_store_sqlite::SqliteStore;
use chrono::{NaiveDate, NaiveTime};
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{AppState, ServerConfig, expand_tilde, router};

const PASSWORD: &str = "s3cret";

struct Fixture {
  app:   Router,
  store: SqliteStore,
}

async fn fixture() -> Fixture {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let hash = hash_password(PASSWORD).unwrap();
  for (number, role) in [
    ("admin", StaffRole::Admin),
    ("staff", StaffRole::Staff),
    ("viewer", StaffRole::Viewer),
  ] {
    let email = format!("{number}@example.com");
    store
      .insert_staff(NewStaff::new(number, "Sato", email, role, hash.clone()))
      .await
      .unwrap();
  }
  let app = router(AppState { store: Arc::new(store.clone()) });
  Fixture { app, store }
}

fn basic(user: &str, pass: &str) -> String {
  format!("Basic {}", B64.encode(format!("{user}@example.com:{pass}")))
}

async fn send(
  app: &Router,
  method: Method,
  uri: &str,
  auth: Option<String>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut req = Request::builder().method(method).uri(uri);
  if let Some(auth) = auth {
    req = req.header(header::AUTHORIZATION, auth);
  }
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
  let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, value)
}

fn new_client() -> Value { json!({ "client_number": "CL001", "name": "Yamada Taro" }) }

// ─── Authentication ──────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_credentials_are_challenged() {
  let f = fixture().await;
  let res = f
    .app
    .clone()
    .oneshot(Request::builder().uri("/api/clients").body(Body::empty()).unwrap())
    .await
    .unwrap();
  assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
  assert_eq!(
    res.headers().get(header::WWW_AUTHENTICATE).unwrap(),
    "Basic realm=\"caretrack\""
  );
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_rejected() {
  let f = fixture().await;
  let (status, _) =
    send(&f.app, Method::GET, "/api/clients", Some(basic("staff", "wrong")), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  let (status, _) =
    send(&f.app, Method::GET, "/api/clients", Some(basic("nobody", PASSWORD)), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn inactive_staff_cannot_authenticate() {
  let f = fixture().await;
  let viewer = f.store.find_staff_by_email("viewer@example.com").await.unwrap().unwrap();
  f.store.set_staff_status(viewer.id, StaffStatus::Inactive).await.unwrap();
  let (status, _) =
    send(&f.app, Method::GET, "/api/clients", Some(basic("viewer", PASSWORD)), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_stamps_last_login() {
  let f = fixture().await;
  let (status, body) =
    send(&f.app, Method::POST, "/login", Some(basic("viewer", PASSWORD)), None).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["email"], "viewer@example.com");
  assert_eq!(body["role"], "viewer");
  assert!(body["last_login_at"].is_string());
  assert!(body.get("password_hash").is_none());
}

// ─── Role policy ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn viewer_reads_but_cannot_write() {
  let f = fixture().await;
  let auth = || Some(basic("viewer", PASSWORD));
  let (status, _) = send(&f.app, Method::GET, "/api/clients", auth(), None).await;
  assert_eq!(status, StatusCode::OK);
  let (status, body) = send(&f.app, Method::POST, "/api/clients", auth(), Some(new_client())).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert!(body["error"].as_str().unwrap().contains("viewer"), "{body}");
}

#[tokio::test]
async fn staff_write_records_but_not_accounts() {
  let f = fixture().await;
  let auth = || Some(basic("staff", PASSWORD));
  let (status, _) = send(&f.app, Method::POST, "/api/clients", auth(), Some(new_client())).await;
  assert_eq!(status, StatusCode::CREATED);

  let account = json!({
    "staff_number": "S100",
    "name": "Ito",
    "email": "ito@example.com",
    "role": "staff",
    "password": "pw",
  });
  let (status, _) = send(&f.app, Method::POST, "/api/staff", auth(), Some(account.clone())).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, _) = send(&f.app, Method::POST, "/api/backup", auth(), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, body) =
    send(&f.app, Method::POST, "/api/staff", Some(basic("admin", PASSWORD)), Some(account)).await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
}

#[tokio::test]
async fn staff_may_change_only_their_own_password() {
  let f = fixture().await;
  let me = f.store.find_staff_by_email("staff@example.com").await.unwrap().unwrap();
  let admin = f.store.find_staff_by_email("admin@example.com").await.unwrap().unwrap();
  let auth = || Some(basic("staff", PASSWORD));
  let body = || Some(json!({ "password": "n3w" }));

  let (status, _) =
    send(&f.app, Method::PUT, &format!("/api/staff/{}/password", admin.id), auth(), body()).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) =
    send(&f.app, Method::PUT, &format!("/api/staff/{}/password", me.id), auth(), body()).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) =
    send(&f.app, Method::GET, "/api/clients", Some(basic("staff", "n3w")), None).await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn approvals_are_signed_by_the_caller() {
  let f = fixture().await;
  let admin = f.store.find_staff_by_email("admin@example.com").await.unwrap().unwrap();
  let other_admin = f
    .store
    .insert_staff(NewStaff::new("admin2", "Ito", "admin2@example.com", StaffRole::Admin, "x"))
    .await
    .unwrap();
  let client = f.store.insert_client(NewClient::new("CL001", "Yamada Taro")).await.unwrap();
  let log = f
    .store
    .insert_service_log(NewServiceLog::new(
      client.id,
      admin.id,
      NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
      NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
      NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
      "home visit",
    ))
    .await
    .unwrap();

  let uri = format!("/api/service-logs/{}/approve", log.id);
  let auth = || Some(basic("admin", PASSWORD));
  let impersonate = json!({ "approved_by": other_admin.id });
  let (status, _) = send(&f.app, Method::POST, &uri, auth(), Some(impersonate)).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let untouched = f.store.get_service_log(log.id).await.unwrap().unwrap();
  assert_eq!(untouched.approved_by, None);

  let (status, body) = send(&f.app, Method::POST, &uri, auth(), Some(json!({}))).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["approved_by"], admin.id);
  assert_eq!(body["status"], "approved");
}

#[tokio::test]
async fn api_errors_pass_through_the_server() {
  let f = fixture().await;
  let (status, body) =
    send(&f.app, Method::GET, "/api/clients/99", Some(basic("viewer", PASSWORD)), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "client 99 not found");
}

// ─── Configuration ───────────────────────────────────────────────────────────

#[test]
fn config_file_overrides_defaults() {
  let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
  writeln!(file, "port = 9090\ndata_dir = \"/srv/caretrack\"").unwrap();

  let cfg = ServerConfig::load(file.path()).unwrap();
  assert_eq!(cfg.host, "127.0.0.1");
  assert_eq!(cfg.port, 9090);
  assert_eq!(cfg.data_dir, std::path::PathBuf::from("/srv/caretrack"));
  assert_eq!(cfg.address(), "127.0.0.1:9090");
}

#[test]
fn tilde_expands_to_home() {
  let Ok(home) = std::env::var("HOME") else { return };
  assert_eq!(
    expand_tilde(std::path::Path::new("~/data")),
    std::path::PathBuf::from(home).join("data")
  );
  assert_eq!(
    expand_tilde(std::path::Path::new("/abs/data")),
    std::path::PathBuf::from("/abs/data")
  );
}
