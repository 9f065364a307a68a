//! HTTP Basic authentication against the staff table.
//!
//! The user name is the staff member's email address. Passwords are checked
//! against the stored argon2 PHC string; inactive staff never authenticate.

use std::sync::LazyLock;

use axum::{
  extract::{Request, State},
  http::{HeaderMap, header},
  middleware::Next,
  response::Response,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use caretrack_api::{
  ApiError,
  password::{hash_password, verify_password},
};
use caretrack_core::{staff::Staff, store::CaseStore};

use crate::{AppState, error::Error, policy};

/// Checked when no staff member has the given email, so an unknown address
/// costs the same argon2 work as a wrong password.
static UNKNOWN_USER_HASH: LazyLock<String> =
  LazyLock::new(|| hash_password("caretrack-unknown-user").unwrap_or_default());

/// Decoded `Authorization: Basic …` credentials.
#[derive(Debug, PartialEq, Eq)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

impl Credentials {
  pub fn from_headers(headers: &HeaderMap) -> Result<Self, Error> {
    let header_val = headers
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .ok_or(Error::Unauthorized)?;

    let encoded = header_val
      .strip_prefix("Basic ")
      .ok_or(Error::Unauthorized)?;

    let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
    let creds   = String::from_utf8(decoded).map_err(|_| Error::Unauthorized)?;

    let (email, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;
    Ok(Self { email: email.to_owned(), password: password.to_owned() })
  }
}

/// Resolve the staff member behind `credentials`.
pub async fn authenticate<S: CaseStore>(
  store: &S,
  credentials: &Credentials,
) -> Result<Staff, Error> {
  let found = store
    .find_staff_by_email(&credentials.email)
    .await
    .map_err(ApiError::store)?;

  let Some(staff) = found else {
    let _ = verify_password(&credentials.password, &UNKNOWN_USER_HASH);
    tracing::warn!(email = %credentials.email, "authentication failed");
    return Err(Error::Unauthorized);
  };
  if !staff.is_active() || !verify_password(&credentials.password, &staff.password_hash) {
    tracing::warn!(email = %credentials.email, "authentication failed");
    return Err(Error::Unauthorized);
  }
  Ok(staff)
}

/// Middleware: authenticate the caller, check the role policy for the
/// request, and make the [`Staff`] available to handlers as an extension.
pub async fn require_auth<S: CaseStore + 'static>(
  State(state): State<AppState<S>>,
  mut req: Request,
  next: Next,
) -> Result<Response, Error> {
  let credentials = Credentials::from_headers(req.headers())?;
  let staff = authenticate(state.store.as_ref(), &credentials).await?;

  if !policy::permits(&staff, req.method(), req.uri().path()) {
    tracing::info!(
      staff = staff.id,
      role = %staff.role,
      method = %req.method(),
      path = req.uri().path(),
      "request denied by role policy"
    );
    return Err(Error::Forbidden(format!(
      "role {} may not {} {}",
      staff.role,
      req.method(),
      req.uri().path()
    )));
  }

  req.extensions_mut().insert(staff);
  Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;

  fn headers(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
  }

  #[test]
  fn decodes_basic_credentials() {
    let encoded = B64.encode("hanako@example.com:pa:ss");
    let creds = Credentials::from_headers(&headers(&format!("Basic {encoded}"))).unwrap();
    assert_eq!(creds.email, "hanako@example.com");
    assert_eq!(creds.password, "pa:ss");
  }

  #[test]
  fn rejects_missing_or_malformed_headers() {
    assert!(matches!(Credentials::from_headers(&HeaderMap::new()), Err(Error::Unauthorized)));
    assert!(matches!(
      Credentials::from_headers(&headers("Bearer abc")),
      Err(Error::Unauthorized)
    ));
    assert!(matches!(
      Credentials::from_headers(&headers("Basic !!!not-base64!!!")),
      Err(Error::Unauthorized)
    ));
    let no_colon = B64.encode("hanako");
    assert!(matches!(
      Credentials::from_headers(&headers(&format!("Basic {no_colon}"))),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn unknown_users_are_checked_against_a_real_hash() {
    assert!(UNKNOWN_USER_HASH.starts_with("$argon2"));
    assert!(!verify_password("s3cret", &UNKNOWN_USER_HASH));
  }
}
