//! HTTP server for CareTrack.
//!
//! Mounts the [`caretrack_api`] router under `/api`, adds `POST /login`, and
//! wraps everything in Basic authentication, the role [`policy`] and request
//! tracing.

pub mod auth;
pub mod error;
pub mod policy;

pub use error::Error;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Extension, Json, Router, extract::State, middleware, routing::post};
use caretrack_api::ApiError;
use caretrack_core::{staff::Staff, store::CaseStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, layered from an optional TOML file and
/// `CARETRACK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:     String,
  pub port:     u16,
  /// Directory holding `caretrack.db` and its backups. A leading `~` is
  /// expanded by [`ServerConfig::load`].
  pub data_dir: PathBuf,
}

impl ServerConfig {
  pub const ENV_PREFIX: &'static str = "CARETRACK";

  /// Load from `path` (if it exists) and the environment, on top of the
  /// defaults `127.0.0.1:8080` and `~/.caretrack`.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    let settings = config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080)?
      .set_default("data_dir", "~/.caretrack")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(Self::ENV_PREFIX))
      .build()?;

    let mut cfg: Self = settings.try_deserialize()?;
    cfg.data_dir = expand_tilde(&cfg.data_dir);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  if s == "~"
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home);
  }
  path.to_path_buf()
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the server's own handlers and middleware.
pub struct AppState<S> {
  pub store: Arc<S>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete server [`Router`].
pub fn router<S: CaseStore + 'static>(state: AppState<S>) -> Router {
  Router::new()
    .route("/login", post(login::<S>))
    .with_state(state.clone())
    .nest("/api", caretrack_api::api_router(Arc::clone(&state.store)))
    .layer(middleware::from_fn_with_state(state, auth::require_auth::<S>))
    .layer(TraceLayer::new_for_http())
}

/// `POST /login`: the credentials were already verified by the auth
/// middleware; stamp the login time and return the profile.
async fn login<S: CaseStore>(
  State(state): State<AppState<S>>,
  Extension(staff): Extension<Staff>,
) -> Result<Json<Staff>, Error> {
  let staff = state
    .store
    .record_staff_login(staff.id)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(staff = staff.id, role = %staff.role, "staff logged in");
  Ok(Json(staff))
}

#[cfg(test)]
mod tests;
