//! Vitrine HTTP server assembly.
//!
//! Turns a [`ServerConfig`] into a [`ContentManager`] and mounts the JSON API
//! under `/api`, with request tracing and a liveness probe.

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use vitrine_core::{
  lock::LockOverride,
  manager::{ContentManager, ManagerConfig},
  store::SectionStore,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `VITRINE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "defaults::host")]
  pub host:                  String,
  #[serde(default = "defaults::port")]
  pub port:                  u16,
  #[serde(default = "defaults::store_path")]
  pub store_path:            PathBuf,
  #[serde(default = "defaults::default_lock_minutes")]
  pub default_lock_minutes:  u32,
  #[serde(default = "defaults::max_lock_minutes")]
  pub max_lock_minutes:      u32,
  /// Callers allowed to edit through other callers' locks. Empty disables
  /// the override.
  #[serde(default)]
  pub lock_override_callers: Vec<String>,
}

mod defaults {
  use std::path::PathBuf;

  pub fn host() -> String { "127.0.0.1".to_owned() }
  pub fn port() -> u16 { 8080 }
  pub fn store_path() -> PathBuf { PathBuf::from("vitrine.db") }
  pub fn default_lock_minutes() -> u32 { 30 }
  pub fn max_lock_minutes() -> u32 { 240 }
}

impl ServerConfig {
  pub fn manager_config(&self) -> ManagerConfig {
    ManagerConfig {
      default_lock_minutes: self.default_lock_minutes,
      max_lock_minutes:     self.max_lock_minutes,
      lock_override:        LockOverride::for_callers(
        self
          .lock_override_callers
          .iter()
          .map(|c| c.trim())
          .filter(|c| !c.is_empty()),
      ),
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router over `store`.
pub fn app<S>(store: S, config: &ServerConfig) -> Router
where
  S: SectionStore + 'static,
{
  let manager = Arc::new(ContentManager::new(store, config.manager_config()));

  Router::new()
    .route("/healthz", get(|| async { "ok" }))
    .nest("/api", vitrine_api::api_router(manager))
    .layer(TraceLayer::new_for_http())
}
