//! JSON REST API for the YETO evidence core.
//!
//! Exposes an axum [`Router`] backed by any
//! [`yeto_core::store::EvidenceStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", yeto_api::api_router(state))
//! ```

pub mod contradictions;
pub mod error;
pub mod packs;
pub mod sources;
pub mod vintages;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use yeto_core::{contradiction::SeverityThresholds, store::EvidenceStore};

pub use error::ApiError;


// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through all API handlers: the store handle plus
/// the deployment's configured severity thresholds.
pub struct ApiState<S> {
  pub store:      Arc<S>,
  pub thresholds: SeverityThresholds,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:      Arc::clone(&self.store),
      thresholds: self.thresholds,
    }
  }
}

impl<S> ApiState<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store, thresholds: SeverityThresholds::default() }
  }

  pub fn with_thresholds(store: Arc<S>, thresholds: SeverityThresholds) -> Self {
    Self { store, thresholds }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: EvidenceStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Source registry
    .route(
      "/sources",
      get(sources::list::<S>).post(sources::register::<S>),
    )
    .route("/sources/{id}", get(sources::get_one::<S>))
    // Evidence packs
    .route("/packs", post(packs::create::<S>))
    .route(
      "/packs/{subject_type}/{subject_id}",
      get(packs::get_one::<S>),
    )
    .route(
      "/packs/{subject_type}/{subject_id}/versions",
      get(packs::versions::<S>),
    )
    .route(
      "/packs/{subject_type}/{subject_id}/grade",
      get(packs::grade_live::<S>),
    )
    .route(
      "/packs/{subject_type}/{subject_id}/export",
      get(packs::export_bundle::<S>),
    )
    // Contradiction registry
    .route("/contradictions", get(contradictions::list::<S>))
    .route("/contradictions/detect", post(contradictions::detect_pair::<S>))
    .route("/contradictions/{id}", get(contradictions::get_one::<S>))
    .route(
      "/contradictions/{id}/investigate",
      post(contradictions::investigate::<S>),
    )
    .route(
      "/contradictions/{id}/explain",
      post(contradictions::explain::<S>),
    )
    .route(
      "/contradictions/{id}/resolve",
      post(contradictions::resolve::<S>),
    )
    .route(
      "/contradictions/{id}/reopen",
      post(contradictions::reopen::<S>),
    )
    // Claim vintages
    .route("/vintages", post(vintages::append::<S>))
    .route(
      "/vintages/{subject_type}/{subject_id}",
      get(vintages::current::<S>),
    )
    .route(
      "/vintages/{subject_type}/{subject_id}/history",
      get(vintages::history::<S>),
    )
    .with_state(state)
}
