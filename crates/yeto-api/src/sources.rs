//! Handlers for `/sources` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/sources` | Optional `?tier=t0..t4&active=true\|false` |
//! | `POST` | `/sources` | Body: [`NewSource`]; upsert by id, returns 201 |
//! | `GET`  | `/sources/:id` | 404 if not found |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use yeto_core::{
  Error as CoreError,
  source::{NewSource, Source, SourceFilter, SourceTier},
  store::EvidenceStore,
};

use crate::{ApiState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub tier:   Option<SourceTier>,
  pub active: Option<bool>,
}

/// `GET /sources[?tier=<tier>][&active=<bool>]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Source>>, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let sources = state
    .store
    .list_sources(SourceFilter { tier: params.tier, active: params.active })
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(sources))
}

// ─── Register ─────────────────────────────────────────────────────────────────

/// `POST /sources` — admin import; registering an existing id replaces
/// the entry (sources are never deleted).
pub async fn register<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewSource>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let source = state
    .store
    .register_source(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(source)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /sources/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Source>, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let source = state
    .store
    .get_source(&id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(CoreError::SourceNotFound(id))?;
  Ok(Json(source))
}
