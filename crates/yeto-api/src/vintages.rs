//! Handlers for `/vintages` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/vintages` | Body: [`NewVintage`]; appends to the subject's log |
//! | `GET`  | `/vintages/:subject_type/:subject_id` | `?as_of=` optional, defaults to today |
//! | `GET`  | `/vintages/:subject_type/:subject_id/history` | The full append-only log |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use yeto_core::{
  Error as CoreError,
  store::EvidenceStore,
  vintage::{ClaimVintage, NewVintage},
};

use crate::{ApiState, error::ApiError, packs::parse_subject};

// ─── Append ───────────────────────────────────────────────────────────────────

/// `POST /vintages` — returns 201 + the stored vintage with its assigned
/// version.
pub async fn append<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewVintage>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let vintage = state
    .store
    .append_vintage(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(vintage)))
}

// ─── Current ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CurrentParams {
  pub as_of: Option<NaiveDate>,
}

/// `GET /vintages/:subject_type/:subject_id[?as_of=YYYY-MM-DD]`
pub async fn current<S>(
  State(state): State<ApiState<S>>,
  Path((subject_type, subject_id)): Path<(String, String)>,
  Query(params): Query<CurrentParams>,
) -> Result<Json<ClaimVintage>, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let subject = parse_subject(&subject_type, subject_id)?;
  let as_of = params.as_of.unwrap_or_else(|| Utc::now().date_naive());

  let vintage = state
    .store
    .current_vintage(&subject, as_of)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| CoreError::VintageNotFound(subject.to_string()))?;
  Ok(Json(vintage))
}

// ─── History ──────────────────────────────────────────────────────────────────

/// `GET /vintages/:subject_type/:subject_id/history`
pub async fn history<S>(
  State(state): State<ApiState<S>>,
  Path((subject_type, subject_id)): Path<(String, String)>,
) -> Result<Json<Vec<ClaimVintage>>, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let subject = parse_subject(&subject_type, subject_id)?;
  let history = state
    .store
    .vintage_history(&subject)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(history))
}
