//! Handlers for `/contradictions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/contradictions/detect` | Body: two observations; 201 with the row, or 204 below the floor |
//! | `GET`  | `/contradictions` | Optional `?indicator=&status=&limit=&offset=` |
//! | `GET`  | `/contradictions/:id` | 404 if not found |
//! | `POST` | `/contradictions/:id/investigate` | No body |
//! | `POST` | `/contradictions/:id/explain` | Body: `{"plausible_reasons":[...]}` |
//! | `POST` | `/contradictions/:id/resolve` | Body: `{"resolved_value":..,"resolved_source":".."}` |
//! | `POST` | `/contradictions/:id/reopen` | New `detected` row referencing the old one |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Deserialize;
use uuid::Uuid;
use yeto_core::{
  Error as CoreError,
  contradiction::{Contradiction, ContradictionStatus, Observation, Transition, detect},
  store::{ContradictionFilter, EvidenceStore},
};

use crate::{ApiState, error::ApiError};

// ─── Detect ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /contradictions/detect` — one tuple from
/// the external cross-source comparison job.
#[derive(Debug, Deserialize)]
pub struct DetectBody {
  pub observation_a: Observation,
  pub observation_b: Observation,
}

/// `POST /contradictions/detect`
///
/// Returns 201 with the recorded contradiction, or 204 when the pair is
/// within normal measurement noise (no row is created).
pub async fn detect_pair<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<DetectBody>,
) -> Result<Response, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  match detect(&body.observation_a, &body.observation_b, &state.thresholds) {
    Some(found) => {
      let recorded = state
        .store
        .record_contradiction(found)
        .await
        .map_err(ApiError::from_store)?;
      Ok((StatusCode::CREATED, Json(recorded)).into_response())
    }
    None => Ok(StatusCode::NO_CONTENT.into_response()),
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub indicator: Option<String>,
  pub status:    Option<ContradictionStatus>,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
}

/// `GET /contradictions[?indicator=...][&status=...][&limit=...][&offset=...]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Contradiction>>, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let filter = ContradictionFilter {
    indicator_code: params.indicator,
    status:         params.status,
    limit:          params.limit,
    offset:         params.offset,
  };
  let rows = state
    .store
    .list_contradictions(&filter)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(rows))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /contradictions/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Contradiction>, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let row = state
    .store
    .get_contradiction(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(CoreError::ContradictionNotFound(id))?;
  Ok(Json(row))
}

// ─── Transitions ──────────────────────────────────────────────────────────────

/// `POST /contradictions/:id/investigate`
pub async fn investigate<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Contradiction>, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let row = state
    .store
    .transition_contradiction(id, Transition::Investigating)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(row))
}

#[derive(Debug, Deserialize)]
pub struct ExplainBody {
  pub plausible_reasons: Vec<String>,
}

/// `POST /contradictions/:id/explain` — the discrepancy is understood;
/// both values remain published side by side.
pub async fn explain<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ExplainBody>,
) -> Result<Json<Contradiction>, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let row = state
    .store
    .transition_contradiction(id, Transition::Explained {
      plausible_reasons: body.plausible_reasons,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(row))
}

#[derive(Debug, Deserialize)]
pub struct ResolveBody {
  pub resolved_value:  f64,
  pub resolved_source: String,
}

/// `POST /contradictions/:id/resolve`
pub async fn resolve<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ResolveBody>,
) -> Result<Json<Contradiction>, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let row = state
    .store
    .transition_contradiction(id, Transition::Resolved {
      resolved_value:  body.resolved_value,
      resolved_source: body.resolved_source,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(row))
}

/// `POST /contradictions/:id/reopen` — returns 201 with the new
/// `detected` row; the closed row is left untouched.
pub async fn reopen<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let row = state
    .store
    .reopen_contradiction(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(row)))
}
