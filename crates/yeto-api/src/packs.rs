//! Handlers for `/packs` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/packs` | Body: [`PackInput`]; validates, grades, persists next version |
//! | `GET`  | `/packs/:subject_type/:subject_id` | `?version=` optional, latest by default |
//! | `GET`  | `/packs/:subject_type/:subject_id/versions` | Persisted version numbers |
//! | `GET`  | `/packs/:subject_type/:subject_id/grade` | Re-grade against current contradiction statuses |
//! | `GET`  | `/packs/:subject_type/:subject_id/export` | `evidence_pack.json` + `license_summary.json` bundle |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use yeto_core::{
  Error as CoreError,
  contradiction::Contradiction,
  evidence::{
    EvidencePack, PackInput, SubjectRef, SubjectType, build_pack, grade_pack,
  },
  grade::GradedConfidence,
  source::{Source, SourceFilter},
  store::EvidenceStore,
};
use yeto_export::ExportBundle;

use crate::{ApiState, error::ApiError};

/// Parse the `:subject_type/:subject_id` path pair.
pub(crate) fn parse_subject(
  subject_type: &str,
  subject_id:   String,
) -> Result<SubjectRef, ApiError> {
  let subject_type = SubjectType::parse(subject_type).ok_or_else(|| {
    ApiError::BadRequest(format!("unknown subject type: {subject_type:?}"))
  })?;
  Ok(SubjectRef { subject_type, subject_id })
}

/// Fetch every contradiction named by `refs`; a dangling reference is a
/// data-quality defect and fails the request.
async fn load_contradictions<S>(
  state: &ApiState<S>,
  refs:  &[Uuid],
) -> Result<Vec<Contradiction>, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut contradictions = Vec::with_capacity(refs.len());
  for id in refs {
    let found = state
      .store
      .get_contradiction(*id)
      .await
      .map_err(ApiError::from_store)?
      .ok_or(CoreError::ContradictionNotFound(*id))?;
    contradictions.push(found);
  }
  Ok(contradictions)
}

async fn load_registry<S>(state: &ApiState<S>) -> Result<Vec<Source>, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .list_sources(SourceFilter::default())
    .await
    .map_err(ApiError::from_store)
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /packs` — returns 201 + the persisted pack (version assigned).
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<PackInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let registry = load_registry(&state).await?;
  let contradictions =
    load_contradictions(&state, &body.contradiction_refs).await?;

  let pack = build_pack(body, &registry, &contradictions)?;
  let stored = state
    .store
    .put_pack(pack)
    .await
    .map_err(ApiError::from_store)?;

  Ok((StatusCode::CREATED, Json(stored)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GetParams {
  pub version: Option<u32>,
}

/// `GET /packs/:subject_type/:subject_id[?version=N]`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path((subject_type, subject_id)): Path<(String, String)>,
  Query(params): Query<GetParams>,
) -> Result<Json<EvidencePack>, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let subject = parse_subject(&subject_type, subject_id)?;
  let pack = state
    .store
    .get_pack(&subject, params.version)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| CoreError::PackNotFound(subject.to_string()))?;
  Ok(Json(pack))
}

/// `GET /packs/:subject_type/:subject_id/versions`
pub async fn versions<S>(
  State(state): State<ApiState<S>>,
  Path((subject_type, subject_id)): Path<(String, String)>,
) -> Result<Json<Vec<u32>>, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let subject = parse_subject(&subject_type, subject_id)?;
  let versions = state
    .store
    .list_pack_versions(&subject)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(versions))
}

// ─── Live grade ───────────────────────────────────────────────────────────────

/// `GET /packs/:subject_type/:subject_id/grade`
///
/// Re-grades the latest pack version against the **current** status of
/// the contradictions it references, so a resolution shows up without
/// republishing the pack.
pub async fn grade_live<S>(
  State(state): State<ApiState<S>>,
  Path((subject_type, subject_id)): Path<(String, String)>,
) -> Result<Json<GradedConfidence>, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let subject = parse_subject(&subject_type, subject_id)?;
  let pack = state
    .store
    .get_pack(&subject, None)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| CoreError::PackNotFound(subject.to_string()))?;

  let registry = load_registry(&state).await?;
  let contradictions =
    load_contradictions(&state, &pack.contradiction_refs).await?;

  Ok(Json(grade_pack(&pack, &registry, &contradictions)))
}

// ─── Export ───────────────────────────────────────────────────────────────────

/// `GET /packs/:subject_type/:subject_id/export[?version=N]`
pub async fn export_bundle<S>(
  State(state): State<ApiState<S>>,
  Path((subject_type, subject_id)): Path<(String, String)>,
  Query(params): Query<GetParams>,
) -> Result<Json<ExportBundle>, ApiError>
where
  S: EvidenceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let subject = parse_subject(&subject_type, subject_id)?;
  let pack = state
    .store
    .get_pack(&subject, params.version)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| CoreError::PackNotFound(subject.to_string()))?;

  let registry = load_registry(&state).await?;
  let bundle =
    yeto_export::export_pack(&pack, &registry).map_err(ApiError::from_store)?;
  Ok(Json(bundle))
}
