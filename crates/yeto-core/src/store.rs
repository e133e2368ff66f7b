//! The `EvidenceStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `yeto-store-sqlite`). Higher layers (`yeto-api`, `yeto-server`)
//! depend on this abstraction, not on any concrete backend, and every
//! component receives its store handle explicitly — there is no ambient
//! global connection.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  contradiction::{
    Contradiction, ContradictionStatus, NewContradiction, Transition,
  },
  evidence::{EvidencePack, SubjectRef},
  source::{NewSource, Source, SourceFilter},
  vintage::{ClaimVintage, NewVintage},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`EvidenceStore::list_contradictions`].
#[derive(Debug, Clone, Default)]
pub struct ContradictionFilter {
  pub indicator_code: Option<String>,
  pub status:         Option<ContradictionStatus>,
  pub limit:          Option<usize>,
  pub offset:         Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a YETO evidence store backend.
///
/// Evidence packs and claim vintages are strictly append-only; the only
/// mutation in the whole model is the contradiction status transition,
/// which backends must apply as a compare-and-set on the current status
/// (a conditional update, never a read-then-write round trip).
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait EvidenceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Source registry ───────────────────────────────────────────────────

  /// Register a source, or replace the entry when the id is already
  /// taken. Sources are never deleted.
  fn register_source(
    &self,
    input: NewSource,
  ) -> impl Future<Output = Result<Source, Self::Error>> + Send + '_;

  /// Retrieve a source by id. Returns `None` if not found — callers
  /// treat an unknown source as a data-quality defect, not a crash.
  fn get_source<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Source>, Self::Error>> + Send + 'a;

  /// List registry entries, optionally filtered by tier and active flag.
  fn list_sources(
    &self,
    filter: SourceFilter,
  ) -> impl Future<Output = Result<Vec<Source>, Self::Error>> + Send + '_;

  // ── Evidence packs — append-only versions ─────────────────────────────

  /// Persist a built pack as the subject's next version (1-based) and
  /// return it with the version filled in. Existing versions are never
  /// rewritten.
  fn put_pack(
    &self,
    pack: EvidencePack,
  ) -> impl Future<Output = Result<EvidencePack, Self::Error>> + Send + '_;

  /// Fetch one pack version, or the latest when `version` is `None`.
  fn get_pack<'a>(
    &'a self,
    subject: &'a SubjectRef,
    version: Option<u32>,
  ) -> impl Future<Output = Result<Option<EvidencePack>, Self::Error>> + Send + 'a;

  /// All persisted version numbers for a subject, ascending.
  fn list_pack_versions<'a>(
    &'a self,
    subject: &'a SubjectRef,
  ) -> impl Future<Output = Result<Vec<u32>, Self::Error>> + Send + 'a;

  // ── Claim vintages — append-only log ──────────────────────────────────

  /// Append a vintage after sequence validation
  /// ([`crate::vintage::check_append`]).
  fn append_vintage(
    &self,
    input: NewVintage,
  ) -> impl Future<Output = Result<ClaimVintage, Self::Error>> + Send + '_;

  /// Full vintage log for a subject, ascending by version.
  fn vintage_history<'a>(
    &'a self,
    subject: &'a SubjectRef,
  ) -> impl Future<Output = Result<Vec<ClaimVintage>, Self::Error>> + Send + 'a;

  /// The vintage current at `as_of` (see
  /// [`crate::vintage::current_as_of`]).
  fn current_vintage<'a>(
    &'a self,
    subject: &'a SubjectRef,
    as_of: NaiveDate,
  ) -> impl Future<Output = Result<Option<ClaimVintage>, Self::Error>> + Send + 'a;

  // ── Contradiction registry ────────────────────────────────────────────

  /// Persist a detected contradiction with status `detected`.
  fn record_contradiction(
    &self,
    input: NewContradiction,
  ) -> impl Future<Output = Result<Contradiction, Self::Error>> + Send + '_;

  fn get_contradiction(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Contradiction>, Self::Error>> + Send + '_;

  fn list_contradictions<'a>(
    &'a self,
    filter: &'a ContradictionFilter,
  ) -> impl Future<Output = Result<Vec<Contradiction>, Self::Error>> + Send + 'a;

  /// Apply a status transition with compare-and-set semantics: the row
  /// is updated only while its status still equals the transition's
  /// single legal predecessor. Losing the race surfaces as an illegal
  /// transition, not a silent double-apply.
  fn transition_contradiction(
    &self,
    id: Uuid,
    transition: Transition,
  ) -> impl Future<Output = Result<Contradiction, Self::Error>> + Send + '_;

  /// Reopen a closed (`explained` or `resolved`) contradiction by
  /// inserting a fresh `detected` row that references the old one. The
  /// old row is left untouched.
  fn reopen_contradiction(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Contradiction, Self::Error>> + Send + '_;
}
