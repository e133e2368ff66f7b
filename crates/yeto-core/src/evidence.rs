//! Evidence packs — the unit of trust for one published claim.
//!
//! A pack bundles citations, documented transforms, DQAF dimension
//! statuses, coverage gaps, and a derived confidence grade for a single
//! subject. Packs are never updated in place: a correction creates a new
//! pack version, so any past state can be reconstructed.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  contradiction::Contradiction,
  grade::{GradedConfidence, grade},
  source::{Source, SourceTier},
};

// ─── Subjects ────────────────────────────────────────────────────────────────

/// What kind of published claim a pack vouches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
  Kpi,
  Dataset,
  Publication,
}

impl SubjectType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Kpi => "kpi",
      Self::Dataset => "dataset",
      Self::Publication => "publication",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "kpi" => Some(Self::Kpi),
      "dataset" => Some(Self::Dataset),
      "publication" => Some(Self::Publication),
      _ => None,
    }
  }
}

/// Composite key for the thing a pack (or claim vintage) is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectRef {
  pub subject_type: SubjectType,
  pub subject_id:   String,
}

impl fmt::Display for SubjectRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.subject_type.as_str(), self.subject_id)
  }
}

/// Which de-facto authority's jurisdiction a figure pertains to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegimeTag {
  Aden,
  Sanaa,
  Mixed,
}

// ─── Citations and transforms ────────────────────────────────────────────────

/// Pointer to an archived copy of a cited document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRef {
  pub object_key:   String,
  /// SHA-256 hex digest of the archived bytes.
  pub content_hash: String,
  pub media_type:   String,
}

/// One evidentiary reference inside a pack. Immutable once recorded;
/// corrections append a new citation in a new pack version rather than
/// mutating this one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
  pub source_id:         String,
  pub title:             String,
  pub publisher:         String,
  pub retrieved_at:      NaiveDate,
  pub license_confirmed: bool,
  /// Page, table, or anchor within the cited document.
  pub locator:           Option<String>,
  pub snapshot:          Option<SnapshotRef>,
}

/// A documented derivation step explaining how a displayed value was
/// computed from raw source data. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transform {
  pub formula:     String,
  pub parameters:  serde_json::Value,
  pub code_ref:    Option<String>,
  pub assumptions: Vec<String>,
}

// ─── DQAF ────────────────────────────────────────────────────────────────────

/// Status of one DQAF dimension. Each dimension is reported on its own;
/// the five statuses are never averaged into a single score.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DqafStatus {
  Pass,
  NeedsReview,
  #[default]
  Unknown,
}

/// The five independent DQAF dimension statuses.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct DqafAssessment {
  pub integrity:      DqafStatus,
  pub methodology:    DqafStatus,
  pub accuracy:       DqafStatus,
  pub serviceability: DqafStatus,
  pub accessibility:  DqafStatus,
}

impl DqafAssessment {
  pub fn dimensions(&self) -> [(&'static str, DqafStatus); 5] {
    [
      ("integrity", self.integrity),
      ("methodology", self.methodology),
      ("accuracy", self.accuracy),
      ("serviceability", self.serviceability),
      ("accessibility", self.accessibility),
    ]
  }

  pub fn any(&self, status: DqafStatus) -> bool {
    self.dimensions().iter().any(|(_, s)| *s == status)
  }

  /// True when no dimension has been assessed at all.
  pub fn is_unassessed(&self) -> bool {
    self.dimensions().iter().all(|(_, s)| *s == DqafStatus::Unknown)
  }
}

// ─── Coverage ────────────────────────────────────────────────────────────────

/// Expected reporting cadence for a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportingCadence {
  Monthly,
  Quarterly,
  Annual,
}

/// Closed date range a pack claims to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeCoverage {
  pub start: NaiveDate,
  pub end:   NaiveDate,
}

/// A contiguous run of expected reporting periods with no observation.
/// `from` and `to` are period start dates, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
  pub from: NaiveDate,
  pub to:   NaiveDate,
}

/// Normalise a date to the start of its reporting period.
fn period_start(d: NaiveDate, cadence: ReportingCadence) -> NaiveDate {
  let month = match cadence {
    ReportingCadence::Monthly => d.month(),
    ReportingCadence::Quarterly => ((d.month() - 1) / 3) * 3 + 1,
    ReportingCadence::Annual => 1,
  };
  // Day 1 of an in-range month always exists.
  NaiveDate::from_ymd_opt(d.year(), month, 1).unwrap_or(d)
}

fn next_period(start: NaiveDate, cadence: ReportingCadence) -> NaiveDate {
  let months = match cadence {
    ReportingCadence::Monthly => 1,
    ReportingCadence::Quarterly => 3,
    ReportingCadence::Annual => 12,
  };
  let total = start.year() * 12 + start.month0() as i32 + months;
  let (year, month0) = (total.div_euclid(12), total.rem_euclid(12));
  NaiveDate::from_ymd_opt(year, month0 as u32 + 1, 1).unwrap_or(start)
}

/// Derive coverage gaps by diffing the expected period grid against the
/// periods that actually carry observations.
///
/// Gap lists are always computed, never hand-entered: a hand-maintained
/// list silently hides new holes as coverage drifts.
pub fn derive_missing_ranges(
  coverage: TimeCoverage,
  cadence:  ReportingCadence,
  observed: &[NaiveDate],
) -> Vec<PeriodRange> {
  let observed: HashSet<NaiveDate> =
    observed.iter().map(|d| period_start(*d, cadence)).collect();

  let mut missing: Vec<PeriodRange> = Vec::new();
  let mut cursor = period_start(coverage.start, cadence);

  while cursor <= coverage.end {
    if !observed.contains(&cursor) {
      let extends_previous = missing
        .last()
        .is_some_and(|last| next_period(last.to, cadence) == cursor);
      if extends_previous {
        if let Some(last) = missing.last_mut() {
          last.to = cursor;
        }
      } else {
        missing.push(PeriodRange { from: cursor, to: cursor });
      }
    }
    cursor = next_period(cursor, cadence);
  }

  missing
}

// ─── Uncertainty ─────────────────────────────────────────────────────────────

/// Interval bounds around a published value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyInterval {
  pub lower: f64,
  pub upper: f64,
}

// ─── EvidencePack ────────────────────────────────────────────────────────────

/// The unit of trust for one published subject.
///
/// Versions are append-only: a later correction creates version N+1 and
/// never rewrites an existing row, so as-of queries can always
/// reconstruct what was published at any past point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidencePack {
  pub pack_id:            Uuid,
  pub subject:            SubjectRef,
  /// 1-based, assigned by the store on persist.
  pub version:            u32,
  pub citations:          Vec<Citation>,
  pub transforms:         Vec<Transform>,
  pub regime_tags:        Vec<RegimeTag>,
  pub geo_scope:          Option<String>,
  pub time_coverage:      TimeCoverage,
  pub cadence:            ReportingCadence,
  /// Derived by [`derive_missing_ranges`]; never accepted from callers.
  pub missing_ranges:     Vec<PeriodRange>,
  pub contradiction_refs: Vec<Uuid>,
  pub dqaf:               DqafAssessment,
  pub uncertainty:        Option<UncertaintyInterval>,
  pub uncertainty_note:   Option<String>,
  pub confidence:         GradedConfidence,
  pub created_at:         DateTime<Utc>,
}

/// Input to [`build_pack`]. `missing_ranges` and `confidence` are not
/// accepted from callers — both are derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackInput {
  pub subject:            SubjectRef,
  pub citations:          Vec<Citation>,
  #[serde(default)]
  pub transforms:         Vec<Transform>,
  #[serde(default)]
  pub regime_tags:        Vec<RegimeTag>,
  pub geo_scope:          Option<String>,
  pub time_coverage:      TimeCoverage,
  pub cadence:            ReportingCadence,
  /// Dates (one per reporting period) that actually have observations.
  #[serde(default)]
  pub observed_periods:   Vec<NaiveDate>,
  #[serde(default)]
  pub contradiction_refs: Vec<Uuid>,
  #[serde(default)]
  pub dqaf:               DqafAssessment,
  pub uncertainty:        Option<UncertaintyInterval>,
  pub uncertainty_note:   Option<String>,
}

/// Assemble and validate an evidence pack.
///
/// `known_sources` is the registry slice citations must resolve against;
/// `contradictions` are the records named by `contradiction_refs`, used
/// for grading only.
///
/// Fails with [`Error::InsufficientEvidence`] on an empty citation list
/// and [`Error::UnknownSource`] when a citation references an
/// unregistered source — an unresolved reference is a data-quality
/// defect surfaced to the caller, never published past.
pub fn build_pack(
  input:          PackInput,
  known_sources:  &[Source],
  contradictions: &[Contradiction],
) -> Result<EvidencePack> {
  if input.citations.is_empty() {
    return Err(Error::InsufficientEvidence);
  }

  let mut best_tier: Option<SourceTier> = None;
  for citation in &input.citations {
    let source = known_sources
      .iter()
      .find(|s| s.source_id == citation.source_id)
      .ok_or_else(|| Error::UnknownSource(citation.source_id.clone()))?;
    best_tier = Some(match best_tier {
      Some(t) => t.min(source.tier),
      None => source.tier,
    });
  }

  let missing_ranges = derive_missing_ranges(
    input.time_coverage,
    input.cadence,
    &input.observed_periods,
  );

  let unresolved = contradictions
    .iter()
    .filter(|c| c.status.is_unresolved())
    .count();
  let confidence = grade(best_tier, &input.dqaf, unresolved);

  Ok(EvidencePack {
    pack_id:            Uuid::new_v4(),
    subject:            input.subject,
    version:            0,
    citations:          input.citations,
    transforms:         input.transforms,
    regime_tags:        input.regime_tags,
    geo_scope:          input.geo_scope,
    time_coverage:      input.time_coverage,
    cadence:            input.cadence,
    missing_ranges,
    contradiction_refs: input.contradiction_refs,
    dqaf:               input.dqaf,
    uncertainty:        input.uncertainty,
    uncertainty_note:   input.uncertainty_note,
    confidence,
    created_at:         Utc::now(),
  })
}

/// Re-grade an existing pack against the current state of the
/// contradictions it references.
pub fn grade_pack(
  pack:           &EvidencePack,
  known_sources:  &[Source],
  contradictions: &[Contradiction],
) -> GradedConfidence {
  let best_tier = pack
    .citations
    .iter()
    .filter_map(|c| {
      known_sources
        .iter()
        .find(|s| s.source_id == c.source_id)
        .map(|s| s.tier)
    })
    .min();
  let unresolved = contradictions
    .iter()
    .filter(|c| c.status.is_unresolved())
    .count();
  grade(best_tier, &pack.dqaf, unresolved)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::text::LocalizedText;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn registry_source(id: &str, tier: SourceTier) -> Source {
    Source {
      source_id:  id.to_string(),
      name:       LocalizedText::new(id, id),
      tier,
      license:    "CC-BY-4.0".to_string(),
      url:        None,
      active:     true,
      created_at: Utc::now(),
    }
  }

  fn citation(source_id: &str) -> Citation {
    Citation {
      source_id:         source_id.to_string(),
      title:             "Monthly bulletin".to_string(),
      publisher:         "CBY Aden".to_string(),
      retrieved_at:      date(2024, 3, 1),
      license_confirmed: true,
      locator:           Some("table 4".to_string()),
      snapshot:          None,
    }
  }

  fn input(citations: Vec<Citation>) -> PackInput {
    PackInput {
      subject:            SubjectRef {
        subject_type: SubjectType::Kpi,
        subject_id:   "fx.usd.sell".to_string(),
      },
      citations,
      transforms:         vec![],
      regime_tags:        vec![RegimeTag::Aden],
      geo_scope:          Some("Aden governorate".to_string()),
      time_coverage:      TimeCoverage {
        start: date(2023, 1, 1),
        end:   date(2023, 12, 31),
      },
      cadence:            ReportingCadence::Monthly,
      observed_periods:   (1..=12).map(|m| date(2023, m, 1)).collect(),
      contradiction_refs: vec![],
      dqaf:               DqafAssessment::default(),
      uncertainty:        None,
      uncertainty_note:   None,
    }
  }

  // ── Builder validation ─────────────────────────────────────────────────

  #[test]
  fn empty_citations_is_insufficient_evidence() {
    let err = build_pack(input(vec![]), &[], &[]).unwrap_err();
    assert!(matches!(err, Error::InsufficientEvidence));
  }

  #[test]
  fn unknown_source_is_rejected() {
    let registry = [registry_source("cby-aden", SourceTier::T0)];
    let err = build_pack(input(vec![citation("ghost")]), &registry, &[])
      .unwrap_err();
    assert!(matches!(err, Error::UnknownSource(id) if id == "ghost"));
  }

  #[test]
  fn valid_pack_builds_and_grades() {
    let registry = [registry_source("cby-aden", SourceTier::T0)];
    let pack =
      build_pack(input(vec![citation("cby-aden")]), &registry, &[]).unwrap();
    assert_eq!(pack.citations.len(), 1);
    assert!(pack.missing_ranges.is_empty());
    // No DQAF assessment: the moderate baseline.
    assert_eq!(pack.confidence.grade, crate::grade::Grade::C);
  }

  // ── Missing-range derivation ───────────────────────────────────────────

  #[test]
  fn full_monthly_coverage_has_no_gaps() {
    let coverage = TimeCoverage {
      start: date(2023, 1, 1),
      end:   date(2023, 6, 30),
    };
    let observed: Vec<_> = (1..=6).map(|m| date(2023, m, 15)).collect();
    let gaps =
      derive_missing_ranges(coverage, ReportingCadence::Monthly, &observed);
    assert!(gaps.is_empty());
  }

  #[test]
  fn consecutive_missing_months_coalesce() {
    let coverage = TimeCoverage {
      start: date(2023, 1, 1),
      end:   date(2023, 6, 30),
    };
    // February, March, and May have no observations.
    let observed =
      vec![date(2023, 1, 1), date(2023, 4, 1), date(2023, 6, 1)];
    let gaps =
      derive_missing_ranges(coverage, ReportingCadence::Monthly, &observed);
    assert_eq!(gaps, vec![
      PeriodRange { from: date(2023, 2, 1), to: date(2023, 3, 1) },
      PeriodRange { from: date(2023, 5, 1), to: date(2023, 5, 1) },
    ]);
  }

  #[test]
  fn quarterly_periods_normalise_mid_quarter_dates() {
    let coverage = TimeCoverage {
      start: date(2023, 1, 1),
      end:   date(2023, 12, 31),
    };
    // An observation anywhere inside Q2 covers all of Q2.
    let observed = vec![date(2023, 2, 10), date(2023, 5, 20)];
    let gaps =
      derive_missing_ranges(coverage, ReportingCadence::Quarterly, &observed);
    assert_eq!(gaps, vec![PeriodRange {
      from: date(2023, 7, 1),
      to:   date(2023, 10, 1),
    }]);
  }

  #[test]
  fn empty_observations_mark_whole_coverage_missing() {
    let coverage = TimeCoverage {
      start: date(2022, 1, 1),
      end:   date(2023, 12, 31),
    };
    let gaps =
      derive_missing_ranges(coverage, ReportingCadence::Annual, &[]);
    assert_eq!(gaps, vec![PeriodRange {
      from: date(2022, 1, 1),
      to:   date(2023, 1, 1),
    }]);
  }

  #[test]
  fn year_boundary_months_stay_contiguous() {
    let coverage = TimeCoverage {
      start: date(2022, 11, 1),
      end:   date(2023, 2, 28),
    };
    let gaps =
      derive_missing_ranges(coverage, ReportingCadence::Monthly, &[]);
    assert_eq!(gaps, vec![PeriodRange {
      from: date(2022, 11, 1),
      to:   date(2023, 2, 1),
    }]);
  }
}
