//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, dates as `YYYY-MM-DD`,
//! UUIDs as hyphenated lowercase strings, and structured fields
//! (citations, transforms, DQAF, confidence) as compact JSON.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;
use yeto_core::{
  contradiction::{Contradiction, ContradictionStatus, Severity},
  evidence::{EvidencePack, RegimeTag, ReportingCadence, SubjectRef, SubjectType, TimeCoverage},
  source::{Source, SourceTier},
  text::LocalizedText,
  vintage::{ChangeType, ClaimVintage},
};

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Timestamps and dates ────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  s.parse::<NaiveDate>().map_err(|e| Error::Decode(e.to_string()))
}

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_json<T: serde::Serialize>(value: &T) -> Result<String> {
  Ok(serde_json::to_string(value)?)
}

pub fn decode_json<T: serde::de::DeserializeOwned>(s: &str) -> Result<T> {
  Ok(serde_json::from_str(s)?)
}

// ─── Enum columns ────────────────────────────────────────────────────────────

pub fn encode_tier(t: SourceTier) -> &'static str {
  match t {
    SourceTier::T0 => "t0",
    SourceTier::T1 => "t1",
    SourceTier::T2 => "t2",
    SourceTier::T3 => "t3",
    SourceTier::T4 => "t4",
  }
}

pub fn decode_tier(s: &str) -> Result<SourceTier> {
  match s {
    "t0" => Ok(SourceTier::T0),
    "t1" => Ok(SourceTier::T1),
    "t2" => Ok(SourceTier::T2),
    "t3" => Ok(SourceTier::T3),
    "t4" => Ok(SourceTier::T4),
    other => Err(Error::Decode(format!("unknown source tier: {other:?}"))),
  }
}

pub fn encode_subject_type(t: SubjectType) -> &'static str { t.as_str() }

pub fn decode_subject_type(s: &str) -> Result<SubjectType> {
  SubjectType::parse(s)
    .ok_or_else(|| Error::Decode(format!("unknown subject type: {s:?}")))
}

pub fn encode_regime(r: RegimeTag) -> &'static str {
  match r {
    RegimeTag::Aden => "aden",
    RegimeTag::Sanaa => "sanaa",
    RegimeTag::Mixed => "mixed",
  }
}

pub fn decode_regime(s: &str) -> Result<RegimeTag> {
  match s {
    "aden" => Ok(RegimeTag::Aden),
    "sanaa" => Ok(RegimeTag::Sanaa),
    "mixed" => Ok(RegimeTag::Mixed),
    other => Err(Error::Decode(format!("unknown regime tag: {other:?}"))),
  }
}

pub fn encode_cadence(c: ReportingCadence) -> &'static str {
  match c {
    ReportingCadence::Monthly => "monthly",
    ReportingCadence::Quarterly => "quarterly",
    ReportingCadence::Annual => "annual",
  }
}

pub fn decode_cadence(s: &str) -> Result<ReportingCadence> {
  match s {
    "monthly" => Ok(ReportingCadence::Monthly),
    "quarterly" => Ok(ReportingCadence::Quarterly),
    "annual" => Ok(ReportingCadence::Annual),
    other => Err(Error::Decode(format!("unknown cadence: {other:?}"))),
  }
}

pub fn encode_change_type(c: ChangeType) -> &'static str {
  match c {
    ChangeType::Initial => "initial",
    ChangeType::Revision => "revision",
    ChangeType::Correction => "correction",
    ChangeType::Restatement => "restatement",
    ChangeType::MethodologyChange => "methodology_change",
  }
}

pub fn decode_change_type(s: &str) -> Result<ChangeType> {
  match s {
    "initial" => Ok(ChangeType::Initial),
    "revision" => Ok(ChangeType::Revision),
    "correction" => Ok(ChangeType::Correction),
    "restatement" => Ok(ChangeType::Restatement),
    "methodology_change" => Ok(ChangeType::MethodologyChange),
    other => Err(Error::Decode(format!("unknown change type: {other:?}"))),
  }
}

pub fn encode_status(s: ContradictionStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<ContradictionStatus> {
  ContradictionStatus::parse(s)
    .ok_or_else(|| Error::Decode(format!("unknown contradiction status: {s:?}")))
}

pub fn encode_severity(s: Severity) -> &'static str {
  match s {
    Severity::Minor => "minor",
    Severity::Significant => "significant",
    Severity::Major => "major",
    Severity::Critical => "critical",
  }
}

pub fn decode_severity(s: &str) -> Result<Severity> {
  match s {
    "minor" => Ok(Severity::Minor),
    "significant" => Ok(Severity::Significant),
    "major" => Ok(Severity::Major),
    "critical" => Ok(Severity::Critical),
    other => Err(Error::Decode(format!("unknown severity: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `sources` row.
pub struct RawSource {
  pub source_id:  String,
  pub name_en:    String,
  pub name_ar:    String,
  pub tier:       String,
  pub license:    String,
  pub url:        Option<String>,
  pub active:     bool,
  pub created_at: String,
}

impl RawSource {
  pub fn into_source(self) -> Result<Source> {
    Ok(Source {
      source_id:  self.source_id,
      name:       LocalizedText { en: self.name_en, ar: self.name_ar },
      tier:       decode_tier(&self.tier)?,
      license:    self.license,
      url:        self.url,
      active:     self.active,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `evidence_packs` row.
pub struct RawPack {
  pub pack_id:            String,
  pub subject_type:       String,
  pub subject_id:         String,
  pub version:            i64,
  pub citations:          String,
  pub transforms:         String,
  pub regime_tags:        String,
  pub geo_scope:          Option<String>,
  pub coverage_start:     String,
  pub coverage_end:       String,
  pub cadence:            String,
  pub missing_ranges:     String,
  pub contradiction_refs: String,
  pub dqaf:               String,
  pub uncertainty:        Option<String>,
  pub uncertainty_note:   Option<String>,
  pub confidence:         String,
  pub created_at:         String,
}

impl RawPack {
  pub fn into_pack(self) -> Result<EvidencePack> {
    let contradiction_refs: Vec<String> = decode_json(&self.contradiction_refs)?;
    let contradiction_refs = contradiction_refs
      .iter()
      .map(|s| decode_uuid(s))
      .collect::<Result<Vec<_>>>()?;

    Ok(EvidencePack {
      pack_id:            decode_uuid(&self.pack_id)?,
      subject:            SubjectRef {
        subject_type: decode_subject_type(&self.subject_type)?,
        subject_id:   self.subject_id,
      },
      version:            self.version as u32,
      citations:          decode_json(&self.citations)?,
      transforms:         decode_json(&self.transforms)?,
      regime_tags:        decode_json(&self.regime_tags)?,
      geo_scope:          self.geo_scope,
      time_coverage:      TimeCoverage {
        start: decode_date(&self.coverage_start)?,
        end:   decode_date(&self.coverage_end)?,
      },
      cadence:            decode_cadence(&self.cadence)?,
      missing_ranges:     decode_json(&self.missing_ranges)?,
      contradiction_refs,
      dqaf:               decode_json(&self.dqaf)?,
      uncertainty:        self.uncertainty.as_deref().map(decode_json).transpose()?,
      uncertainty_note:   self.uncertainty_note,
      confidence:         decode_json(&self.confidence)?,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `claim_vintages` row.
pub struct RawVintage {
  pub vintage_id:     String,
  pub subject_type:   String,
  pub subject_id:     String,
  pub version:        i64,
  pub value:          f64,
  pub unit:           Option<String>,
  pub effective_date: String,
  pub change_type:    String,
  pub supersedes:     Option<String>,
  pub pack_id:        String,
  pub recorded_at:    String,
}

impl RawVintage {
  pub fn into_vintage(self) -> Result<ClaimVintage> {
    Ok(ClaimVintage {
      vintage_id:     decode_uuid(&self.vintage_id)?,
      subject:        SubjectRef {
        subject_type: decode_subject_type(&self.subject_type)?,
        subject_id:   self.subject_id,
      },
      version:        self.version as u32,
      value:          self.value,
      unit:           self.unit,
      effective_date: decode_date(&self.effective_date)?,
      change_type:    decode_change_type(&self.change_type)?,
      supersedes:     self.supersedes.as_deref().map(decode_uuid).transpose()?,
      pack_id:        decode_uuid(&self.pack_id)?,
      recorded_at:    decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw strings read directly from a `contradictions` row.
pub struct RawContradiction {
  pub contradiction_id:  String,
  pub indicator_code:    String,
  pub period:            String,
  pub regime:            String,
  pub source_a:          String,
  pub value_a:           f64,
  pub source_b:          String,
  pub value_b:           f64,
  pub discrepancy_pct:   f64,
  pub severity:          String,
  pub plausible_reasons: String,
  pub status:            String,
  pub resolved_value:    Option<f64>,
  pub resolved_source:   Option<String>,
  pub reopened_from:     Option<String>,
  pub detected_at:       String,
  pub resolved_at:       Option<String>,
}

impl RawContradiction {
  pub fn into_contradiction(self) -> Result<Contradiction> {
    Ok(Contradiction {
      contradiction_id:  decode_uuid(&self.contradiction_id)?,
      indicator_code:    self.indicator_code,
      period:            decode_date(&self.period)?,
      regime:            decode_regime(&self.regime)?,
      source_a:          self.source_a,
      value_a:           self.value_a,
      source_b:          self.source_b,
      value_b:           self.value_b,
      discrepancy_pct:   self.discrepancy_pct,
      severity:          decode_severity(&self.severity)?,
      plausible_reasons: decode_json(&self.plausible_reasons)?,
      status:            decode_status(&self.status)?,
      resolved_value:    self.resolved_value,
      resolved_source:   self.resolved_source,
      reopened_from:     self.reopened_from.as_deref().map(decode_uuid).transpose()?,
      detected_at:       decode_dt(&self.detected_at)?,
      resolved_at:       self.resolved_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}
