//! Claim vintages — the append-only log of published values.
//!
//! A correction never mutates a prior row; it appends a new vintage with
//! an explicit change type and a back-reference to what it supersedes.
//! Any as-of date can therefore reconstruct exactly what was published
//! at that point.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, evidence::SubjectRef};

/// Why a new vintage was published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
  Initial,
  Revision,
  Correction,
  Restatement,
  MethodologyChange,
}

/// One immutable published value for a subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimVintage {
  pub vintage_id:     Uuid,
  pub subject:        SubjectRef,
  /// 1-based position in the subject's log; assigned by the store.
  pub version:        u32,
  pub value:          f64,
  pub unit:           Option<String>,
  /// The real-world date this value is published as true for.
  pub effective_date: NaiveDate,
  pub change_type:    ChangeType,
  /// The vintage this one replaces; required for every change type
  /// except `Initial`.
  pub supersedes:     Option<Uuid>,
  /// The single evidence-pack version this assertion is tied to.
  pub pack_id:        Uuid,
  pub recorded_at:    DateTime<Utc>,
}

/// Input to [`crate::store::EvidenceStore::append_vintage`].
/// `version` and `recorded_at` are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVintage {
  pub subject:        SubjectRef,
  pub value:          f64,
  pub unit:           Option<String>,
  pub effective_date: NaiveDate,
  pub change_type:    ChangeType,
  pub supersedes:     Option<Uuid>,
  pub pack_id:        Uuid,
}

/// Select the vintage current at `as_of`: the newest whose effective date
/// is on or before it. Exactly one per (subject, as-of) whenever any
/// vintage is effective by then.
pub fn current_as_of(
  vintages: &[ClaimVintage],
  as_of:    NaiveDate,
) -> Option<&ClaimVintage> {
  vintages
    .iter()
    .filter(|v| v.effective_date <= as_of)
    .max_by_key(|v| (v.effective_date, v.version))
}

/// Validate an append against the existing log for the subject.
/// `Initial` opens a log; every other change type must supersede the
/// latest existing row.
pub fn check_append(existing: &[ClaimVintage], input: &NewVintage) -> Result<()> {
  match input.change_type {
    ChangeType::Initial => {
      if !existing.is_empty() {
        return Err(Error::VintageSequence(
          "initial vintage on a non-empty log".to_string(),
        ));
      }
      if input.supersedes.is_some() {
        return Err(Error::VintageSequence(
          "initial vintage cannot supersede".to_string(),
        ));
      }
    }
    _ => {
      let latest = existing
        .iter()
        .max_by_key(|v| v.version)
        .ok_or_else(|| {
          Error::VintageSequence("no prior vintage to supersede".to_string())
        })?;
      match input.supersedes {
        Some(id) if id == latest.vintage_id => {}
        Some(_) => {
          return Err(Error::VintageSequence(
            "supersedes must reference the latest vintage".to_string(),
          ));
        }
        None => {
          return Err(Error::VintageSequence(
            "this change type requires a superseded vintage".to_string(),
          ));
        }
      }
    }
  }
  Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::evidence::SubjectType;

  fn subject() -> SubjectRef {
    SubjectRef {
      subject_type: SubjectType::Kpi,
      subject_id:   "cpi.yoy".to_string(),
    }
  }

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn vintage(
    version:        u32,
    effective_date: NaiveDate,
    change_type:    ChangeType,
    supersedes:     Option<Uuid>,
  ) -> ClaimVintage {
    ClaimVintage {
      vintage_id: Uuid::new_v4(),
      subject: subject(),
      version,
      value: 30.0 + version as f64,
      unit: Some("percent".to_string()),
      effective_date,
      change_type,
      supersedes,
      pack_id: Uuid::new_v4(),
      recorded_at: Utc::now(),
    }
  }

  #[test]
  fn as_of_picks_the_newest_effective_vintage() {
    let first = vintage(1, date(2023, 1, 1), ChangeType::Initial, None);
    let second = vintage(
      2,
      date(2023, 6, 1),
      ChangeType::Revision,
      Some(first.vintage_id),
    );
    let log = vec![first.clone(), second.clone()];

    assert_eq!(
      current_as_of(&log, date(2023, 3, 1)).map(|v| v.version),
      Some(1)
    );
    assert_eq!(
      current_as_of(&log, date(2023, 6, 1)).map(|v| v.version),
      Some(2)
    );
    assert_eq!(
      current_as_of(&log, date(2024, 1, 1)).map(|v| v.version),
      Some(2)
    );
    assert!(current_as_of(&log, date(2022, 12, 31)).is_none());
  }

  #[test]
  fn same_effective_date_prefers_the_later_version() {
    let first = vintage(1, date(2023, 1, 1), ChangeType::Initial, None);
    let fix = vintage(
      2,
      date(2023, 1, 1),
      ChangeType::Correction,
      Some(first.vintage_id),
    );
    let log = vec![first, fix];
    assert_eq!(
      current_as_of(&log, date(2023, 2, 1)).map(|v| v.version),
      Some(2)
    );
  }

  #[test]
  fn initial_must_open_the_log() {
    let existing = vec![vintage(1, date(2023, 1, 1), ChangeType::Initial, None)];
    let input = NewVintage {
      subject:        subject(),
      value:          31.0,
      unit:           None,
      effective_date: date(2023, 2, 1),
      change_type:    ChangeType::Initial,
      supersedes:     None,
      pack_id:        Uuid::new_v4(),
    };
    assert!(matches!(
      check_append(&existing, &input),
      Err(Error::VintageSequence(_))
    ));
    assert!(check_append(&[], &input).is_ok());
  }

  #[test]
  fn corrections_must_supersede_the_latest_row() {
    let first = vintage(1, date(2023, 1, 1), ChangeType::Initial, None);
    let second = vintage(
      2,
      date(2023, 6, 1),
      ChangeType::Revision,
      Some(first.vintage_id),
    );
    let log = vec![first.clone(), second.clone()];

    let mut input = NewVintage {
      subject:        subject(),
      value:          33.0,
      unit:           None,
      effective_date: date(2023, 7, 1),
      change_type:    ChangeType::Correction,
      supersedes:     Some(second.vintage_id),
      pack_id:        Uuid::new_v4(),
    };
    assert!(check_append(&log, &input).is_ok());

    // Pointing at a stale vintage is rejected.
    input.supersedes = Some(first.vintage_id);
    assert!(matches!(
      check_append(&log, &input),
      Err(Error::VintageSequence(_))
    ));

    // So is omitting the back-reference entirely.
    input.supersedes = None;
    assert!(matches!(
      check_append(&log, &input),
      Err(Error::VintageSequence(_))
    ));
  }
}
