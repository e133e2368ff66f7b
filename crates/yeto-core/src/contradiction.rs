//! Contradiction registry — recorded disagreements between sources.
//!
//! Two observations of the same indicator/period/regime from different
//! sources contradict when their discrepancy clears a severity floor.
//! Records move forward through a fixed lifecycle and are never deleted;
//! the registry is an audit trail.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, evidence::RegimeTag};

// ─── Observations and discrepancy ────────────────────────────────────────────

/// One sourced observation of an indicator, fed in by the external
/// cross-source comparison job. This core does not schedule that job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
  pub indicator_code: String,
  pub period:         NaiveDate,
  pub regime:         RegimeTag,
  pub source_id:      String,
  pub value:          f64,
}

/// Discrepancy relative to the larger magnitude:
/// `|a - b| / max(|a|, |b|) * 100`. Symmetric in its arguments.
pub fn discrepancy_percent(a: f64, b: f64) -> f64 {
  let denom = a.abs().max(b.abs());
  if denom == 0.0 {
    return 0.0;
  }
  (a - b).abs() / denom * 100.0
}

// ─── Severity ────────────────────────────────────────────────────────────────

/// Severity tier of a discrepancy; a pure, total function of the
/// percentage given a set of thresholds.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Minor,
  Significant,
  Major,
  Critical,
}

/// Percentage floors for each severity tier.
///
/// The defaults are the most consistent reading of the published
/// methodology; deployments may override them via configuration rather
/// than editing code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityThresholds {
  pub minor:       f64,
  pub significant: f64,
  pub major:       f64,
  pub critical:    f64,
}

impl Default for SeverityThresholds {
  fn default() -> Self {
    Self { minor: 5.0, significant: 15.0, major: 30.0, critical: 50.0 }
  }
}

impl SeverityThresholds {
  /// `None` below the minor floor — normal measurement noise, not worth
  /// a registry row.
  pub fn classify(&self, pct: f64) -> Option<Severity> {
    if pct >= self.critical {
      Some(Severity::Critical)
    } else if pct >= self.major {
      Some(Severity::Major)
    } else if pct >= self.significant {
      Some(Severity::Significant)
    } else if pct >= self.minor {
      Some(Severity::Minor)
    } else {
      None
    }
  }
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

/// Lifecycle status. Transitions only move forward; reopening a closed
/// record means creating a new row that references the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContradictionStatus {
  Detected,
  Investigating,
  Explained,
  Resolved,
}

impl ContradictionStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Detected => "detected",
      Self::Investigating => "investigating",
      Self::Explained => "explained",
      Self::Resolved => "resolved",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "detected" => Some(Self::Detected),
      "investigating" => Some(Self::Investigating),
      "explained" => Some(Self::Explained),
      "resolved" => Some(Self::Resolved),
      _ => None,
    }
  }

  /// Unresolved statuses lower the confidence grade of packs that
  /// reference them.
  pub fn is_unresolved(&self) -> bool {
    matches!(self, Self::Detected | Self::Investigating)
  }
}

impl fmt::Display for ContradictionStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Check `from → to` legality per the forward-only lifecycle:
/// `detected → investigating → (explained | resolved)`.
pub fn check_transition(
  from: ContradictionStatus,
  to:   ContradictionStatus,
) -> Result<()> {
  let legal = matches!(
    (from, to),
    (ContradictionStatus::Detected, ContradictionStatus::Investigating)
      | (ContradictionStatus::Investigating, ContradictionStatus::Explained)
      | (ContradictionStatus::Investigating, ContradictionStatus::Resolved)
  );
  if legal { Ok(()) } else { Err(Error::InvalidTransition { from, to }) }
}

/// A requested status change, with the payload the target status
/// requires. `Resolved` carries the settled value and source; `Explained`
/// keeps both values published and carries the reasons why they diverge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "to", rename_all = "lowercase")]
pub enum Transition {
  Investigating,
  Explained { plausible_reasons: Vec<String> },
  Resolved { resolved_value: f64, resolved_source: String },
}

impl Transition {
  pub fn target(&self) -> ContradictionStatus {
    match self {
      Self::Investigating => ContradictionStatus::Investigating,
      Self::Explained { .. } => ContradictionStatus::Explained,
      Self::Resolved { .. } => ContradictionStatus::Resolved,
    }
  }

  /// Each target has exactly one legal predecessor, which is what the
  /// store's compare-and-set update expects to find.
  pub fn expected_from(&self) -> ContradictionStatus {
    match self {
      Self::Investigating => ContradictionStatus::Detected,
      Self::Explained { .. } | Self::Resolved { .. } => {
        ContradictionStatus::Investigating
      }
    }
  }

  /// Payload validation, independent of the current status.
  pub fn validate(&self) -> Result<()> {
    match self {
      Self::Explained { plausible_reasons } if plausible_reasons.is_empty() => {
        Err(Error::ExplanationRequiresReasons)
      }
      _ => Ok(()),
    }
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A detected disagreement between two observations of the same
/// indicator/period/regime. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contradiction {
  pub contradiction_id:  Uuid,
  pub indicator_code:    String,
  pub period:            NaiveDate,
  pub regime:            RegimeTag,
  pub source_a:          String,
  pub value_a:           f64,
  pub source_b:          String,
  pub value_b:           f64,
  pub discrepancy_pct:   f64,
  pub severity:          Severity,
  pub plausible_reasons: Vec<String>,
  pub status:            ContradictionStatus,
  pub resolved_value:    Option<f64>,
  pub resolved_source:   Option<String>,
  /// Set when this row reopens a previously closed contradiction.
  pub reopened_from:     Option<Uuid>,
  pub detected_at:       DateTime<Utc>,
  pub resolved_at:       Option<DateTime<Utc>>,
}

/// Pre-persistence output of [`detect`]. `detected_at` and the id are
/// assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContradiction {
  pub indicator_code:    String,
  pub period:            NaiveDate,
  pub regime:            RegimeTag,
  pub source_a:          String,
  pub value_a:           f64,
  pub source_b:          String,
  pub value_b:           f64,
  pub discrepancy_pct:   f64,
  pub severity:          Severity,
  #[serde(default)]
  pub plausible_reasons: Vec<String>,
  #[serde(default)]
  pub reopened_from:     Option<Uuid>,
}

/// Compare two observations. `None` when they do not contradict:
/// different indicator, period, or regime; the same source; or a
/// discrepancy below the minor floor.
pub fn detect(
  a:          &Observation,
  b:          &Observation,
  thresholds: &SeverityThresholds,
) -> Option<NewContradiction> {
  if a.indicator_code != b.indicator_code
    || a.period != b.period
    || a.regime != b.regime
  {
    return None;
  }
  if a.source_id == b.source_id {
    return None;
  }

  let pct = discrepancy_percent(a.value, b.value);
  let severity = thresholds.classify(pct)?;

  Some(NewContradiction {
    indicator_code:    a.indicator_code.clone(),
    period:            a.period,
    regime:            a.regime,
    source_a:          a.source_id.clone(),
    value_a:           a.value,
    source_b:          b.source_id.clone(),
    value_b:           b.value,
    discrepancy_pct:   pct,
    severity,
    plausible_reasons: Vec::new(),
    reopened_from:     None,
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn obs(source: &str, value: f64) -> Observation {
    Observation {
      indicator_code: "fx.usd.sell".to_string(),
      period:         NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
      regime:         RegimeTag::Aden,
      source_id:      source.to_string(),
      value,
    }
  }

  // ── Discrepancy ────────────────────────────────────────────────────────

  #[test]
  fn discrepancy_is_symmetric() {
    for (a, b) in [(100.0, 150.0), (3.5, 2.0), (-10.0, 7.0), (0.01, 5000.0)] {
      assert_eq!(discrepancy_percent(a, b), discrepancy_percent(b, a));
    }
  }

  #[test]
  fn discrepancy_relative_to_larger_magnitude() {
    // |100-150| / 150 * 100 = 33.33…
    let pct = discrepancy_percent(100.0, 150.0);
    assert!((pct - 33.333333333333336).abs() < 1e-9);
  }

  #[test]
  fn discrepancy_of_equal_zeros_is_zero() {
    assert_eq!(discrepancy_percent(0.0, 0.0), 0.0);
  }

  // ── Severity classification ────────────────────────────────────────────

  #[test]
  fn severity_tiers_cover_the_documented_floors() {
    let t = SeverityThresholds::default();
    assert_eq!(t.classify(3.85), None);
    assert_eq!(t.classify(5.0), Some(Severity::Minor));
    assert_eq!(t.classify(14.9), Some(Severity::Minor));
    assert_eq!(t.classify(15.0), Some(Severity::Significant));
    assert_eq!(t.classify(33.33), Some(Severity::Major));
    assert_eq!(t.classify(50.0), Some(Severity::Critical));
    assert_eq!(t.classify(400.0), Some(Severity::Critical));
  }

  #[test]
  fn custom_thresholds_shift_the_floors() {
    let t = SeverityThresholds {
      minor:       1.0,
      significant: 2.0,
      major:       3.0,
      critical:    4.0,
    };
    assert_eq!(t.classify(0.5), None);
    assert_eq!(t.classify(2.5), Some(Severity::Significant));
    assert_eq!(t.classify(10.0), Some(Severity::Critical));
  }

  // ── Detection ──────────────────────────────────────────────────────────

  #[test]
  fn hundred_vs_one_fifty_is_a_major_contradiction() {
    let found = detect(
      &obs("cby-aden", 100.0),
      &obs("exchange-telegram", 150.0),
      &SeverityThresholds::default(),
    )
    .unwrap();
    assert_eq!(found.severity, Severity::Major);
    assert!((found.discrepancy_pct - 100.0 / 3.0).abs() < 1e-9);
  }

  #[test]
  fn small_divergence_is_measurement_noise() {
    // |100-104| / 104 * 100 = 3.85% — below the minor floor.
    let found = detect(
      &obs("cby-aden", 100.0),
      &obs("exchange-telegram", 104.0),
      &SeverityThresholds::default(),
    );
    assert!(found.is_none());
  }

  #[test]
  fn same_source_never_contradicts_itself() {
    let found = detect(
      &obs("cby-aden", 100.0),
      &obs("cby-aden", 200.0),
      &SeverityThresholds::default(),
    );
    assert!(found.is_none());
  }

  #[test]
  fn different_regimes_are_not_comparable() {
    let mut b = obs("exchange-telegram", 200.0);
    b.regime = RegimeTag::Sanaa;
    let found =
      detect(&obs("cby-aden", 100.0), &b, &SeverityThresholds::default());
    assert!(found.is_none());
  }

  // ── Lifecycle ──────────────────────────────────────────────────────────

  #[test]
  fn only_forward_transitions_are_legal() {
    use ContradictionStatus::*;
    let all = [Detected, Investigating, Explained, Resolved];
    for from in all {
      for to in all {
        let legal = matches!(
          (from, to),
          (Detected, Investigating)
            | (Investigating, Explained)
            | (Investigating, Resolved)
        );
        assert_eq!(check_transition(from, to).is_ok(), legal, "{from} -> {to}");
      }
    }
  }

  #[test]
  fn explained_requires_a_reason() {
    let t = Transition::Explained { plausible_reasons: vec![] };
    assert!(matches!(
      t.validate(),
      Err(Error::ExplanationRequiresReasons)
    ));

    let t = Transition::Explained {
      plausible_reasons: vec!["parallel market premium".to_string()],
    };
    assert!(t.validate().is_ok());
  }
}
