//! Source registry types — the canonical list of data publishers.
//!
//! Sources are created by registry seeding or admin import, rarely
//! mutated, and never deleted: historical citations keep referencing
//! them. The `active` flag only gates new citations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text::LocalizedText;

/// Reliability tier of a publishing organisation. The derived ordering
/// puts `T0` first, so the minimum over a set of tiers is the best one.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SourceTier {
  /// Official statistics / central bank.
  T0,
  /// International organisation.
  T1,
  /// Academic / research.
  T2,
  /// Media.
  T3,
  /// Unverified.
  T4,
}

/// A publishing organisation or dataset provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
  pub source_id:  String,
  pub name:       LocalizedText,
  pub tier:       SourceTier,
  pub license:    String,
  pub url:        Option<String>,
  pub active:     bool,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::EvidenceStore::register_source`].
/// `created_at` is always set by the store; registering an id twice
/// replaces the registry entry (sources are never deleted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSource {
  pub source_id: String,
  pub name:      LocalizedText,
  pub tier:      SourceTier,
  pub license:   String,
  pub url:       Option<String>,
  #[serde(default = "default_active")]
  pub active:    bool,
}

fn default_active() -> bool { true }

/// Filter for [`crate::store::EvidenceStore::list_sources`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceFilter {
  pub tier:   Option<SourceTier>,
  pub active: Option<bool>,
}
