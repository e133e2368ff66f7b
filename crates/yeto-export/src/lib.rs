//! Export-bundle serialization for evidence packs.
//!
//! When the export subsystem produces a data bundle it pulls two
//! documents per exported row: `evidence_pack.json` (the serialized
//! pack) and `license_summary.json` (license/attribution text aggregated
//! from the pack's citations). Both shapes are produced here, together
//! with a SHA-256 checksum of the serialized pack for bundle integrity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use yeto_core::{
  evidence::{EvidencePack, SubjectRef},
  source::Source,
  text::LocalizedText,
};

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
  /// A cited source is missing from the registry slice. Export refuses
  /// to emit a partial attribution summary.
  #[error("core error: {0}")]
  Core(#[from] yeto_core::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Document shapes ─────────────────────────────────────────────────────────

/// One source's aggregated attribution line in `license_summary.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseEntry {
  pub source_id:      String,
  pub name:           LocalizedText,
  pub license:        String,
  pub url:            Option<String>,
  pub citation_count: usize,
}

/// The `license_summary.json` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseSummary {
  pub subject:      SubjectRef,
  pub pack_version: u32,
  pub entries:      Vec<LicenseEntry>,
  /// Generated attribution text, ready for display in either language.
  pub attribution:  LocalizedText,
  pub generated_at: DateTime<Utc>,
}

/// Everything the export subsystem needs for one exported row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportBundle {
  /// The `evidence_pack.json` document.
  pub evidence_pack:   serde_json::Value,
  /// The `license_summary.json` document.
  pub license_summary: LicenseSummary,
  /// SHA-256 hex digest of the serialized pack.
  pub checksum:        String,
}

// ─── Export ──────────────────────────────────────────────────────────────────

/// Serialize `pack` for export.
///
/// `sources` must cover every cited source id; an unknown reference
/// fails with [`yeto_core::Error::UnknownSource`] rather than emitting a
/// summary with holes in its attribution.
pub fn export_pack(pack: &EvidencePack, sources: &[Source]) -> Result<ExportBundle> {
  let mut entries: Vec<LicenseEntry> = Vec::new();
  for citation in &pack.citations {
    let source = sources
      .iter()
      .find(|s| s.source_id == citation.source_id)
      .ok_or_else(|| {
        yeto_core::Error::UnknownSource(citation.source_id.clone())
      })?;

    match entries.iter_mut().find(|e| e.source_id == source.source_id) {
      Some(entry) => entry.citation_count += 1,
      None => entries.push(LicenseEntry {
        source_id:      source.source_id.clone(),
        name:           source.name.clone(),
        license:        source.license.clone(),
        url:            source.url.clone(),
        citation_count: 1,
      }),
    }
  }

  let attribution = LocalizedText {
    en: entries
      .iter()
      .map(|e| format!("Data: {} ({})", e.name.en, e.license))
      .collect::<Vec<_>>()
      .join("; "),
    ar: entries
      .iter()
      .map(|e| format!("البيانات: {} ({})", e.name.ar, e.license))
      .collect::<Vec<_>>()
      .join("؛ "),
  };

  let serialized = serde_json::to_vec(pack)?;
  let checksum = hex::encode(Sha256::digest(&serialized));

  Ok(ExportBundle {
    evidence_pack:   serde_json::to_value(pack)?,
    license_summary: LicenseSummary {
      subject:      pack.subject.clone(),
      pack_version: pack.version,
      entries,
      attribution,
      generated_at: Utc::now(),
    },
    checksum,
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
