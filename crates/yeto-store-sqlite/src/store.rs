//! [`SqliteStore`] — the SQLite implementation of [`EvidenceStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use yeto_core::{
  contradiction::{
    Contradiction, ContradictionStatus, NewContradiction, Transition,
  },
  evidence::{EvidencePack, SubjectRef},
  source::{NewSource, Source, SourceFilter},
  store::{ContradictionFilter, EvidenceStore},
  vintage::{self, ClaimVintage, NewVintage},
};

use crate::{
  Error, Result,
  encode::{
    RawContradiction, RawPack, RawSource, RawVintage, encode_cadence,
    encode_change_type, encode_date, encode_dt, encode_json, encode_regime,
    encode_severity, encode_status, encode_subject_type, encode_tier,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A YETO evidence store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a fully-built [`Contradiction`] row. Shared by
  /// `record_contradiction` and `reopen_contradiction`.
  async fn insert_contradiction(&self, c: &Contradiction) -> Result<()> {
    let id_str        = encode_uuid(c.contradiction_id);
    let indicator     = c.indicator_code.clone();
    let period_str    = encode_date(c.period);
    let regime_str    = encode_regime(c.regime).to_owned();
    let source_a      = c.source_a.clone();
    let value_a       = c.value_a;
    let source_b      = c.source_b.clone();
    let value_b       = c.value_b;
    let pct           = c.discrepancy_pct;
    let severity_str  = encode_severity(c.severity).to_owned();
    let reasons_str   = encode_json(&c.plausible_reasons)?;
    let status_str    = encode_status(c.status).to_owned();
    let res_value     = c.resolved_value;
    let res_source    = c.resolved_source.clone();
    let reopened_str  = c.reopened_from.map(encode_uuid);
    let detected_str  = encode_dt(c.detected_at);
    let resolved_str  = c.resolved_at.map(encode_dt);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contradictions (
             contradiction_id, indicator_code, period, regime,
             source_a, value_a, source_b, value_b,
             discrepancy_pct, severity, plausible_reasons, status,
             resolved_value, resolved_source, reopened_from,
             detected_at, resolved_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15, ?16, ?17)",
          rusqlite::params![
            id_str,
            indicator,
            period_str,
            regime_str,
            source_a,
            value_a,
            source_b,
            value_b,
            pct,
            severity_str,
            reasons_str,
            status_str,
            res_value,
            res_source,
            reopened_str,
            detected_str,
            resolved_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── EvidenceStore impl ──────────────────────────────────────────────────────

impl EvidenceStore for SqliteStore {
  type Error = Error;

  // ── Source registry ───────────────────────────────────────────────────────

  async fn register_source(&self, input: NewSource) -> Result<Source> {
    let id       = input.source_id.clone();
    let name_en  = input.name.en.clone();
    let name_ar  = input.name.ar.clone();
    let tier_str = encode_tier(input.tier).to_owned();
    let license  = input.license.clone();
    let url      = input.url.clone();
    let active   = input.active;
    let now_str  = encode_dt(Utc::now());

    // Upsert keeps the original created_at; re-import only refreshes the
    // mutable attributes. The stored row is read back so the caller sees
    // exactly what the registry holds.
    let raw: RawSource = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sources (
             source_id, name_en, name_ar, tier, license, url, active, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
           ON CONFLICT(source_id) DO UPDATE SET
             name_en = excluded.name_en,
             name_ar = excluded.name_ar,
             tier    = excluded.tier,
             license = excluded.license,
             url     = excluded.url,
             active  = excluded.active",
          rusqlite::params![
            id, name_en, name_ar, tier_str, license, url, active, now_str
          ],
        )?;

        let raw = conn.query_row(
          "SELECT source_id, name_en, name_ar, tier, license, url, active, created_at
           FROM sources WHERE source_id = ?1",
          rusqlite::params![id],
          |row| {
            Ok(RawSource {
              source_id:  row.get(0)?,
              name_en:    row.get(1)?,
              name_ar:    row.get(2)?,
              tier:       row.get(3)?,
              license:    row.get(4)?,
              url:        row.get(5)?,
              active:     row.get(6)?,
              created_at: row.get(7)?,
            })
          },
        )?;
        Ok(raw)
      })
      .await?;

    raw.into_source()
  }

  async fn get_source(&self, id: &str) -> Result<Option<Source>> {
    let id_owned = id.to_owned();

    let raw: Option<RawSource> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT source_id, name_en, name_ar, tier, license, url, active, created_at
               FROM sources WHERE source_id = ?1",
              rusqlite::params![id_owned],
              |row| {
                Ok(RawSource {
                  source_id:  row.get(0)?,
                  name_en:    row.get(1)?,
                  name_ar:    row.get(2)?,
                  tier:       row.get(3)?,
                  license:    row.get(4)?,
                  url:        row.get(5)?,
                  active:     row.get(6)?,
                  created_at: row.get(7)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSource::into_source).transpose()
  }

  async fn list_sources(&self, filter: SourceFilter) -> Result<Vec<Source>> {
    let tier_str = filter.tier.map(|t| encode_tier(t).to_owned());
    let active   = filter.active;

    let raws: Vec<RawSource> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT source_id, name_en, name_ar, tier, license, url, active, created_at
           FROM sources
           WHERE (?1 IS NULL OR tier = ?1)
             AND (?2 IS NULL OR active = ?2)
           ORDER BY source_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![tier_str, active], |row| {
            Ok(RawSource {
              source_id:  row.get(0)?,
              name_en:    row.get(1)?,
              name_ar:    row.get(2)?,
              tier:       row.get(3)?,
              license:    row.get(4)?,
              url:        row.get(5)?,
              active:     row.get(6)?,
              created_at: row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSource::into_source).collect()
  }

  // ── Evidence packs — append-only versions ─────────────────────────────────

  async fn put_pack(&self, pack: EvidencePack) -> Result<EvidencePack> {
    let mut stored = pack;

    let pack_id_str    = encode_uuid(stored.pack_id);
    let st_str         = encode_subject_type(stored.subject.subject_type).to_owned();
    let sid            = stored.subject.subject_id.clone();
    let citations_str  = encode_json(&stored.citations)?;
    let transforms_str = encode_json(&stored.transforms)?;
    let regimes_str    = encode_json(&stored.regime_tags)?;
    let geo_scope      = stored.geo_scope.clone();
    let cov_start_str  = encode_date(stored.time_coverage.start);
    let cov_end_str    = encode_date(stored.time_coverage.end);
    let cadence_str    = encode_cadence(stored.cadence).to_owned();
    let missing_str    = encode_json(&stored.missing_ranges)?;
    let refs_str       = encode_json(&stored.contradiction_refs)?;
    let dqaf_str       = encode_json(&stored.dqaf)?;
    let uncertainty_str = stored
      .uncertainty
      .as_ref()
      .map(encode_json)
      .transpose()?;
    let note           = stored.uncertainty_note.clone();
    let confidence_str = encode_json(&stored.confidence)?;
    let created_str    = encode_dt(stored.created_at);

    // Version assignment and insert run in one transaction; the UNIQUE
    // constraint on (subject_type, subject_id, version) backstops races.
    let version: i64 = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let next: i64 = tx.query_row(
          "SELECT COALESCE(MAX(version), 0) + 1
           FROM evidence_packs
           WHERE subject_type = ?1 AND subject_id = ?2",
          rusqlite::params![st_str, sid],
          |row| row.get(0),
        )?;

        tx.execute(
          "INSERT INTO evidence_packs (
             pack_id, subject_type, subject_id, version,
             citations, transforms, regime_tags, geo_scope,
             coverage_start, coverage_end, cadence,
             missing_ranges, contradiction_refs, dqaf,
             uncertainty, uncertainty_note, confidence, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15, ?16, ?17, ?18)",
          rusqlite::params![
            pack_id_str,
            st_str,
            sid,
            next,
            citations_str,
            transforms_str,
            regimes_str,
            geo_scope,
            cov_start_str,
            cov_end_str,
            cadence_str,
            missing_str,
            refs_str,
            dqaf_str,
            uncertainty_str,
            note,
            confidence_str,
            created_str,
          ],
        )?;

        tx.commit()?;
        Ok(next)
      })
      .await?;

    stored.version = version as u32;
    Ok(stored)
  }

  async fn get_pack(
    &self,
    subject: &SubjectRef,
    version: Option<u32>,
  ) -> Result<Option<EvidencePack>> {
    let st_str  = encode_subject_type(subject.subject_type).to_owned();
    let sid     = subject.subject_id.clone();
    let version = version.map(|v| v as i64);

    let raw: Option<RawPack> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT pack_id, subject_type, subject_id, version,
                      citations, transforms, regime_tags, geo_scope,
                      coverage_start, coverage_end, cadence,
                      missing_ranges, contradiction_refs, dqaf,
                      uncertainty, uncertainty_note, confidence, created_at
               FROM evidence_packs
               WHERE subject_type = ?1 AND subject_id = ?2
                 AND (?3 IS NULL OR version = ?3)
               ORDER BY version DESC
               LIMIT 1",
              rusqlite::params![st_str, sid, version],
              |row| {
                Ok(RawPack {
                  pack_id:            row.get(0)?,
                  subject_type:       row.get(1)?,
                  subject_id:         row.get(2)?,
                  version:            row.get(3)?,
                  citations:          row.get(4)?,
                  transforms:         row.get(5)?,
                  regime_tags:        row.get(6)?,
                  geo_scope:          row.get(7)?,
                  coverage_start:     row.get(8)?,
                  coverage_end:       row.get(9)?,
                  cadence:            row.get(10)?,
                  missing_ranges:     row.get(11)?,
                  contradiction_refs: row.get(12)?,
                  dqaf:               row.get(13)?,
                  uncertainty:        row.get(14)?,
                  uncertainty_note:   row.get(15)?,
                  confidence:         row.get(16)?,
                  created_at:         row.get(17)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPack::into_pack).transpose()
  }

  async fn list_pack_versions(&self, subject: &SubjectRef) -> Result<Vec<u32>> {
    let st_str = encode_subject_type(subject.subject_type).to_owned();
    let sid    = subject.subject_id.clone();

    let versions: Vec<i64> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT version FROM evidence_packs
           WHERE subject_type = ?1 AND subject_id = ?2
           ORDER BY version ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![st_str, sid], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(versions.into_iter().map(|v| v as u32).collect())
  }

  // ── Claim vintages — append-only log ──────────────────────────────────────

  async fn append_vintage(&self, input: NewVintage) -> Result<ClaimVintage> {
    let history = self.vintage_history(&input.subject).await?;
    vintage::check_append(&history, &input)?;

    // The referenced evidence-pack version must exist.
    let pack_id_str = encode_uuid(input.pack_id);
    let pack_exists: bool = self
      .conn
      .call({
        let pack_id_str = pack_id_str.clone();
        move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT 1 FROM evidence_packs WHERE pack_id = ?1",
                rusqlite::params![pack_id_str],
                |_| Ok(true),
              )
              .optional()?
              .unwrap_or(false),
          )
        }
      })
      .await?;
    if !pack_exists {
      return Err(Error::Core(yeto_core::Error::PackNotFound(pack_id_str)));
    }

    let vintage = ClaimVintage {
      vintage_id:     Uuid::new_v4(),
      subject:        input.subject,
      version:        history.iter().map(|v| v.version).max().unwrap_or(0) + 1,
      value:          input.value,
      unit:           input.unit,
      effective_date: input.effective_date,
      change_type:    input.change_type,
      supersedes:     input.supersedes,
      pack_id:        input.pack_id,
      recorded_at:    Utc::now(),
    };

    let vid_str        = encode_uuid(vintage.vintage_id);
    let st_str         = encode_subject_type(vintage.subject.subject_type).to_owned();
    let sid            = vintage.subject.subject_id.clone();
    let version        = vintage.version as i64;
    let value          = vintage.value;
    let unit           = vintage.unit.clone();
    let effective_str  = encode_date(vintage.effective_date);
    let change_str     = encode_change_type(vintage.change_type).to_owned();
    let supersedes_str = vintage.supersedes.map(encode_uuid);
    let recorded_str   = encode_dt(vintage.recorded_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO claim_vintages (
             vintage_id, subject_type, subject_id, version, value, unit,
             effective_date, change_type, supersedes, pack_id, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            vid_str,
            st_str,
            sid,
            version,
            value,
            unit,
            effective_str,
            change_str,
            supersedes_str,
            pack_id_str,
            recorded_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(vintage)
  }

  async fn vintage_history(&self, subject: &SubjectRef) -> Result<Vec<ClaimVintage>> {
    let st_str = encode_subject_type(subject.subject_type).to_owned();
    let sid    = subject.subject_id.clone();

    let raws: Vec<RawVintage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT vintage_id, subject_type, subject_id, version, value, unit,
                  effective_date, change_type, supersedes, pack_id, recorded_at
           FROM claim_vintages
           WHERE subject_type = ?1 AND subject_id = ?2
           ORDER BY version ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![st_str, sid], |row| {
            Ok(RawVintage {
              vintage_id:     row.get(0)?,
              subject_type:   row.get(1)?,
              subject_id:     row.get(2)?,
              version:        row.get(3)?,
              value:          row.get(4)?,
              unit:           row.get(5)?,
              effective_date: row.get(6)?,
              change_type:    row.get(7)?,
              supersedes:     row.get(8)?,
              pack_id:        row.get(9)?,
              recorded_at:    row.get(10)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVintage::into_vintage).collect()
  }

  async fn current_vintage(
    &self,
    subject: &SubjectRef,
    as_of:   NaiveDate,
  ) -> Result<Option<ClaimVintage>> {
    // Selection reuses the core as-of rule so SQL and library semantics
    // cannot drift apart; a subject's log is small.
    let history = self.vintage_history(subject).await?;
    Ok(vintage::current_as_of(&history, as_of).cloned())
  }

  // ── Contradiction registry ────────────────────────────────────────────────

  async fn record_contradiction(
    &self,
    input: NewContradiction,
  ) -> Result<Contradiction> {
    let contradiction = Contradiction {
      contradiction_id:  Uuid::new_v4(),
      indicator_code:    input.indicator_code,
      period:            input.period,
      regime:            input.regime,
      source_a:          input.source_a,
      value_a:           input.value_a,
      source_b:          input.source_b,
      value_b:           input.value_b,
      discrepancy_pct:   input.discrepancy_pct,
      severity:          input.severity,
      plausible_reasons: input.plausible_reasons,
      status:            ContradictionStatus::Detected,
      resolved_value:    None,
      resolved_source:   None,
      reopened_from:     input.reopened_from,
      detected_at:       Utc::now(),
      resolved_at:       None,
    };

    self.insert_contradiction(&contradiction).await?;
    Ok(contradiction)
  }

  async fn get_contradiction(&self, id: Uuid) -> Result<Option<Contradiction>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawContradiction> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT contradiction_id, indicator_code, period, regime,
                      source_a, value_a, source_b, value_b,
                      discrepancy_pct, severity, plausible_reasons, status,
                      resolved_value, resolved_source, reopened_from,
                      detected_at, resolved_at
               FROM contradictions WHERE contradiction_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawContradiction {
                  contradiction_id:  row.get(0)?,
                  indicator_code:    row.get(1)?,
                  period:            row.get(2)?,
                  regime:            row.get(3)?,
                  source_a:          row.get(4)?,
                  value_a:           row.get(5)?,
                  source_b:          row.get(6)?,
                  value_b:           row.get(7)?,
                  discrepancy_pct:   row.get(8)?,
                  severity:          row.get(9)?,
                  plausible_reasons: row.get(10)?,
                  status:            row.get(11)?,
                  resolved_value:    row.get(12)?,
                  resolved_source:   row.get(13)?,
                  reopened_from:     row.get(14)?,
                  detected_at:       row.get(15)?,
                  resolved_at:       row.get(16)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContradiction::into_contradiction).transpose()
  }

  async fn list_contradictions(
    &self,
    filter: &ContradictionFilter,
  ) -> Result<Vec<Contradiction>> {
    let indicator  = filter.indicator_code.clone();
    let status_str = filter.status.map(|s| encode_status(s).to_owned());
    let limit      = filter.limit.map(|l| l as i64).unwrap_or(-1);
    let offset     = filter.offset.unwrap_or(0) as i64;

    let raws: Vec<RawContradiction> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT contradiction_id, indicator_code, period, regime,
                  source_a, value_a, source_b, value_b,
                  discrepancy_pct, severity, plausible_reasons, status,
                  resolved_value, resolved_source, reopened_from,
                  detected_at, resolved_at
           FROM contradictions
           WHERE (?1 IS NULL OR indicator_code = ?1)
             AND (?2 IS NULL OR status = ?2)
           ORDER BY detected_at ASC
           LIMIT ?3 OFFSET ?4",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![indicator, status_str, limit, offset],
            |row| {
              Ok(RawContradiction {
                contradiction_id:  row.get(0)?,
                indicator_code:    row.get(1)?,
                period:            row.get(2)?,
                regime:            row.get(3)?,
                source_a:          row.get(4)?,
                value_a:           row.get(5)?,
                source_b:          row.get(6)?,
                value_b:           row.get(7)?,
                discrepancy_pct:   row.get(8)?,
                severity:          row.get(9)?,
                plausible_reasons: row.get(10)?,
                status:            row.get(11)?,
                resolved_value:    row.get(12)?,
                resolved_source:   row.get(13)?,
                reopened_from:     row.get(14)?,
                detected_at:       row.get(15)?,
                resolved_at:       row.get(16)?,
              })
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawContradiction::into_contradiction)
      .collect()
  }

  async fn transition_contradiction(
    &self,
    id:         Uuid,
    transition: Transition,
  ) -> Result<Contradiction> {
    transition.validate()?;

    let id_str   = encode_uuid(id);
    let now_str  = encode_dt(Utc::now());
    let expected = encode_status(transition.expected_from()).to_owned();

    // Compare-and-set: the row is only updated while its status still
    // equals the transition's single legal predecessor.
    let affected: usize = match &transition {
      Transition::Investigating => {
        let id_str = id_str.clone();
        self
          .conn
          .call(move |conn| {
            Ok(conn.execute(
              "UPDATE contradictions SET status = 'investigating'
               WHERE contradiction_id = ?1 AND status = ?2",
              rusqlite::params![id_str, expected],
            )?)
          })
          .await?
      }
      Transition::Explained { plausible_reasons } => {
        let reasons_str = encode_json(plausible_reasons)?;
        let id_str = id_str.clone();
        self
          .conn
          .call(move |conn| {
            Ok(conn.execute(
              "UPDATE contradictions
               SET status = 'explained', plausible_reasons = ?3,
                   resolved_at = ?4
               WHERE contradiction_id = ?1 AND status = ?2",
              rusqlite::params![id_str, expected, reasons_str, now_str],
            )?)
          })
          .await?
      }
      Transition::Resolved { resolved_value, resolved_source } => {
        let value  = *resolved_value;
        let source = resolved_source.clone();
        let id_str = id_str.clone();
        self
          .conn
          .call(move |conn| {
            Ok(conn.execute(
              "UPDATE contradictions
               SET status = 'resolved', resolved_value = ?3,
                   resolved_source = ?4, resolved_at = ?5
               WHERE contradiction_id = ?1 AND status = ?2",
              rusqlite::params![id_str, expected, value, source, now_str],
            )?)
          })
          .await?
      }
    };

    if affected == 0 {
      // Distinguish a missing row from a lost compare-and-set.
      return match self.get_contradiction(id).await? {
        None => Err(Error::Core(yeto_core::Error::ContradictionNotFound(id))),
        Some(current) => {
          Err(Error::Core(yeto_core::Error::InvalidTransition {
            from: current.status,
            to:   transition.target(),
          }))
        }
      };
    }

    self
      .get_contradiction(id)
      .await?
      .ok_or(Error::Core(yeto_core::Error::ContradictionNotFound(id)))
  }

  async fn reopen_contradiction(&self, id: Uuid) -> Result<Contradiction> {
    let old = self
      .get_contradiction(id)
      .await?
      .ok_or(Error::Core(yeto_core::Error::ContradictionNotFound(id)))?;

    if old.status.is_unresolved() {
      return Err(Error::Core(yeto_core::Error::InvalidTransition {
        from: old.status,
        to:   ContradictionStatus::Detected,
      }));
    }

    let reopened = Contradiction {
      contradiction_id: Uuid::new_v4(),
      status:           ContradictionStatus::Detected,
      resolved_value:   None,
      resolved_source:  None,
      reopened_from:    Some(id),
      detected_at:      Utc::now(),
      resolved_at:      None,
      ..old
    };

    self.insert_contradiction(&reopened).await?;
    Ok(reopened)
  }
}
