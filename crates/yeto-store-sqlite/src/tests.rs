//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use uuid::Uuid;
use yeto_core::{
  contradiction::{
    ContradictionStatus, Observation, SeverityThresholds, Transition, detect,
  },
  evidence::{
    Citation, DqafAssessment, DqafStatus, EvidencePack, PackInput, RegimeTag,
    ReportingCadence, SubjectRef, SubjectType, TimeCoverage, build_pack,
  },
  source::{NewSource, Source, SourceFilter, SourceTier},
  store::{ContradictionFilter, EvidenceStore},
  text::LocalizedText,
  vintage::{ChangeType, NewVintage},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_source(id: &str, tier: SourceTier) -> NewSource {
  NewSource {
    source_id: id.to_string(),
    name:      LocalizedText::new(
      "Central Bank of Yemen (Aden)",
      "البنك المركزي اليمني (عدن)",
    ),
    tier,
    license:   "CC-BY-4.0".to_string(),
    url:       Some("https://cby-ye.com".to_string()),
    active:    true,
  }
}

fn citation(source_id: &str) -> Citation {
  Citation {
    source_id:         source_id.to_string(),
    title:             "Monthly monetary bulletin".to_string(),
    publisher:         "CBY Aden".to_string(),
    retrieved_at:      date(2024, 3, 4),
    license_confirmed: true,
    locator:           Some("table 12".to_string()),
    snapshot:          None,
  }
}

fn subject(id: &str) -> SubjectRef {
  SubjectRef {
    subject_type: SubjectType::Kpi,
    subject_id:   id.to_string(),
  }
}

fn pack_input(subject_id: &str, source_id: &str) -> PackInput {
  PackInput {
    subject:            subject(subject_id),
    citations:          vec![citation(source_id)],
    transforms:         vec![],
    regime_tags:        vec![RegimeTag::Aden],
    geo_scope:          Some("national".to_string()),
    time_coverage:      TimeCoverage {
      start: date(2023, 1, 1),
      end:   date(2023, 6, 30),
    },
    cadence:            ReportingCadence::Monthly,
    observed_periods:   (1..=6).map(|m| date(2023, m, 1)).collect(),
    contradiction_refs: vec![],
    dqaf:               DqafAssessment {
      integrity:      DqafStatus::Pass,
      methodology:    DqafStatus::Pass,
      accuracy:       DqafStatus::Pass,
      serviceability: DqafStatus::Pass,
      accessibility:  DqafStatus::Pass,
    },
    uncertainty:        None,
    uncertainty_note:   None,
  }
}

/// Register a source and persist a freshly-built pack for `subject_id`.
async fn seed_pack(s: &SqliteStore, subject_id: &str) -> (Source, EvidencePack) {
  let source = s
    .register_source(new_source("cby-aden", SourceTier::T0))
    .await
    .unwrap();
  let pack = build_pack(
    pack_input(subject_id, "cby-aden"),
    std::slice::from_ref(&source),
    &[],
  )
  .unwrap();
  let stored = s.put_pack(pack).await.unwrap();
  (source, stored)
}

fn obs(source: &str, value: f64) -> Observation {
  Observation {
    indicator_code: "fx.usd.sell".to_string(),
    period:         date(2024, 3, 1),
    regime:         RegimeTag::Aden,
    source_id:      source.to_string(),
    value,
  }
}

// ─── Sources ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_and_get_source() {
  let s = store().await;

  let created = s
    .register_source(new_source("cby-aden", SourceTier::T0))
    .await
    .unwrap();
  assert_eq!(created.tier, SourceTier::T0);

  let fetched = s.get_source("cby-aden").await.unwrap().unwrap();
  assert_eq!(fetched.source_id, "cby-aden");
  assert_eq!(fetched.name.ar, "البنك المركزي اليمني (عدن)");
  assert!(fetched.active);
}

#[tokio::test]
async fn get_source_missing_returns_none() {
  let s = store().await;
  assert!(s.get_source("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn reregister_replaces_attributes_but_keeps_created_at() {
  let s = store().await;

  let first = s
    .register_source(new_source("wfp", SourceTier::T2))
    .await
    .unwrap();

  let mut update = new_source("wfp", SourceTier::T1);
  update.active = false;
  let second = s.register_source(update).await.unwrap();

  assert_eq!(second.tier, SourceTier::T1);
  assert!(!second.active);
  assert_eq!(second.created_at, first.created_at);
}

#[tokio::test]
async fn list_sources_filters_by_tier_and_active() {
  let s = store().await;

  s.register_source(new_source("cby-aden", SourceTier::T0))
    .await
    .unwrap();
  s.register_source(new_source("world-bank", SourceTier::T1))
    .await
    .unwrap();
  let mut inactive = new_source("old-feed", SourceTier::T1);
  inactive.active = false;
  s.register_source(inactive).await.unwrap();

  let all = s.list_sources(SourceFilter::default()).await.unwrap();
  assert_eq!(all.len(), 3);

  let t1 = s
    .list_sources(SourceFilter { tier: Some(SourceTier::T1), active: None })
    .await
    .unwrap();
  assert_eq!(t1.len(), 2);

  let t1_active = s
    .list_sources(SourceFilter {
      tier:   Some(SourceTier::T1),
      active: Some(true),
    })
    .await
    .unwrap();
  assert_eq!(t1_active.len(), 1);
  assert_eq!(t1_active[0].source_id, "world-bank");
}

// ─── Evidence packs ──────────────────────────────────────────────────────────

#[tokio::test]
async fn put_pack_assigns_sequential_versions() {
  let s = store().await;
  let (source, first) = seed_pack(&s, "fx.usd.sell").await;
  assert_eq!(first.version, 1);

  let second = s
    .put_pack(
      build_pack(
        pack_input("fx.usd.sell", "cby-aden"),
        std::slice::from_ref(&source),
        &[],
      )
      .unwrap(),
    )
    .await
    .unwrap();
  assert_eq!(second.version, 2);

  let versions = s
    .list_pack_versions(&subject("fx.usd.sell"))
    .await
    .unwrap();
  assert_eq!(versions, vec![1, 2]);

  // Latest by default, any version on request.
  let latest = s
    .get_pack(&subject("fx.usd.sell"), None)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(latest.pack_id, second.pack_id);

  let old = s
    .get_pack(&subject("fx.usd.sell"), Some(1))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(old.pack_id, first.pack_id);
}

#[tokio::test]
async fn pack_roundtrip_preserves_structured_fields() {
  let s = store().await;
  let (_, stored) = seed_pack(&s, "cpi.yoy").await;

  let fetched = s
    .get_pack(&subject("cpi.yoy"), None)
    .await
    .unwrap()
    .unwrap();

  assert_eq!(fetched.citations.len(), 1);
  assert_eq!(fetched.citations[0].source_id, "cby-aden");
  assert_eq!(fetched.regime_tags, vec![RegimeTag::Aden]);
  assert_eq!(fetched.dqaf.integrity, DqafStatus::Pass);
  assert!(fetched.missing_ranges.is_empty());
  assert_eq!(fetched.confidence.grade, stored.confidence.grade);
  assert!(!fetched.confidence.explanation.ar.is_empty());
  assert_eq!(fetched.created_at, stored.created_at);
}

#[tokio::test]
async fn get_pack_missing_subject_returns_none() {
  let s = store().await;
  let found = s.get_pack(&subject("ghost"), None).await.unwrap();
  assert!(found.is_none());
}

// ─── Claim vintages ──────────────────────────────────────────────────────────

#[tokio::test]
async fn append_initial_then_revision() {
  let s = store().await;
  let (_, pack) = seed_pack(&s, "cpi.yoy").await;

  let first = s
    .append_vintage(NewVintage {
      subject:        subject("cpi.yoy"),
      value:          31.2,
      unit:           Some("percent".to_string()),
      effective_date: date(2023, 1, 1),
      change_type:    ChangeType::Initial,
      supersedes:     None,
      pack_id:        pack.pack_id,
    })
    .await
    .unwrap();
  assert_eq!(first.version, 1);

  let second = s
    .append_vintage(NewVintage {
      subject:        subject("cpi.yoy"),
      value:          29.8,
      unit:           Some("percent".to_string()),
      effective_date: date(2023, 6, 1),
      change_type:    ChangeType::Revision,
      supersedes:     Some(first.vintage_id),
      pack_id:        pack.pack_id,
    })
    .await
    .unwrap();
  assert_eq!(second.version, 2);
  assert_eq!(second.supersedes, Some(first.vintage_id));

  let history = s.vintage_history(&subject("cpi.yoy")).await.unwrap();
  assert_eq!(history.len(), 2);
  assert_eq!(history[0].version, 1);
  assert_eq!(history[1].change_type, ChangeType::Revision);
}

#[tokio::test]
async fn current_vintage_respects_as_of_date() {
  let s = store().await;
  let (_, pack) = seed_pack(&s, "cpi.yoy").await;

  let first = s
    .append_vintage(NewVintage {
      subject:        subject("cpi.yoy"),
      value:          31.2,
      unit:           None,
      effective_date: date(2023, 1, 1),
      change_type:    ChangeType::Initial,
      supersedes:     None,
      pack_id:        pack.pack_id,
    })
    .await
    .unwrap();
  s.append_vintage(NewVintage {
    subject:        subject("cpi.yoy"),
    value:          29.8,
    unit:           None,
    effective_date: date(2023, 6, 1),
    change_type:    ChangeType::Correction,
    supersedes:     Some(first.vintage_id),
    pack_id:        pack.pack_id,
  })
  .await
  .unwrap();

  let early = s
    .current_vintage(&subject("cpi.yoy"), date(2023, 3, 1))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(early.value, 31.2);

  let late = s
    .current_vintage(&subject("cpi.yoy"), date(2024, 1, 1))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(late.value, 29.8);

  let before_any = s
    .current_vintage(&subject("cpi.yoy"), date(2022, 1, 1))
    .await
    .unwrap();
  assert!(before_any.is_none());
}

#[tokio::test]
async fn second_initial_vintage_is_rejected() {
  let s = store().await;
  let (_, pack) = seed_pack(&s, "cpi.yoy").await;

  let input = NewVintage {
    subject:        subject("cpi.yoy"),
    value:          31.2,
    unit:           None,
    effective_date: date(2023, 1, 1),
    change_type:    ChangeType::Initial,
    supersedes:     None,
    pack_id:        pack.pack_id,
  };
  s.append_vintage(input.clone()).await.unwrap();

  let err = s.append_vintage(input).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(yeto_core::Error::VintageSequence(_))
  ));
}

#[tokio::test]
async fn vintage_requires_an_existing_pack() {
  let s = store().await;
  seed_pack(&s, "cpi.yoy").await;

  let err = s
    .append_vintage(NewVintage {
      subject:        subject("cpi.yoy"),
      value:          31.2,
      unit:           None,
      effective_date: date(2023, 1, 1),
      change_type:    ChangeType::Initial,
      supersedes:     None,
      pack_id:        Uuid::new_v4(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(yeto_core::Error::PackNotFound(_))));
}

// ─── Contradictions ──────────────────────────────────────────────────────────

#[tokio::test]
async fn record_and_get_contradiction() {
  let s = store().await;

  let found = detect(
    &obs("cby-aden", 100.0),
    &obs("exchange-telegram", 150.0),
    &SeverityThresholds::default(),
  )
  .unwrap();
  let recorded = s.record_contradiction(found).await.unwrap();

  assert_eq!(recorded.status, ContradictionStatus::Detected);
  assert!(recorded.resolved_at.is_none());

  let fetched = s
    .get_contradiction(recorded.contradiction_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.source_a, "cby-aden");
  assert_eq!(fetched.value_b, 150.0);
  assert_eq!(fetched.severity, recorded.severity);
}

#[tokio::test]
async fn list_contradictions_filters_by_indicator_and_status() {
  let s = store().await;

  let c1 = s
    .record_contradiction(
      detect(
        &obs("cby-aden", 100.0),
        &obs("exchange-telegram", 150.0),
        &SeverityThresholds::default(),
      )
      .unwrap(),
    )
    .await
    .unwrap();

  let mut other = obs("wfp", 500.0);
  other.indicator_code = "fuel.diesel.price".to_string();
  let mut other_b = obs("local-survey", 900.0);
  other_b.indicator_code = "fuel.diesel.price".to_string();
  s.record_contradiction(
    detect(&other, &other_b, &SeverityThresholds::default()).unwrap(),
  )
  .await
  .unwrap();

  s.transition_contradiction(c1.contradiction_id, Transition::Investigating)
    .await
    .unwrap();

  let fx = s
    .list_contradictions(&ContradictionFilter {
      indicator_code: Some("fx.usd.sell".to_string()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(fx.len(), 1);
  assert_eq!(fx[0].contradiction_id, c1.contradiction_id);

  let investigating = s
    .list_contradictions(&ContradictionFilter {
      status: Some(ContradictionStatus::Investigating),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(investigating.len(), 1);

  let all = s
    .list_contradictions(&ContradictionFilter::default())
    .await
    .unwrap();
  assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn lifecycle_detected_investigating_resolved() {
  let s = store().await;
  let recorded = s
    .record_contradiction(
      detect(
        &obs("cby-aden", 100.0),
        &obs("exchange-telegram", 150.0),
        &SeverityThresholds::default(),
      )
      .unwrap(),
    )
    .await
    .unwrap();

  let investigating = s
    .transition_contradiction(
      recorded.contradiction_id,
      Transition::Investigating,
    )
    .await
    .unwrap();
  assert_eq!(investigating.status, ContradictionStatus::Investigating);
  assert_eq!(investigating.detected_at, recorded.detected_at);
  assert!(investigating.resolved_at.is_none());

  let resolved = s
    .transition_contradiction(recorded.contradiction_id, Transition::Resolved {
      resolved_value:  102.0,
      resolved_source: "cby-aden".to_string(),
    })
    .await
    .unwrap();
  assert_eq!(resolved.status, ContradictionStatus::Resolved);
  assert_eq!(resolved.resolved_value, Some(102.0));
  assert_eq!(resolved.resolved_source.as_deref(), Some("cby-aden"));
  assert!(resolved.resolved_at.is_some());
  assert_eq!(resolved.detected_at, recorded.detected_at);
}

#[tokio::test]
async fn resolving_straight_from_detected_is_rejected() {
  let s = store().await;
  let recorded = s
    .record_contradiction(
      detect(
        &obs("cby-aden", 100.0),
        &obs("exchange-telegram", 150.0),
        &SeverityThresholds::default(),
      )
      .unwrap(),
    )
    .await
    .unwrap();

  let err = s
    .transition_contradiction(recorded.contradiction_id, Transition::Resolved {
      resolved_value:  102.0,
      resolved_source: "cby-aden".to_string(),
    })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(yeto_core::Error::InvalidTransition {
      from: ContradictionStatus::Detected,
      to:   ContradictionStatus::Resolved,
    })
  ));
}

#[tokio::test]
async fn explaining_requires_at_least_one_reason() {
  let s = store().await;
  let recorded = s
    .record_contradiction(
      detect(
        &obs("cby-aden", 100.0),
        &obs("exchange-telegram", 150.0),
        &SeverityThresholds::default(),
      )
      .unwrap(),
    )
    .await
    .unwrap();
  s.transition_contradiction(
    recorded.contradiction_id,
    Transition::Investigating,
  )
  .await
  .unwrap();

  let err = s
    .transition_contradiction(
      recorded.contradiction_id,
      Transition::Explained { plausible_reasons: vec![] },
    )
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(yeto_core::Error::ExplanationRequiresReasons)
  ));

  let explained = s
    .transition_contradiction(
      recorded.contradiction_id,
      Transition::Explained {
        plausible_reasons: vec![
          "parallel market premium in Aden".to_string(),
        ],
      },
    )
    .await
    .unwrap();
  assert_eq!(explained.status, ContradictionStatus::Explained);
  assert_eq!(explained.plausible_reasons.len(), 1);
  // Both values stay published: no resolved value is recorded.
  assert!(explained.resolved_value.is_none());
  assert!(explained.resolved_at.is_some());
}

#[tokio::test]
async fn compare_and_set_rejects_a_double_apply() {
  let s = store().await;
  let recorded = s
    .record_contradiction(
      detect(
        &obs("cby-aden", 100.0),
        &obs("exchange-telegram", 150.0),
        &SeverityThresholds::default(),
      )
      .unwrap(),
    )
    .await
    .unwrap();

  s.transition_contradiction(
    recorded.contradiction_id,
    Transition::Investigating,
  )
  .await
  .unwrap();

  // A second identical transition finds the precondition gone.
  let err = s
    .transition_contradiction(
      recorded.contradiction_id,
      Transition::Investigating,
    )
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(yeto_core::Error::InvalidTransition {
      from: ContradictionStatus::Investigating,
      to:   ContradictionStatus::Investigating,
    })
  ));
}

#[tokio::test]
async fn transition_on_missing_row_is_not_found() {
  let s = store().await;
  let err = s
    .transition_contradiction(Uuid::new_v4(), Transition::Investigating)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(yeto_core::Error::ContradictionNotFound(_))
  ));
}

#[tokio::test]
async fn reopening_a_resolved_contradiction_creates_a_new_row() {
  let s = store().await;
  let recorded = s
    .record_contradiction(
      detect(
        &obs("cby-aden", 100.0),
        &obs("exchange-telegram", 150.0),
        &SeverityThresholds::default(),
      )
      .unwrap(),
    )
    .await
    .unwrap();
  s.transition_contradiction(
    recorded.contradiction_id,
    Transition::Investigating,
  )
  .await
  .unwrap();
  s.transition_contradiction(recorded.contradiction_id, Transition::Resolved {
    resolved_value:  102.0,
    resolved_source: "cby-aden".to_string(),
  })
  .await
  .unwrap();

  let reopened = s
    .reopen_contradiction(recorded.contradiction_id)
    .await
    .unwrap();
  assert_ne!(reopened.contradiction_id, recorded.contradiction_id);
  assert_eq!(reopened.status, ContradictionStatus::Detected);
  assert_eq!(reopened.reopened_from, Some(recorded.contradiction_id));
  assert!(reopened.resolved_value.is_none());

  // The old row is untouched.
  let old = s
    .get_contradiction(recorded.contradiction_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(old.status, ContradictionStatus::Resolved);
}

#[tokio::test]
async fn reopening_an_open_contradiction_is_rejected() {
  let s = store().await;
  let recorded = s
    .record_contradiction(
      detect(
        &obs("cby-aden", 100.0),
        &obs("exchange-telegram", 150.0),
        &SeverityThresholds::default(),
      )
      .unwrap(),
    )
    .await
    .unwrap();

  let err = s
    .reopen_contradiction(recorded.contradiction_id)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(yeto_core::Error::InvalidTransition { .. })
  ));
}
