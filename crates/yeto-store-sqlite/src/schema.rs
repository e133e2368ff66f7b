//! SQL schema for the YETO SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Sources are never deleted; historical citations keep referencing them.
CREATE TABLE IF NOT EXISTS sources (
    source_id   TEXT PRIMARY KEY,
    name_en     TEXT NOT NULL,
    name_ar     TEXT NOT NULL,
    tier        TEXT NOT NULL,    -- 't0' | 't1' | 't2' | 't3' | 't4'
    license     TEXT NOT NULL,
    url         TEXT,
    active      INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL     -- ISO 8601 UTC; server-assigned
);

-- Evidence packs are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS evidence_packs (
    pack_id            TEXT PRIMARY KEY,
    subject_type       TEXT NOT NULL,   -- 'kpi' | 'dataset' | 'publication'
    subject_id         TEXT NOT NULL,
    version            INTEGER NOT NULL,
    citations          TEXT NOT NULL,   -- JSON array
    transforms         TEXT NOT NULL,   -- JSON array
    regime_tags        TEXT NOT NULL,   -- JSON array
    geo_scope          TEXT,
    coverage_start     TEXT NOT NULL,
    coverage_end       TEXT NOT NULL,
    cadence            TEXT NOT NULL,
    missing_ranges     TEXT NOT NULL,   -- JSON array; derived, never hand-entered
    contradiction_refs TEXT NOT NULL,   -- JSON array of UUIDs
    dqaf               TEXT NOT NULL,   -- JSON object, five independent statuses
    uncertainty        TEXT,            -- JSON object or NULL
    uncertainty_note   TEXT,
    confidence         TEXT NOT NULL,   -- JSON: grade + bilingual explanation
    created_at         TEXT NOT NULL,
    UNIQUE (subject_type, subject_id, version)
);

-- Claim vintages are strictly append-only.
CREATE TABLE IF NOT EXISTS claim_vintages (
    vintage_id     TEXT PRIMARY KEY,
    subject_type   TEXT NOT NULL,
    subject_id     TEXT NOT NULL,
    version        INTEGER NOT NULL,
    value          REAL NOT NULL,
    unit           TEXT,
    effective_date TEXT NOT NULL,
    change_type    TEXT NOT NULL,
    supersedes     TEXT REFERENCES claim_vintages(vintage_id),
    pack_id        TEXT NOT NULL REFERENCES evidence_packs(pack_id),
    recorded_at    TEXT NOT NULL,
    UNIQUE (subject_type, subject_id, version)
);

-- Contradictions are never deleted. Status only moves forward, applied
-- as a conditional UPDATE on the expected current status.
CREATE TABLE IF NOT EXISTS contradictions (
    contradiction_id  TEXT PRIMARY KEY,
    indicator_code    TEXT NOT NULL,
    period            TEXT NOT NULL,
    regime            TEXT NOT NULL,   -- 'aden' | 'sanaa' | 'mixed'
    source_a          TEXT NOT NULL,
    value_a           REAL NOT NULL,
    source_b          TEXT NOT NULL,
    value_b           REAL NOT NULL,
    discrepancy_pct   REAL NOT NULL,
    severity          TEXT NOT NULL,
    plausible_reasons TEXT NOT NULL DEFAULT '[]',
    status            TEXT NOT NULL DEFAULT 'detected',
    resolved_value    REAL,
    resolved_source   TEXT,
    reopened_from     TEXT REFERENCES contradictions(contradiction_id),
    detected_at       TEXT NOT NULL,
    resolved_at       TEXT
);

CREATE INDEX IF NOT EXISTS packs_subject_idx
    ON evidence_packs(subject_type, subject_id);
CREATE INDEX IF NOT EXISTS vintages_subject_idx
    ON claim_vintages(subject_type, subject_id);
CREATE INDEX IF NOT EXISTS contradictions_indicator_idx
    ON contradictions(indicator_code);
CREATE INDEX IF NOT EXISTS contradictions_status_idx
    ON contradictions(status);

PRAGMA user_version = 1;
";
