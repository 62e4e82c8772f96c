//! SQL DDL for all talentd tables.
//!
//! Defines the `members`, `skills`, `member_skills`, `member_personas`,
//! `enrichment_runs`, `processing_log`, and `schema_meta` tables. All DDL
//! uses `IF NOT EXISTS` for idempotent initialization. [`verify_schema`]
//! rejects databases whose tables exist but lack expected columns.

use rusqlite::Connection;

use crate::error::{Error, Result};

/// All schema DDL statements for talentd's core tables.
const SCHEMA_SQL: &str = r#"
-- Member identity records. member_id is the stable external key; identity
-- fields change only on re-ingestion, never on enrichment.
CREATE TABLE IF NOT EXISTS members (
    member_id TEXT PRIMARY KEY,
    member_name TEXT NOT NULL,
    bio_or_comment TEXT NOT NULL,
    last_active_date TEXT,
    raw_date TEXT,
    location TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_members_active_date ON members(last_active_date);

-- Skill dictionary: created on first reference, shared across members,
-- never deleted. Names are stored lowercase.
CREATE TABLE IF NOT EXISTS skills (
    skill_id INTEGER PRIMARY KEY AUTOINCREMENT,
    skill_name TEXT NOT NULL UNIQUE,
    category TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_skills_name ON skills(skill_name);

-- Member-skill links, stamped with the enrichment version that produced
-- them. Links are active iff their version matches the member's current
-- persona version; older versions persist for audit.
CREATE TABLE IF NOT EXISTS member_skills (
    member_id TEXT NOT NULL REFERENCES members(member_id) ON DELETE CASCADE,
    skill_id INTEGER NOT NULL REFERENCES skills(skill_id) ON DELETE CASCADE,
    enrichment_version INTEGER NOT NULL,
    confidence REAL NOT NULL CHECK(confidence >= 0.0 AND confidence <= 1.0),
    created_at TEXT NOT NULL,
    PRIMARY KEY (member_id, skill_id, enrichment_version)
);

CREATE INDEX IF NOT EXISTS idx_member_skills_version ON member_skills(member_id, enrichment_version);

-- Persona classifications, one row per (member, enrichment_version).
-- At most one row per member carries is_current = 1.
CREATE TABLE IF NOT EXISTS member_personas (
    persona_id INTEGER PRIMARY KEY AUTOINCREMENT,
    member_id TEXT NOT NULL REFERENCES members(member_id) ON DELETE CASCADE,
    persona_type TEXT NOT NULL CHECK(persona_type IN (
        'Mentor Material','Needs Guidance','Passive','Active Learner',
        'Expert Contributor','Unknown')),
    confidence_score REAL NOT NULL CHECK(confidence_score >= 0.0 AND confidence_score <= 1.0),
    reasoning TEXT,
    enrichment_version INTEGER NOT NULL,
    is_current INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    UNIQUE (member_id, enrichment_version)
);

CREATE INDEX IF NOT EXISTS idx_personas_current ON member_personas(member_id, is_current);

-- One row per pipeline run.
CREATE TABLE IF NOT EXISTS enrichment_runs (
    run_id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    model_name TEXT,
    records_processed INTEGER,
    records_failed INTEGER,
    status TEXT NOT NULL CHECK(status IN ('in_progress','completed','aborted')),
    notes TEXT
);

-- Per-member stage outcomes, for the end-of-run summary and debugging.
CREATE TABLE IF NOT EXISTS processing_log (
    log_id INTEGER PRIMARY KEY AUTOINCREMENT,
    member_id TEXT,
    member_name TEXT,
    stage TEXT NOT NULL,
    status TEXT NOT NULL,
    error_message TEXT,
    created_at TEXT NOT NULL
);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Columns each table must carry. A table that exists without one of these
/// is an incompatible legacy layout.
const EXPECTED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "members",
        &["member_id", "member_name", "bio_or_comment", "last_active_date", "location"],
    ),
    ("skills", &["skill_id", "skill_name", "category"]),
    (
        "member_skills",
        &["member_id", "skill_id", "enrichment_version", "confidence"],
    ),
    (
        "member_personas",
        &["member_id", "persona_type", "confidence_score", "enrichment_version", "is_current"],
    ),
    ("enrichment_runs", &["run_id", "started_at", "status"]),
    ("schema_meta", &["key", "value"]),
];

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}

/// Check that every expected table carries its expected columns.
///
/// `init_schema` cannot repair a table that already exists with a different
/// shape, so a missing column means the file was written by an incompatible
/// layout and startup must abort.
pub fn verify_schema(conn: &Connection) -> Result<()> {
    for (table, columns) in EXPECTED_COLUMNS {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
        let present: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if present.is_empty() {
            return Err(Error::Schema(format!("table {table} is missing")));
        }
        for col in *columns {
            if !present.iter().any(|c| c == col) {
                return Err(Error::Schema(format!(
                    "table {table} is missing expected column {col}"
                )));
            }
        }
    }
    Ok(())
}
