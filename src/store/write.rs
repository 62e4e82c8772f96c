//! Write path — persona insert, skill resolution, link insert, promote.
//!
//! [`write_enrichment`] is the single entry point. The whole pipeline for
//! one member runs inside one transaction: insert the persona row at the
//! next version with `is_current = 0`, resolve-or-create each skill,
//! insert the version-stamped links, then promote. The commit is the
//! single point at which the new snapshot becomes observable; any failure
//! before it leaves the previous current snapshot untouched.

use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::Serialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::store::types::{Classification, PersonaType};
use crate::store::{clamp_confidence, members, version};

/// Result returned from a successful enrichment write.
#[derive(Debug, Serialize)]
pub struct EnrichmentOutcome {
    pub member_id: String,
    pub enrichment_version: u32,
    pub persona_type: PersonaType,
    pub confidence_score: f64,
    pub skills_linked: usize,
    /// True if any confidence value was clamped or the persona string was
    /// off-taxonomy. A data-quality signal, not an error.
    pub flagged: bool,
}

/// Durably record one oracle classification for one member under a fresh
/// version and promote it to current.
pub fn write_enrichment(
    conn: &mut Connection,
    member_id: &str,
    classification: &Classification,
) -> Result<EnrichmentOutcome> {
    if !members::member_exists(conn, member_id)? {
        return Err(Error::Enrichment(format!(
            "cannot enrich unknown member {member_id}"
        )));
    }

    let next = version::next_version(conn, member_id)?;
    let mut flagged = false;

    // The oracle is not fully trusted: clamp instead of rejecting.
    let (confidence, clamped) = clamp_confidence(classification.confidence_score);
    if clamped {
        warn!(
            member_id,
            raw = classification.confidence_score,
            stored = confidence,
            "confidence score out of range, clamped"
        );
        flagged = true;
    }

    let persona = match classification.persona_type.parse::<PersonaType>() {
        Ok(p) => p,
        Err(_) => {
            warn!(
                member_id,
                persona = %classification.persona_type,
                "persona outside taxonomy, stored as Unknown"
            );
            flagged = true;
            PersonaType::Unknown
        }
    };

    let tx = conn.transaction()?;

    insert_persona(&tx, member_id, next, persona, confidence, &classification.reasoning)?;

    let mut skills_linked = 0;
    for claim in &classification.skills {
        let name = normalize_skill_name(&claim.skill_name);
        if name.is_empty() {
            continue;
        }
        let skill_id = get_or_create_skill(&tx, &name, claim.category.as_deref())?;
        let (skill_confidence, clamped) = clamp_confidence(claim.confidence);
        if clamped {
            warn!(
                member_id,
                skill = %name,
                raw = claim.confidence,
                "skill confidence out of range, clamped"
            );
            flagged = true;
        }
        insert_skill_link(&tx, member_id, skill_id, next, skill_confidence)?;
        skills_linked += 1;
    }

    version::promote_in_tx(&tx, member_id, next)?;

    tx.commit()?;

    Ok(EnrichmentOutcome {
        member_id: member_id.to_string(),
        enrichment_version: next,
        persona_type: persona,
        confidence_score: confidence,
        skills_linked,
        flagged,
    })
}

/// Trim and lowercase a skill name for case-insensitive dictionary matching.
fn normalize_skill_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Insert the persona row for the new version, not yet current.
fn insert_persona(
    tx: &Transaction,
    member_id: &str,
    enrichment_version: u32,
    persona: PersonaType,
    confidence: f64,
    reasoning: &str,
) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    let reasoning = if reasoning.is_empty() { None } else { Some(reasoning) };
    tx.execute(
        "INSERT INTO member_personas (member_id, persona_type, confidence_score, reasoning, enrichment_version, is_current, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
        params![member_id, persona.as_str(), confidence, reasoning, enrichment_version, now],
    )?;
    Ok(())
}

/// Resolve a skill by normalized name, creating the dictionary entry on
/// first reference. Entries are shared across members and never deleted.
fn get_or_create_skill(tx: &Transaction, name: &str, category: Option<&str>) -> Result<i64> {
    let existing: Option<i64> = tx
        .query_row(
            "SELECT skill_id FROM skills WHERE skill_name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }

    let now = chrono::Utc::now().to_rfc3339();
    tx.execute(
        "INSERT INTO skills (skill_name, category, created_at) VALUES (?1, ?2, ?3)",
        params![name, category, now],
    )?;
    Ok(tx.last_insert_rowid())
}

/// Insert one version-stamped skill link. A duplicate skill within the
/// same classification collapses onto the later claim.
fn insert_skill_link(
    tx: &Transaction,
    member_id: &str,
    skill_id: i64,
    enrichment_version: u32,
    confidence: f64,
) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    tx.execute(
        "INSERT OR REPLACE INTO member_skills (member_id, skill_id, enrichment_version, confidence, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![member_id, skill_id, enrichment_version, confidence, now],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::store::types::{MemberRecord, SkillClaim};

    fn seed_member(conn: &Connection, id: &str) {
        members::upsert_member(
            conn,
            &MemberRecord {
                member_id: id.into(),
                member_name: "Test Member".into(),
                bio_or_comment: "bio".into(),
                last_active_date: None,
                raw_date: None,
                location: None,
            },
        )
        .unwrap();
    }

    fn classification(persona: &str, confidence: f64, skills: &[(&str, f64)]) -> Classification {
        Classification {
            persona_type: persona.into(),
            confidence_score: confidence,
            reasoning: "test reasoning".into(),
            skills: skills
                .iter()
                .map(|(name, conf)| SkillClaim {
                    skill_name: (*name).into(),
                    category: None,
                    confidence: *conf,
                })
                .collect(),
        }
    }

    #[test]
    fn first_write_creates_current_version_one() {
        let mut conn = db::open_memory_database().unwrap();
        seed_member(&conn, "M1");

        let outcome = write_enrichment(
            &mut conn,
            "M1",
            &classification("Mentor Material", 0.9, &[("Python", 0.8), ("mentoring", 0.75)]),
        )
        .unwrap();

        assert_eq!(outcome.enrichment_version, 1);
        assert_eq!(outcome.persona_type, PersonaType::MentorMaterial);
        assert_eq!(outcome.skills_linked, 2);
        assert!(!outcome.flagged);

        let (version, current): (u32, bool) = conn
            .query_row(
                "SELECT enrichment_version, is_current FROM member_personas WHERE member_id = 'M1'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(version, 1);
        assert!(current);
    }

    #[test]
    fn out_of_range_confidence_is_clamped_and_flagged() {
        let mut conn = db::open_memory_database().unwrap();
        seed_member(&conn, "M1");

        let outcome = write_enrichment(
            &mut conn,
            "M1",
            &classification("Passive", 1.5, &[("sql", -0.3)]),
        )
        .unwrap();

        assert!(outcome.flagged);
        assert!((outcome.confidence_score - 1.0).abs() < f64::EPSILON);

        let stored: f64 = conn
            .query_row(
                "SELECT confidence_score FROM member_personas WHERE member_id = 'M1'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert!((stored - 1.0).abs() < f64::EPSILON);

        let skill_conf: f64 = conn
            .query_row(
                "SELECT confidence FROM member_skills WHERE member_id = 'M1'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert!(skill_conf.abs() < f64::EPSILON);
    }

    #[test]
    fn off_taxonomy_persona_stored_as_unknown() {
        let mut conn = db::open_memory_database().unwrap();
        seed_member(&conn, "M1");

        let outcome =
            write_enrichment(&mut conn, "M1", &classification("Wizard", 0.6, &[])).unwrap();

        assert!(outcome.flagged);
        assert_eq!(outcome.persona_type, PersonaType::Unknown);
    }

    #[test]
    fn skills_are_case_insensitive_and_shared() {
        let mut conn = db::open_memory_database().unwrap();
        seed_member(&conn, "M1");
        seed_member(&conn, "M2");

        write_enrichment(&mut conn, "M1", &classification("Passive", 0.5, &[("Python", 0.8)]))
            .unwrap();
        write_enrichment(&mut conn, "M2", &classification("Passive", 0.5, &[(" python ", 0.6)]))
            .unwrap();

        let skill_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM skills", [], |r| r.get(0))
            .unwrap();
        assert_eq!(skill_count, 1);

        let name: String = conn
            .query_row("SELECT skill_name FROM skills", [], |r| r.get(0))
            .unwrap();
        assert_eq!(name, "python");
    }

    #[test]
    fn blank_skill_names_are_skipped() {
        let mut conn = db::open_memory_database().unwrap();
        seed_member(&conn, "M1");

        let outcome = write_enrichment(
            &mut conn,
            "M1",
            &classification("Passive", 0.5, &[("", 0.8), ("   ", 0.8), ("rust", 0.8)]),
        )
        .unwrap();
        assert_eq!(outcome.skills_linked, 1);
    }

    #[test]
    fn rewrite_creates_version_two_and_flips_current() {
        let mut conn = db::open_memory_database().unwrap();
        seed_member(&conn, "M1");

        write_enrichment(&mut conn, "M1", &classification("Passive", 0.4, &[("r", 0.5)]))
            .unwrap();
        let outcome =
            write_enrichment(&mut conn, "M1", &classification("Mentor Material", 0.9, &[]))
                .unwrap();

        assert_eq!(outcome.enrichment_version, 2);

        let rows: Vec<(u32, bool)> = conn
            .prepare(
                "SELECT enrichment_version, is_current FROM member_personas \
                 WHERE member_id = 'M1' ORDER BY enrichment_version",
            )
            .unwrap()
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(rows, vec![(1, false), (2, true)]);
    }

    #[test]
    fn unknown_member_fails_without_partial_state() {
        let mut conn = db::open_memory_database().unwrap();

        let err = write_enrichment(&mut conn, "ghost", &classification("Passive", 0.5, &[]))
            .unwrap_err();
        assert!(matches!(err, Error::Enrichment(_)));

        let personas: i64 = conn
            .query_row("SELECT COUNT(*) FROM member_personas", [], |r| r.get(0))
            .unwrap();
        assert_eq!(personas, 0);
    }
}
