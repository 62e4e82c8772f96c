#![allow(dead_code)]

use rusqlite::Connection;
use talentd::db;
use talentd::store::members::upsert_member;
use talentd::store::types::{Classification, MemberRecord, SkillClaim};
use talentd::store::write::write_enrichment;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    db::schema::init_schema(&conn).unwrap();
    db::migrations::run_migrations(&conn).unwrap();
    conn
}

/// Build a member record with the given id; other fields get test defaults.
pub fn member(id: &str) -> MemberRecord {
    MemberRecord {
        member_id: id.to_string(),
        member_name: format!("Member {id}"),
        bio_or_comment: format!("Bio for {id}"),
        last_active_date: Some("2024-06-12".to_string()),
        raw_date: Some("2024-06-12".to_string()),
        location: None,
    }
}

/// Build a member record with a location.
pub fn member_at(id: &str, location: &str) -> MemberRecord {
    MemberRecord {
        location: Some(location.to_string()),
        ..member(id)
    }
}

/// Build a classification from a persona, confidence, and (name, confidence)
/// skill pairs.
pub fn classification(persona: &str, confidence: f64, skills: &[(&str, f64)]) -> Classification {
    Classification {
        persona_type: persona.to_string(),
        confidence_score: confidence,
        reasoning: format!("{persona} at {confidence}"),
        skills: skills
            .iter()
            .map(|(name, conf)| SkillClaim {
                skill_name: (*name).to_string(),
                category: None,
                confidence: *conf,
            })
            .collect(),
    }
}

/// Seed a member and write one enrichment snapshot for it.
pub fn enrich(
    conn: &mut Connection,
    id: &str,
    persona: &str,
    confidence: f64,
    skills: &[(&str, f64)],
) {
    upsert_member(conn, &member(id)).unwrap();
    write_enrichment(conn, id, &classification(persona, confidence, skills)).unwrap();
}

/// Count a member's current persona rows. The single-current invariant
/// demands this be exactly 1 for every enriched member.
pub fn current_count(conn: &Connection, member_id: &str) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM member_personas WHERE member_id = ?1 AND is_current = 1",
        [member_id],
        |r| r.get(0),
    )
    .unwrap()
}
