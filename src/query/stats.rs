//! Store statistics over current snapshots.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::Connection;
use serde::Serialize;

use crate::error::Result;
use crate::store::types::PersonaType;

/// Confidence distribution over current persona rows.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConfidenceBuckets {
    /// `< 0.2`
    pub very_low: u64,
    /// `0.2 – 0.5`
    pub low: u64,
    /// `0.5 – 0.8`
    pub medium: u64,
    /// `>= 0.8`
    pub high: u64,
}

/// Response from [`store_stats`].
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// All members, enriched or not.
    pub total_members: u64,
    /// Members with a current persona snapshot.
    pub enriched_members: u64,
    pub persona_distribution: HashMap<String, u64>,
    /// Skills referenced by current skill links.
    pub distinct_skills: u64,
    pub confidence_buckets: ConfidenceBuckets,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_confidence: Option<f64>,
    /// Most-linked current skills, descending. At most ten.
    pub top_skills: Vec<(String, u64)>,
    pub db_size_bytes: u64,
}

/// Compute store statistics. Current rows only, except `total_members`
/// which counts every ingested member.
///
/// `db_path` is used for file size calculation; pass None for in-memory
/// databases.
pub fn store_stats(conn: &Connection, db_path: Option<&Path>) -> Result<StatsResponse> {
    let total_members: i64 =
        conn.query_row("SELECT COUNT(*) FROM members", [], |row| row.get(0))?;
    let enriched_members: i64 = conn.query_row(
        "SELECT COUNT(*) FROM member_personas WHERE is_current = 1",
        [],
        |row| row.get(0),
    )?;

    let persona_distribution = persona_distribution(conn)?;
    let distinct_skills = distinct_current_skills(conn)?;
    let confidence_buckets = confidence_buckets(conn)?;
    let average_confidence: Option<f64> = conn.query_row(
        "SELECT AVG(confidence_score) FROM member_personas WHERE is_current = 1",
        [],
        |row| row.get(0),
    )?;
    let top_skills = top_skills(conn)?;

    let db_size_bytes = db_path
        .and_then(|p| std::fs::metadata(p).ok())
        .map(|m| m.len())
        .unwrap_or(0);

    Ok(StatsResponse {
        total_members: total_members as u64,
        enriched_members: enriched_members as u64,
        persona_distribution,
        distinct_skills,
        confidence_buckets,
        average_confidence,
        top_skills,
        db_size_bytes,
    })
}

/// Count of current rows per persona type, with every taxonomy member
/// present (zero if unused).
fn persona_distribution(conn: &Connection) -> Result<HashMap<String, u64>> {
    let mut map = HashMap::new();
    for p in PersonaType::ALL {
        map.insert(p.as_str().to_string(), 0);
    }

    let mut stmt = conn.prepare(
        "SELECT persona_type, COUNT(*) FROM member_personas WHERE is_current = 1 GROUP BY persona_type",
    )?;
    let rows: Vec<(String, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for (persona, count) in rows {
        map.insert(persona, count as u64);
    }
    Ok(map)
}

/// Distinct skills linked at members' current versions.
fn distinct_current_skills(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(DISTINCT ms.skill_id) \
         FROM member_skills ms \
         JOIN member_personas p ON p.member_id = ms.member_id \
             AND p.is_current = 1 AND p.enrichment_version = ms.enrichment_version",
        [],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

fn confidence_buckets(conn: &Connection) -> Result<ConfidenceBuckets> {
    let (very_low, low, medium, high): (i64, i64, i64, i64) = conn.query_row(
        "SELECT \
            COALESCE(SUM(confidence_score < 0.2), 0), \
            COALESCE(SUM(confidence_score >= 0.2 AND confidence_score < 0.5), 0), \
            COALESCE(SUM(confidence_score >= 0.5 AND confidence_score < 0.8), 0), \
            COALESCE(SUM(confidence_score >= 0.8), 0) \
         FROM member_personas WHERE is_current = 1",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
    )?;
    Ok(ConfidenceBuckets {
        very_low: very_low as u64,
        low: low as u64,
        medium: medium as u64,
        high: high as u64,
    })
}

/// Most-linked skills among current links, count descending, name
/// ascending on ties.
fn top_skills(conn: &Connection) -> Result<Vec<(String, u64)>> {
    let mut stmt = conn.prepare(
        "SELECT s.skill_name, COUNT(*) AS link_count \
         FROM member_skills ms \
         JOIN skills s ON s.skill_id = ms.skill_id \
         JOIN member_personas p ON p.member_id = ms.member_id \
             AND p.is_current = 1 AND p.enrichment_version = ms.enrichment_version \
         GROUP BY s.skill_name \
         ORDER BY link_count DESC, s.skill_name ASC \
         LIMIT 10",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
