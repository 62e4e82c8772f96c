//! Mentor ranking — compound filters over current snapshots.
//!
//! A member qualifies if every supplied filter passes against its current
//! snapshot; skill filters match current skill links only. Ranking is
//! fully deterministic: matched-skill count desc, matched-skill confidence
//! sum desc, persona confidence desc, `member_id` asc.

use std::collections::HashSet;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use serde::Serialize;

use crate::error::Result;
use crate::store::types::{PersonaType, SkillLink};

/// Recognized filter options for [`find_mentors`]. All optional.
#[derive(Debug, Clone, Default)]
pub struct MentorFilter {
    /// Case-insensitive substring match on the member's location.
    pub location: Option<String>,
    /// Requested skill names (matched case-insensitively).
    pub skills: Vec<String>,
    /// If true, every requested skill must be present (AND); otherwise any
    /// one suffices (OR).
    pub match_all_skills: bool,
    /// Minimum current persona confidence.
    pub min_confidence: f64,
    /// Exact persona match.
    pub persona_type: Option<PersonaType>,
}

/// One ranked mentor candidate.
#[derive(Debug, Clone, Serialize)]
pub struct MentorMatch {
    pub member_id: String,
    pub member_name: String,
    pub location: Option<String>,
    pub persona_type: PersonaType,
    pub confidence_score: f64,
    pub reasoning: Option<String>,
    pub enrichment_version: u32,
    /// Requested skills this member holds, sorted by name.
    pub matched_skills: Vec<String>,
    /// Confidence sum over the matched skills.
    pub matched_confidence: f64,
    /// All current skills, sorted by name.
    pub skills: Vec<String>,
    /// Derived at query time: current confidence at or below the review threshold.
    pub needs_review: bool,
}

struct Candidate {
    member_id: String,
    member_name: String,
    location: Option<String>,
    persona_type: String,
    confidence_score: f64,
    reasoning: Option<String>,
    enrichment_version: u32,
}

/// Rank members against their current snapshots. Read-only.
pub fn find_mentors(
    conn: &Connection,
    filter: &MentorFilter,
    review_threshold: f64,
) -> Result<Vec<MentorMatch>> {
    let mut sql = String::from(
        "SELECT m.member_id, m.member_name, m.location, p.persona_type, \
                p.confidence_score, p.reasoning, p.enrichment_version \
         FROM members m \
         JOIN member_personas p ON p.member_id = m.member_id AND p.is_current = 1 \
         WHERE p.confidence_score >= ?",
    );
    let mut args: Vec<Value> = vec![Value::from(filter.min_confidence)];

    if let Some(persona) = filter.persona_type {
        sql.push_str(" AND p.persona_type = ?");
        args.push(Value::from(persona.as_str().to_string()));
    }
    if let Some(location) = &filter.location {
        sql.push_str(" AND m.location IS NOT NULL AND LOWER(m.location) LIKE ?");
        args.push(Value::from(format!("%{}%", location.to_lowercase())));
    }
    sql.push_str(" ORDER BY m.member_id");

    let mut stmt = conn.prepare(&sql)?;
    let candidates: Vec<Candidate> = stmt
        .query_map(params_from_iter(args), |row| {
            Ok(Candidate {
                member_id: row.get(0)?,
                member_name: row.get(1)?,
                location: row.get(2)?,
                persona_type: row.get(3)?,
                confidence_score: row.get(4)?,
                reasoning: row.get(5)?,
                enrichment_version: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let requested: HashSet<String> = filter
        .skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let mut matches = Vec::new();
    for candidate in candidates {
        let links = current_skill_links(conn, &candidate.member_id, candidate.enrichment_version)?;

        let mut matched_skills = Vec::new();
        let mut matched_confidence = 0.0;
        for link in &links {
            if requested.contains(&link.skill_name) {
                matched_skills.push(link.skill_name.clone());
                matched_confidence += link.confidence;
            }
        }

        if !requested.is_empty() {
            let enough = if filter.match_all_skills {
                matched_skills.len() == requested.len()
            } else {
                !matched_skills.is_empty()
            };
            if !enough {
                continue;
            }
        }

        matched_skills.sort();
        matches.push(MentorMatch {
            needs_review: candidate.confidence_score <= review_threshold,
            member_id: candidate.member_id,
            member_name: candidate.member_name,
            location: candidate.location,
            persona_type: candidate.persona_type.parse().unwrap_or(PersonaType::Unknown),
            confidence_score: candidate.confidence_score,
            reasoning: candidate.reasoning,
            enrichment_version: candidate.enrichment_version,
            matched_skills,
            matched_confidence,
            skills: links.iter().map(|l| l.skill_name.clone()).collect(),
        });
    }

    matches.sort_by(|a, b| {
        b.matched_skills
            .len()
            .cmp(&a.matched_skills.len())
            .then(b.matched_confidence.total_cmp(&a.matched_confidence))
            .then(b.confidence_score.total_cmp(&a.confidence_score))
            .then(a.member_id.cmp(&b.member_id))
    });

    Ok(matches)
}

/// Skill links belonging to the member's current enrichment version,
/// sorted by name.
pub fn current_skill_links(
    conn: &Connection,
    member_id: &str,
    enrichment_version: u32,
) -> Result<Vec<SkillLink>> {
    let mut stmt = conn.prepare(
        "SELECT s.skill_name, s.category, ms.confidence, ms.enrichment_version \
         FROM member_skills ms \
         JOIN skills s ON s.skill_id = ms.skill_id \
         WHERE ms.member_id = ?1 AND ms.enrichment_version = ?2 \
         ORDER BY s.skill_name",
    )?;
    let links = stmt
        .query_map(rusqlite::params![member_id, enrichment_version], |row| {
            Ok(SkillLink {
                skill_name: row.get(0)?,
                category: row.get(1)?,
                confidence: row.get(2)?,
                enrichment_version: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(links)
}
