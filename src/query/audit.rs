//! Audit queries — low-confidence review listing and per-member history.
//!
//! Unlike ranking, audit mode does not restrict itself to current rows:
//! members that have never been promoted are reported as unclassified, and
//! [`history`] returns every persona version ever written.

use rusqlite::{params, Connection};
use serde::Serialize;

use crate::error::Result;
use crate::store::types::{PersonaRow, PersonaType};

/// Why a member appears in the audit listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    /// Current persona confidence below the requested threshold.
    LowConfidence,
    /// No enrichment has ever been promoted for this member.
    Unclassified,
}

/// One entry in the low-confidence review listing.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub member_id: String,
    pub member_name: String,
    pub status: AuditStatus,
    pub persona_type: Option<PersonaType>,
    pub confidence_score: Option<f64>,
    pub reasoning: Option<String>,
    /// Which version produced the flagged classification.
    pub enrichment_version: Option<u32>,
}

/// All members whose current persona confidence falls below `threshold`,
/// plus never-enriched members as unclassified. Unclassified entries come
/// first, then ascending confidence; ties break on `member_id`.
pub fn audit_low_confidence(conn: &Connection, threshold: f64) -> Result<Vec<AuditEntry>> {
    let mut stmt = conn.prepare(
        "SELECT m.member_id, m.member_name, p.persona_type, p.confidence_score, \
                p.reasoning, p.enrichment_version \
         FROM members m \
         LEFT JOIN member_personas p ON p.member_id = m.member_id AND p.is_current = 1 \
         WHERE p.member_id IS NULL OR p.confidence_score < ?1 \
         ORDER BY (p.member_id IS NOT NULL), p.confidence_score ASC, m.member_id ASC",
    )?;

    let entries = stmt
        .query_map(params![threshold], |row| {
            let persona: Option<String> = row.get(2)?;
            Ok(AuditEntry {
                member_id: row.get(0)?,
                member_name: row.get(1)?,
                status: if persona.is_some() {
                    AuditStatus::LowConfidence
                } else {
                    AuditStatus::Unclassified
                },
                persona_type: persona.map(|p| p.parse().unwrap_or(PersonaType::Unknown)),
                confidence_score: row.get(3)?,
                reasoning: row.get(4)?,
                enrichment_version: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(entries)
}

/// Every persona row ever written for a member, oldest version first.
/// Superseded rows are included; at most one row is marked current.
pub fn history(conn: &Connection, member_id: &str) -> Result<Vec<PersonaRow>> {
    let mut stmt = conn.prepare(
        "SELECT member_id, persona_type, confidence_score, reasoning, \
                enrichment_version, is_current, created_at \
         FROM member_personas \
         WHERE member_id = ?1 \
         ORDER BY enrichment_version",
    )?;

    let rows = stmt
        .query_map(params![member_id], |row| {
            let persona: String = row.get(1)?;
            Ok(PersonaRow {
                member_id: row.get(0)?,
                persona_type: persona.parse().unwrap_or(PersonaType::Unknown),
                confidence_score: row.get(2)?,
                reasoning: row.get(3)?,
                enrichment_version: row.get(4)?,
                is_current: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
