//! Core record type definitions.
//!
//! Defines [`PersonaType`] (the closed classification taxonomy),
//! [`MemberRecord`] (a normalized ingestion record), [`Classification`]
//! (one oracle result), and the row structs read back by the query engine.

use serde::{Deserialize, Serialize};

/// The closed persona taxonomy. Oracle output outside this set is flagged
/// and stored as [`PersonaType::Unknown`], never as a free-form string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonaType {
    /// Experienced, offers to help, has mentored before.
    #[serde(rename = "Mentor Material")]
    MentorMaterial,
    /// Beginner, struggling, explicitly asks for help.
    #[serde(rename = "Needs Guidance")]
    NeedsGuidance,
    /// Minimal engagement, vague interest.
    #[serde(rename = "Passive")]
    Passive,
    /// Enthusiastic, actively learning, engaged.
    #[serde(rename = "Active Learner")]
    ActiveLearner,
    /// Advanced skills, built systems, research background.
    #[serde(rename = "Expert Contributor")]
    ExpertContributor,
    /// Off-taxonomy oracle output, flagged for manual review.
    #[serde(rename = "Unknown")]
    Unknown,
}

impl PersonaType {
    /// All taxonomy members, in display order.
    pub const ALL: [PersonaType; 6] = [
        Self::MentorMaterial,
        Self::NeedsGuidance,
        Self::Passive,
        Self::ActiveLearner,
        Self::ExpertContributor,
        Self::Unknown,
    ];

    /// SQL-compatible string representation (mirrors the CHECK constraint).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MentorMaterial => "Mentor Material",
            Self::NeedsGuidance => "Needs Guidance",
            Self::Passive => "Passive",
            Self::ActiveLearner => "Active Learner",
            Self::ExpertContributor => "Expert Contributor",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for PersonaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PersonaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Mentor Material" => Ok(Self::MentorMaterial),
            "Needs Guidance" => Ok(Self::NeedsGuidance),
            "Passive" => Ok(Self::Passive),
            "Active Learner" => Ok(Self::ActiveLearner),
            "Expert Contributor" => Ok(Self::ExpertContributor),
            "Unknown" => Ok(Self::Unknown),
            _ => Err(format!("unknown persona type: {s}")),
        }
    }
}

/// A normalized member record, as produced by the ingestion layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRecord {
    /// Stable external key.
    pub member_id: String,
    pub member_name: String,
    /// Free text source for enrichment.
    pub bio_or_comment: String,
    /// ISO 8601 calendar date (YYYY-MM-DD), or `None` if unparseable.
    #[serde(default)]
    pub last_active_date: Option<String>,
    /// The date string as it appeared before normalization.
    #[serde(default)]
    pub raw_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// One skill claim inside an oracle classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillClaim {
    pub skill_name: String,
    #[serde(default)]
    pub category: Option<String>,
    /// In `[0.0, 1.0]`; out-of-range values are clamped at write time.
    pub confidence: f64,
}

/// One oracle classification result for one member.
///
/// `persona_type` is the raw oracle string; the write path validates it
/// against the closed taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub persona_type: String,
    pub confidence_score: f64,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub skills: Vec<SkillClaim>,
}

/// A persona row as stored, one per (member, enrichment_version).
#[derive(Debug, Clone, Serialize)]
pub struct PersonaRow {
    pub member_id: String,
    pub persona_type: PersonaType,
    pub confidence_score: f64,
    pub reasoning: Option<String>,
    pub enrichment_version: u32,
    pub is_current: bool,
    pub created_at: String,
}

/// A skill link active at some enrichment version, joined to the dictionary.
#[derive(Debug, Clone, Serialize)]
pub struct SkillLink {
    pub skill_name: String,
    pub category: Option<String>,
    pub confidence: f64,
    pub enrichment_version: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn persona_round_trips_through_strings() {
        for p in PersonaType::ALL {
            assert_eq!(PersonaType::from_str(p.as_str()).unwrap(), p);
        }
    }

    #[test]
    fn persona_rejects_off_taxonomy_strings() {
        assert!(PersonaType::from_str("Wizard").is_err());
        assert!(PersonaType::from_str("mentor material").is_err());
    }

    #[test]
    fn member_record_parses_minimal_json() {
        let rec: MemberRecord = serde_json::from_str(
            r#"{"member_id":"M1","member_name":"Ada","bio_or_comment":"Python dev"}"#,
        )
        .unwrap();
        assert_eq!(rec.member_id, "M1");
        assert!(rec.last_active_date.is_none());
        assert!(rec.location.is_none());
    }
}
