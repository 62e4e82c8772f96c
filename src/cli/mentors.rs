use anyhow::Result;

use crate::config::TalentdConfig;
use crate::query::mentors::MentorFilter;

/// Find and display ranked mentor candidates.
pub fn mentors(config: &TalentdConfig, filter: &MentorFilter) -> Result<()> {
    let conn = crate::db::open_database(config.resolved_db_path())?;
    let matches =
        crate::query::mentors::find_mentors(&conn, filter, config.query.review_threshold)?;

    if matches.is_empty() {
        println!("No members matched the given filters.");
        return Ok(());
    }

    println!("Found {} candidate(s)\n", matches.len());
    for (i, m) in matches.iter().enumerate() {
        let location = m.location.as_deref().unwrap_or("-");
        println!(
            "  {}. {} ({}) [{}] confidence {:.2}{}",
            i + 1,
            m.member_name,
            m.member_id,
            m.persona_type,
            m.confidence_score,
            if m.needs_review { "  ⚠ review" } else { "" },
        );
        println!("     location: {location}  version: {}", m.enrichment_version);
        if !m.matched_skills.is_empty() {
            println!(
                "     matched {} skill(s): {} (confidence sum {:.2})",
                m.matched_skills.len(),
                m.matched_skills.join(", "),
                m.matched_confidence,
            );
        }
        if !m.skills.is_empty() {
            println!("     skills: {}", m.skills.join(", "));
        }
        println!();
    }

    Ok(())
}
