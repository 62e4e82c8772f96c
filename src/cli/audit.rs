use anyhow::Result;

use crate::config::TalentdConfig;
use crate::query::audit::AuditStatus;

/// Display the low-confidence review listing.
pub fn low_confidence(config: &TalentdConfig, threshold: f64) -> Result<()> {
    let conn = crate::db::open_database(config.resolved_db_path())?;
    let entries = crate::query::audit::audit_low_confidence(&conn, threshold)?;

    if entries.is_empty() {
        println!("No members below confidence {threshold:.2}.");
        return Ok(());
    }

    println!("{} member(s) need review (threshold {threshold:.2})\n", entries.len());
    for entry in &entries {
        match entry.status {
            AuditStatus::Unclassified => {
                println!("  {} ({})  — unclassified", entry.member_name, entry.member_id);
            }
            AuditStatus::LowConfidence => {
                println!(
                    "  {} ({})  {} at {:.2}, version {}",
                    entry.member_name,
                    entry.member_id,
                    entry.persona_type.map(|p| p.to_string()).unwrap_or_default(),
                    entry.confidence_score.unwrap_or(0.0),
                    entry.enrichment_version.unwrap_or(0),
                );
                if let Some(reasoning) = &entry.reasoning {
                    println!("      {reasoning}");
                }
            }
        }
    }

    Ok(())
}

/// Display every enrichment version ever written for one member.
pub fn history(config: &TalentdConfig, member_id: &str) -> Result<()> {
    let conn = crate::db::open_database(config.resolved_db_path())?;
    let rows = crate::query::audit::history(&conn, member_id)?;

    if rows.is_empty() {
        println!("No enrichment history for member {member_id}.");
        return Ok(());
    }

    println!("Enrichment history for {member_id}\n");
    for row in &rows {
        println!(
            "  v{} {} [{}] confidence {:.2}  {}",
            row.enrichment_version,
            if row.is_current { "(current)" } else { "         " },
            row.persona_type,
            row.confidence_score,
            row.created_at,
        );
    }

    Ok(())
}
