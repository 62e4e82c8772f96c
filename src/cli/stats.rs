use anyhow::Result;

use crate::config::TalentdConfig;
use crate::store::types::PersonaType;

/// Display store statistics in the terminal.
pub fn stats(config: &TalentdConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = crate::db::open_database(&db_path)?;

    let response = crate::query::stats::store_stats(&conn, Some(&db_path))?;

    println!("Store Statistics");
    println!("{}", "=".repeat(40));
    println!("  Total members:       {}", response.total_members);
    println!("  Enriched:            {}", response.enriched_members);
    println!();

    println!("Persona Distribution:");
    for p in PersonaType::ALL {
        let count = response
            .persona_distribution
            .get(p.as_str())
            .copied()
            .unwrap_or(0);
        println!("  {:<20} {}", p.as_str(), count);
    }
    println!();

    println!("Confidence (current snapshots):");
    println!("  < 0.2                {}", response.confidence_buckets.very_low);
    println!("  0.2 – 0.5            {}", response.confidence_buckets.low);
    println!("  0.5 – 0.8            {}", response.confidence_buckets.medium);
    println!("  >= 0.8               {}", response.confidence_buckets.high);
    if let Some(avg) = response.average_confidence {
        println!("  average              {avg:.2}");
    }
    println!();

    println!("Distinct skills:       {}", response.distinct_skills);
    if !response.top_skills.is_empty() {
        println!("Top skills:");
        for (skill, count) in &response.top_skills {
            println!("  {skill:<20} {count}");
        }
    }
    println!("Database size:         {} bytes", response.db_size_bytes);

    Ok(())
}
