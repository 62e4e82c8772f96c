use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::TalentdConfig;
use crate::oracle::OpenRouterOracle;

/// Run the full pipeline over a JSONL file of normalized member records.
pub async fn enrich(config: &TalentdConfig, input: &Path) -> Result<()> {
    let batch = crate::ingest::read_records(input)
        .with_context(|| format!("failed to read records from {}", input.display()))?;

    if !batch.rejected.is_empty() {
        println!("Rejected {} malformed record(s):", batch.rejected.len());
        for reject in &batch.rejected {
            println!("  line {}: {}", reject.line, reject.reason);
        }
        println!();
    }

    if batch.records.is_empty() {
        println!("No valid records to process.");
        return Ok(());
    }

    let oracle = OpenRouterOracle::new(&config.oracle)?;
    let mut conn = crate::db::open_database(config.resolved_db_path())?;

    println!("Enriching {} member(s) with {}...", batch.records.len(), config.oracle.model);

    let summary = crate::pipeline::run(
        &mut conn,
        &oracle,
        &batch.records,
        Duration::from_millis(config.oracle.request_delay_ms),
    )
    .await?;

    println!();
    println!("Run #{} complete", summary.run_id);
    println!("  Ingested:   {}", summary.ingested);
    println!("  Enriched:   {}", summary.enriched);
    println!("  Failed:     {}", summary.failed);
    if summary.flagged > 0 {
        println!("  Flagged:    {} (clamped or off-taxonomy values)", summary.flagged);
    }

    Ok(())
}
