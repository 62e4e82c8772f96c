//! Run ledger — one row per pipeline run plus per-member stage outcomes.

use rusqlite::{params, Connection};

use crate::error::Result;

/// Open a new enrichment run record. Returns the run id.
pub fn create_run(conn: &Connection, model_name: &str) -> Result<i64> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO enrichment_runs (started_at, model_name, status) VALUES (?1, ?2, 'in_progress')",
        params![now, model_name],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Close an enrichment run with final counts.
pub fn finish_run(
    conn: &Connection,
    run_id: i64,
    processed: u64,
    failed: u64,
    notes: Option<&str>,
) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "UPDATE enrichment_runs \
         SET finished_at = ?1, records_processed = ?2, records_failed = ?3, status = 'completed', notes = ?4 \
         WHERE run_id = ?5",
        params![now, processed as i64, failed as i64, notes, run_id],
    )?;
    Ok(())
}

/// Record one member's outcome at a pipeline stage.
pub fn log_processing(
    conn: &Connection,
    member_id: Option<&str>,
    member_name: &str,
    stage: &str,
    status: &str,
    error_message: Option<&str>,
) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO processing_log (member_id, member_name, stage, status, error_message, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![member_id, member_name, stage, status, error_message, now],
    )?;
    Ok(())
}
