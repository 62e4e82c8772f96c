//! Sequential enrichment pipeline.
//!
//! One member at a time: upsert the identity record, call the oracle,
//! write the snapshot. The oracle call happens strictly before the write
//! transaction opens, so an oracle failure aborts that member's write
//! without touching existing current state. Failures are recovered per
//! member and aggregated into the run summary.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::db::migrations;
use crate::error::Result;
use crate::oracle::Oracle;
use crate::store::types::MemberRecord;
use crate::store::{members, runs, write};

/// End-of-run summary.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub run_id: i64,
    pub ingested: u64,
    pub enriched: u64,
    pub failed: u64,
    /// Members whose snapshot carried clamped or off-taxonomy values.
    pub flagged: u64,
}

/// Run the pipeline over a batch of normalized records.
///
/// `request_delay` spaces out oracle calls; pass `Duration::ZERO` in tests.
pub async fn run(
    conn: &mut Connection,
    oracle: &dyn Oracle,
    records: &[MemberRecord],
    request_delay: Duration,
) -> Result<RunSummary> {
    let run_id = runs::create_run(conn, oracle.model())?;
    migrations::set_oracle_model(conn, oracle.model())?;

    let bar = ProgressBar::new(records.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("##-"),
    );

    let mut enriched = 0u64;
    let mut failed = 0u64;
    let mut flagged = 0u64;

    for (i, record) in records.iter().enumerate() {
        bar.set_message(record.member_name.clone());

        members::upsert_member(conn, record)?;
        runs::log_processing(
            conn,
            Some(&record.member_id),
            &record.member_name,
            "ingestion",
            "success",
            None,
        )?;

        match oracle.classify(&record.bio_or_comment).await {
            Ok(classification) => {
                match write::write_enrichment(conn, &record.member_id, &classification) {
                    Ok(outcome) => {
                        info!(
                            member_id = %record.member_id,
                            version = outcome.enrichment_version,
                            persona = %outcome.persona_type,
                            confidence = outcome.confidence_score,
                            skills = outcome.skills_linked,
                            "member enriched"
                        );
                        runs::log_processing(
                            conn,
                            Some(&record.member_id),
                            &record.member_name,
                            "enrichment",
                            "success",
                            None,
                        )?;
                        enriched += 1;
                        if outcome.flagged {
                            flagged += 1;
                        }
                    }
                    Err(e) => {
                        error!(member_id = %record.member_id, error = %e, "enrichment write failed");
                        runs::log_processing(
                            conn,
                            Some(&record.member_id),
                            &record.member_name,
                            "enrichment",
                            "error",
                            Some(&e.to_string()),
                        )?;
                        failed += 1;
                    }
                }
            }
            Err(e) => {
                warn!(member_id = %record.member_id, error = %e, "oracle call failed, skipping member");
                runs::log_processing(
                    conn,
                    Some(&record.member_id),
                    &record.member_name,
                    "oracle",
                    "error",
                    Some(&e.to_string()),
                )?;
                failed += 1;
            }
        }

        bar.inc(1);

        if !request_delay.is_zero() && i + 1 < records.len() {
            tokio::time::sleep(request_delay).await;
        }
    }

    bar.finish_and_clear();

    let notes = format!("{enriched} enriched, {failed} failed, {flagged} flagged");
    runs::finish_run(conn, run_id, enriched, failed, Some(&notes))?;
    info!(run_id, enriched, failed, flagged, "pipeline run completed");

    Ok(RunSummary {
        run_id,
        ingested: records.len() as u64,
        enriched,
        failed,
        flagged,
    })
}
