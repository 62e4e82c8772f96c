//! Version controller — per-member monotonic version numbers and the
//! atomic promote transition.
//!
//! A member's enrichment history is append-only. Exactly one persona row
//! per enriched member carries `is_current = 1`; [`promote_in_tx`] is the
//! only code that flips the flag, always inside a transaction, so readers
//! observe either the pre- or the post-transition state and never a
//! hybrid. Skill-link currency is derived from the current persona
//! version, so the persona flip is the single observable switch.

use rusqlite::{params, Connection, Transaction};

use crate::error::{Error, Result};

/// Next version number for a member: `max(existing) + 1`, or 1 if the
/// member has never been enriched. Pure read, no side effect.
pub fn next_version(conn: &Connection, member_id: &str) -> Result<u32> {
    let max: u32 = conn.query_row(
        "SELECT COALESCE(MAX(enrichment_version), 0) FROM member_personas WHERE member_id = ?1",
        params![member_id],
        |row| row.get(0),
    )?;
    Ok(max + 1)
}

/// The member's current enrichment version, if one has been promoted.
pub fn current_version(conn: &Connection, member_id: &str) -> Result<Option<u32>> {
    use rusqlite::OptionalExtension;
    let version = conn
        .query_row(
            "SELECT enrichment_version FROM member_personas WHERE member_id = ?1 AND is_current = 1",
            params![member_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(version)
}

/// Atomically demote the member's current persona row and mark the row of
/// `version` current. Must run inside the caller's transaction; any error
/// aborts the whole transaction, so no hybrid state can be committed.
///
/// Fails with `VersionConflict` if the pre-transition state has more than
/// one current row, or if `version` does not identify exactly one row.
pub fn promote_in_tx(tx: &Transaction, member_id: &str, version: u32) -> Result<()> {
    let current: i64 = tx.query_row(
        "SELECT COUNT(*) FROM member_personas WHERE member_id = ?1 AND is_current = 1",
        params![member_id],
        |row| row.get(0),
    )?;
    if current > 1 {
        return Err(Error::VersionConflict {
            member_id: member_id.to_string(),
            detail: format!("found {current} current persona rows before promote"),
        });
    }

    tx.execute(
        "UPDATE member_personas SET is_current = 0 WHERE member_id = ?1 AND is_current = 1",
        params![member_id],
    )?;

    let promoted = tx.execute(
        "UPDATE member_personas SET is_current = 1 WHERE member_id = ?1 AND enrichment_version = ?2",
        params![member_id, version],
    )?;
    if promoted != 1 {
        return Err(Error::VersionConflict {
            member_id: member_id.to_string(),
            detail: format!("version {version} matched {promoted} rows at promote"),
        });
    }

    Ok(())
}

/// Standalone promote: wraps [`promote_in_tx`] in its own transaction.
pub fn promote(conn: &mut Connection, member_id: &str, version: u32) -> Result<()> {
    let tx = conn.transaction()?;
    promote_in_tx(&tx, member_id, version)?;
    tx.commit()?;
    Ok(())
}
