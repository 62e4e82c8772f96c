//! Member identity records.
//!
//! Members are created on first ingestion and mutated only by
//! re-ingestion; enrichment never touches identity fields.

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::store::types::MemberRecord;

/// Insert a member, or update its identity fields if the external key
/// already exists.
pub fn upsert_member(conn: &Connection, record: &MemberRecord) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO members (member_id, member_name, bio_or_comment, last_active_date, raw_date, location, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) \
         ON CONFLICT(member_id) DO UPDATE SET \
             member_name = excluded.member_name, \
             bio_or_comment = excluded.bio_or_comment, \
             last_active_date = excluded.last_active_date, \
             raw_date = excluded.raw_date, \
             location = excluded.location, \
             updated_at = excluded.updated_at",
        params![
            record.member_id,
            record.member_name,
            record.bio_or_comment,
            record.last_active_date,
            record.raw_date,
            record.location,
            now,
        ],
    )?;
    Ok(())
}

/// Fetch a member by external key.
pub fn get_member(conn: &Connection, member_id: &str) -> Result<Option<MemberRecord>> {
    let row = conn
        .query_row(
            "SELECT member_id, member_name, bio_or_comment, last_active_date, raw_date, location \
             FROM members WHERE member_id = ?1",
            params![member_id],
            |row| {
                Ok(MemberRecord {
                    member_id: row.get(0)?,
                    member_name: row.get(1)?,
                    bio_or_comment: row.get(2)?,
                    last_active_date: row.get(3)?,
                    raw_date: row.get(4)?,
                    location: row.get(5)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

/// True if the member exists.
pub fn member_exists(conn: &Connection, member_id: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM members WHERE member_id = ?1",
        params![member_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
