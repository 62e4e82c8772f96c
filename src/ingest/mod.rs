//! Normalized-record stream reader.
//!
//! The ETL layer upstream hands over member records as JSON Lines, one
//! object per line. Records missing identity fields are rejected with a
//! per-line reason; dates are defensively re-normalized since upstream
//! exports have historically carried several formats.

use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::store::types::MemberRecord;

/// A line that failed validation, kept for the end-of-run summary.
#[derive(Debug, Serialize)]
pub struct RejectedRecord {
    /// 1-based line number in the input file.
    pub line: usize,
    pub reason: String,
}

/// Outcome of reading one input file.
#[derive(Debug)]
pub struct IngestBatch {
    pub records: Vec<MemberRecord>,
    pub rejected: Vec<RejectedRecord>,
}

/// Read and validate a JSONL file of member records.
pub fn read_records(path: impl AsRef<Path>) -> Result<IngestBatch> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let mut records = Vec::new();
    let mut rejected = Vec::new();

    for (idx, line) in contents.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<MemberRecord>(line) {
            Ok(record) => match validate(record) {
                Ok(record) => records.push(record),
                Err(reason) => {
                    warn!(line = line_no, %reason, "record rejected");
                    rejected.push(RejectedRecord { line: line_no, reason });
                }
            },
            Err(e) => {
                let reason = format!("invalid JSON: {e}");
                warn!(line = line_no, %reason, "record rejected");
                rejected.push(RejectedRecord { line: line_no, reason });
            }
        }
    }

    Ok(IngestBatch { records, rejected })
}

/// Validate identity fields and normalize the rest.
fn validate(mut record: MemberRecord) -> std::result::Result<MemberRecord, String> {
    if record.member_id.trim().is_empty() {
        return Err("missing member_id".to_string());
    }
    if record.member_name.trim().is_empty() {
        return Err("missing member_name".to_string());
    }
    if record.bio_or_comment.trim().is_empty() {
        return Err("missing bio_or_comment".to_string());
    }

    record.member_id = record.member_id.trim().to_string();
    record.member_name = normalize_name(&record.member_name);
    record.bio_or_comment = record.bio_or_comment.trim().to_string();

    if let Some(raw) = record.last_active_date.take() {
        let raw = raw.trim().to_string();
        match normalize_date(&raw) {
            Some(normalized) => record.last_active_date = Some(normalized),
            None => {
                warn!(member_id = %record.member_id, date = %raw, "could not parse date");
            }
        }
        record.raw_date = Some(raw);
    }

    if let Some(location) = record.location.take() {
        let location = location.trim().to_string();
        if !location.is_empty() {
            record.location = Some(location);
        }
    }

    Ok(record)
}

/// Collapse whitespace and title-case a member name.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Date formats the upstream exports have been seen to carry.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", // 2024-06-12
    "%d/%m/%y", // 12/05/24
    "%Y/%m/%d", // 2024/06/12
    "%d-%m-%Y", // 12-05-2024
    "%Y.%m.%d", // 2024.02.14
    "%b %d %Y", // Jan 7 2024
    "%d-%m-%y", // 15-02-24
];

/// Normalize a date string to ISO (YYYY-MM-DD). Returns None if no known
/// format matches.
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    None
}
