//! Crate-wide error taxonomy.
//!
//! Data-quality issues (out-of-range confidence, unknown persona strings,
//! unparseable dates) are *not* errors: they are clamped or flagged and
//! reported via `tracing::warn!`.

/// Errors surfaced by the store, query engine, and oracle client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Persisted layout incompatible with the expected schema. Fatal at startup.
    #[error("incompatible schema: {0}")]
    Schema(String),

    /// Oracle call failed or returned unusable output. Recovered per member.
    #[error("enrichment failed: {0}")]
    Enrichment(String),

    /// The promote step found an unexpected current-row state for a member.
    #[error("version conflict for member {member_id}: {detail}")]
    VersionConflict { member_id: String, detail: String },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
