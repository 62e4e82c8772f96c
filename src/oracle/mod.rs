//! The consumed AI classifier interface.
//!
//! The store treats classification as an opaque, fallible capability: a
//! bio goes in, a structured [`Classification`] comes out. Failures
//! surface as enrichment errors and are recovered per member by the
//! pipeline, leaving any existing current snapshot untouched.

pub mod openrouter;

use async_trait::async_trait;

use crate::error::Result;
use crate::store::types::Classification;

pub use openrouter::OpenRouterOracle;

#[async_trait]
pub trait Oracle: Send + Sync {
    /// Classify a member biography into persona, confidence, and skills.
    async fn classify(&self, bio: &str) -> Result<Classification>;

    /// Model identifier, recorded in the run ledger.
    fn model(&self) -> &str;
}
