mod cli;
mod config;
mod db;
mod error;
mod ingest;
mod oracle;
mod pipeline;
mod query;
mod store;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::query::mentors::MentorFilter;
use crate::store::types::PersonaType;

#[derive(Parser)]
#[command(name = "talentd", version, about = "Versioned member-enrichment store and mentor ranking engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a JSONL file of member records and enrich them via the oracle
    Enrich {
        /// Path to the normalized records file (one JSON object per line)
        input: PathBuf,
    },
    /// Find ranked mentor candidates from current snapshots
    Mentors {
        /// Case-insensitive substring match on location
        #[arg(long)]
        location: Option<String>,
        /// Requested skill (repeatable)
        #[arg(long = "skill")]
        skills: Vec<String>,
        /// Require all requested skills instead of any
        #[arg(long)]
        all_skills: bool,
        /// Minimum persona confidence
        #[arg(long, default_value_t = 0.0)]
        min_confidence: f64,
        /// Exact persona filter (e.g. "Mentor Material")
        #[arg(long)]
        persona: Option<String>,
    },
    /// List members whose current classification needs manual review
    LowConfidence {
        /// Confidence threshold; defaults to the configured value
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Show every enrichment version for one member
    History {
        member_id: String,
    },
    /// Show store statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::TalentdConfig::load()?;

    // Initialize tracing with the configured log level.
    // Log to stderr so stdout stays clean for query output.
    let filter = EnvFilter::try_new(&config.logging.level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Enrich { input } => {
            cli::enrich::enrich(&config, &input).await?;
        }
        Command::Mentors {
            location,
            skills,
            all_skills,
            min_confidence,
            persona,
        } => {
            let persona_type = match persona {
                Some(raw) => Some(raw.parse::<PersonaType>().map_err(anyhow::Error::msg)?),
                None => None,
            };
            let filter = MentorFilter {
                location,
                skills,
                match_all_skills: all_skills,
                min_confidence,
                persona_type,
            };
            cli::mentors::mentors(&config, &filter)?;
        }
        Command::LowConfidence { threshold } => {
            let threshold = threshold.unwrap_or(config.query.low_confidence_threshold);
            cli::audit::low_confidence(&config, threshold)?;
        }
        Command::History { member_id } => {
            cli::audit::history(&config, &member_id)?;
        }
        Command::Stats => {
            cli::stats::stats(&config)?;
        }
    }

    Ok(())
}
