use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TalentdConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub oracle: OracleConfig,
    pub query: QueryConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OracleConfig {
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key. The key itself never
    /// lives in the config file.
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Delay between consecutive oracle calls in the pipeline.
    pub request_delay_ms: u64,
    /// System message sent with every classification request.
    pub system_context: String,
    /// User prompt template; `{bio}` is replaced with the member bio.
    pub prompt_template: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct QueryConfig {
    /// Current personas at or below this confidence are flagged for
    /// manual review in query output.
    pub review_threshold: f64,
    /// Default threshold for the low-confidence audit listing.
    pub low_confidence_threshold: f64,
}

impl Default for TalentdConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            storage: StorageConfig::default(),
            oracle: OracleConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".into() }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_talentd_dir()
            .join("members.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

const DEFAULT_SYSTEM_CONTEXT: &str = "You are an AI assistant analyzing \
association member profiles to match volunteers with mentoring \
opportunities based on skills and readiness.";

const DEFAULT_PROMPT_TEMPLATE: &str = r#"Analyze this member profile and extract structured information:

Member Bio/Comment: {bio}

Respond with STRICT JSON using exactly these fields:
{
  "persona_type": "one of: Mentor Material | Needs Guidance | Passive | Active Learner | Expert Contributor",
  "confidence_score": 0-100 integer based on clarity and detail of the bio,
  "reasoning": "brief explanation of the persona classification",
  "skills": [{"skill_name": "...", "category": "...", "confidence": 0-100 integer}]
}

Skills should include programming languages, financial domains, technical
tools, and soft skills mentioned or implied. Respond ONLY with valid JSON,
no other text."#;

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://openrouter.ai/api/v1".into(),
            model: "openai/gpt-4o-mini".into(),
            api_key_env: "OPENROUTER_API_KEY".into(),
            timeout_secs: 60,
            max_retries: 3,
            request_delay_ms: 1000,
            system_context: DEFAULT_SYSTEM_CONTEXT.into(),
            prompt_template: DEFAULT_PROMPT_TEMPLATE.into(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            review_threshold: 0.1,
            low_confidence_threshold: 0.5,
        }
    }
}

/// Returns `~/.talentd/`
pub fn default_talentd_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".talentd")
}

/// Returns the default config file path: `~/.talentd/config.toml`
pub fn default_config_path() -> PathBuf {
    default_talentd_dir().join("config.toml")
}

impl TalentdConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            TalentdConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (TALENTD_DB, TALENTD_MODEL, TALENTD_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TALENTD_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("TALENTD_MODEL") {
            self.oracle.model = val;
        }
        if let Ok(val) = std::env::var("TALENTD_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
