//! OpenRouter chat-completions client.
//!
//! Speaks the OpenAI-compatible `/chat/completions` protocol, so any
//! compatible endpoint works. The model is asked for strict JSON but is
//! not trusted to deliver it: responses are unwrapped from markdown code
//! fences, 0–100 confidence scales are normalized to `[0, 1]`, and skills
//! given as bare name strings inherit the classification's confidence.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::OracleConfig;
use crate::error::{Error, Result};
use crate::oracle::Oracle;
use crate::store::types::{Classification, SkillClaim};

pub struct OpenRouterOracle {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    system_context: String,
    prompt_template: String,
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl OpenRouterOracle {
    pub fn new(config: &OracleConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            Error::Enrichment(format!(
                "oracle API key not found; set the {} environment variable",
                config.api_key_env
            ))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Enrichment(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            system_context: config.system_context.clone(),
            prompt_template: config.prompt_template.clone(),
            max_retries: config.max_retries.max(1),
        })
    }

    async fn call_api(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/chat/completions", self.endpoint);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.clone(),
                    content: m.content.clone(),
                })
                .collect(),
        };

        let mut last_error = String::new();
        for attempt in 1..=self.max_retries {
            let response = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&request)
                .send()
                .await;

            match response {
                Ok(response) if response.status().is_success() => {
                    let body: ChatResponse = response.json().await.map_err(|e| {
                        Error::Enrichment(format!("failed to parse oracle response: {e}"))
                    })?;
                    let content = body
                        .choices
                        .into_iter()
                        .next()
                        .map(|c| c.message.content)
                        .ok_or_else(|| {
                            Error::Enrichment("oracle returned no choices".to_string())
                        })?;
                    return Ok(content.trim().to_string());
                }
                Ok(response) if response.status().as_u16() == 429 => {
                    let wait = Duration::from_secs(u64::from(attempt) * 2);
                    warn!(attempt, wait_secs = wait.as_secs(), "oracle rate limited, backing off");
                    tokio::time::sleep(wait).await;
                    last_error = "rate limited".to_string();
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    last_error = format!("HTTP {status}: {body}");
                    warn!(attempt, %status, "oracle API error");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
                Err(e) => {
                    last_error = e.to_string();
                    warn!(attempt, error = %last_error, "oracle request failed");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }

        Err(Error::Enrichment(format!(
            "oracle call failed after {} attempts: {last_error}",
            self.max_retries
        )))
    }
}

#[async_trait::async_trait]
impl Oracle for OpenRouterOracle {
    async fn classify(&self, bio: &str) -> Result<Classification> {
        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: self.system_context.clone(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: self.prompt_template.replace("{bio}", bio),
            },
        ];

        let raw = self.call_api(&messages).await?;
        let classification = parse_classification(&raw)?;
        debug!(
            persona = %classification.persona_type,
            confidence = classification.confidence_score,
            skills = classification.skills.len(),
            "oracle classification parsed"
        );
        Ok(classification)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Lenient mirror of the strict output contract. `persona` is the key the
/// earliest prompt versions used; skills may be bare name strings.
#[derive(Deserialize)]
struct RawClassification {
    #[serde(alias = "persona")]
    persona_type: Option<String>,
    #[serde(default)]
    confidence_score: f64,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    skills: Vec<RawSkill>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSkill {
    Detailed {
        skill_name: String,
        #[serde(default)]
        category: Option<String>,
        #[serde(default)]
        confidence: Option<f64>,
    },
    Name(String),
}

/// Parse a model response into a [`Classification`].
pub fn parse_classification(raw: &str) -> Result<Classification> {
    let json_text = extract_json(raw);
    let parsed: RawClassification = serde_json::from_str(json_text)
        .map_err(|e| Error::Enrichment(format!("unparseable oracle output: {e}")))?;

    let confidence_score = normalize_score(parsed.confidence_score);
    let skills = parsed
        .skills
        .into_iter()
        .map(|skill| match skill {
            RawSkill::Detailed {
                skill_name,
                category,
                confidence,
            } => SkillClaim {
                skill_name,
                category,
                confidence: confidence.map(normalize_score).unwrap_or(confidence_score),
            },
            RawSkill::Name(skill_name) => SkillClaim {
                skill_name,
                category: None,
                confidence: confidence_score,
            },
        })
        .collect();

    Ok(Classification {
        persona_type: parsed.persona_type.unwrap_or_else(|| "Unknown".to_string()),
        confidence_score,
        reasoning: parsed.reasoning,
        skills,
    })
}

/// Models are asked for a 0–100 integer; tolerate either scale.
fn normalize_score(value: f64) -> f64 {
    if value > 1.0 {
        value / 100.0
    } else {
        value
    }
}

/// Unwrap a JSON payload from surrounding markdown code fences, if any.
fn extract_json(raw: &str) -> &str {
    if let Some(start) = raw.find("```json") {
        let rest = &raw[start + 7..];
        match rest.find("```") {
            Some(end) => rest[..end].trim(),
            None => rest.trim(),
        }
    } else if let Some(start) = raw.find("```") {
        let rest = &raw[start + 3..];
        match rest.find("```") {
            Some(end) => rest[..end].trim(),
            None => rest.trim(),
        }
    } else {
        raw.trim()
    }
}
