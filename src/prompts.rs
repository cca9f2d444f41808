//! Supplementary prompt sources.
//!
//! When a round starts, the submitted prompt pool is padded with prompts
//! from a supplementary source. The source is pluggable: an HTTP backend
//! when `PROMPT_ENDPOINT` is configured, a built-in list otherwise. A
//! failed or hung fetch fails open — the round proceeds with whatever the
//! players submitted.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Hard cap on how long round start waits for the supplementary fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(3);

/// Prompts used when no external source is configured.
const BUILTIN_PROMPTS: &[&str] = &[
    "What is your favorite childhood memory?",
    "Describe a place you would love to visit.",
    "What invention would make your life easier?",
    "If you could have dinner with anyone, who would it be?",
    "What is your biggest fear and why?",
    "Share a unique talent you possess.",
];

pub type SourceResult<T> = Result<T, SourceError>;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("prompt request failed: {0}")]
    Request(String),

    #[error("prompt response parsing failed: {0}")]
    Parse(String),
}

/// A source of extra prompts to pad the round pool.
#[async_trait]
pub trait SupplementarySource: Send + Sync {
    async fn fetch_prompts(&self) -> SourceResult<Vec<String>>;
}

/// Static source backed by the built-in list. Never fails.
#[derive(Debug, Default)]
pub struct BuiltinSource;

#[async_trait]
impl SupplementarySource for BuiltinSource {
    async fn fetch_prompts(&self) -> SourceResult<Vec<String>> {
        Ok(BUILTIN_PROMPTS.iter().map(|s| s.to_string()).collect())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ApiPrompt {
    #[serde(rename = "promptText")]
    prompt_text: String,
}

/// HTTP source: `GET {endpoint}/prompt/suggest` returning
/// `[{"promptText": "..."}]`.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSource {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SupplementarySource for HttpSource {
    async fn fetch_prompts(&self) -> SourceResult<Vec<String>> {
        let url = format!("{}/prompt/suggest", self.endpoint);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;

        let prompts: Vec<ApiPrompt> = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(prompts.into_iter().map(|p| p.prompt_text).collect())
    }
}

/// Pick the source from the environment: HTTP when `PROMPT_ENDPOINT` is
/// set, the built-in list otherwise.
pub fn source_from_env() -> Box<dyn SupplementarySource> {
    match std::env::var("PROMPT_ENDPOINT") {
        Ok(endpoint) if !endpoint.trim().is_empty() => {
            tracing::info!("Supplementary prompts from {}", endpoint);
            Box::new(HttpSource::new(endpoint))
        }
        _ => {
            tracing::info!("Supplementary prompts from built-in list");
            Box::new(BuiltinSource)
        }
    }
}
