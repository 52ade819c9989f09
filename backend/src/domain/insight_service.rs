//! Narrative insights from an external generative-text service.
//!
//! The service is best-effort. [`InsightService::summarize`] never fails:
//! a missing API key, an HTTP error, a timeout or an empty reply all degrade to
//! a static message built from the same metrics.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;
use shared::{InsightResponse, JourneyMetrics};
use std::sync::Arc;
use std::time::Duration;

use crate::config::InsightConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Anything that can turn journey metrics into a short narrative
#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn summarize(&self, metrics: &JourneyMetrics) -> Result<String>;
}

/// Prompt sent to the text model
pub fn build_prompt(metrics: &JourneyMetrics) -> String {
    format!(
        "You are a financial coach for a ride-hailing driver. In at most three short \
         sentences, comment on this shift and give one practical tip.\n\
         Gross earnings: {:.2}\n\
         Expenses: {:.2}\n\
         Net profit: {:.2}\n\
         Distance driven: {:.1} km\n\
         Hours worked: {:.1}\n\
         Platforms used: {}",
        metrics.gross,
        metrics.expenses,
        metrics.net,
        metrics.km_travelled,
        metrics.worked_hours,
        metrics.ride_count
    )
}

/// Static text used whenever the external service cannot answer
pub fn fallback_message(metrics: &JourneyMetrics) -> String {
    let mut message = if metrics.net > 0.0 {
        format!("Net profit of {:.2} this shift.", metrics.net)
    } else {
        format!("This shift closed at {:.2}; expenses outweighed earnings.", metrics.net)
    };
    if metrics.worked_hours > 0.0 {
        message.push_str(&format!(
            " That is {:.2} per hour worked.",
            metrics.net / metrics.worked_hours
        ));
    }
    if metrics.km_travelled > 0.0 {
        message.push_str(&format!(
            " Gross per km: {:.2}.",
            metrics.gross / metrics.km_travelled
        ));
    }
    message
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Deserialize)]
struct ContentPart {
    text: Option<String>,
}

/// Provider talking to the Gemini `generateContent` REST endpoint
pub struct GeminiInsightProvider {
    http: HttpClient,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiInsightProvider {
    pub fn new(api_key: String, config: &InsightConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl InsightProvider for GeminiInsightProvider {
    async fn summarize(&self, metrics: &JourneyMetrics) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(metrics) }] }]
        });

        // The key travels in a header and URLs are stripped from errors, so
        // failures can be logged without exposing it.
        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Insight request failed")?
            .error_for_status()
            .map_err(reqwest::Error::without_url)
            .context("Insight service returned an error status")?;

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Insight response was not valid JSON")?;

        let text: String = parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(text)
    }
}

/// Best-effort insight generation with a static fallback
#[derive(Clone)]
pub struct InsightService {
    provider: Option<Arc<dyn InsightProvider>>,
}

impl InsightService {
    pub fn new(provider: Option<Arc<dyn InsightProvider>>) -> Self {
        Self { provider }
    }

    /// Build the service from configuration; without an API key it only falls back
    pub fn from_config(config: &InsightConfig) -> Self {
        let provider = match &config.api_key {
            Some(key) if !key.trim().is_empty() => match GeminiInsightProvider::new(key.clone(), config) {
                Ok(provider) => Some(Arc::new(provider) as Arc<dyn InsightProvider>),
                Err(e) => {
                    warn!("Insight provider disabled: {:#}", e);
                    None
                }
            },
            _ => {
                debug!("No insight API key configured; using fallback messages");
                None
            }
        };
        Self::new(provider)
    }

    pub async fn summarize(&self, metrics: &JourneyMetrics) -> InsightResponse {
        let Some(provider) = &self.provider else {
            return InsightResponse {
                text: fallback_message(metrics),
                fallback: true,
            };
        };

        match provider.summarize(metrics).await {
            Ok(text) if !text.trim().is_empty() => InsightResponse {
                text: text.trim().to_string(),
                fallback: false,
            },
            Ok(_) => {
                warn!("Insight service returned an empty reply");
                InsightResponse {
                    text: fallback_message(metrics),
                    fallback: true,
                }
            }
            Err(e) => {
                warn!("Insight generation failed: {:#}", e);
                InsightResponse {
                    text: fallback_message(metrics),
                    fallback: true,
                }
            }
        }
    }
}
