//! [`Synthesizer`]: the [`NarrativeSynthesizer`] used by the service.

use std::time::Duration;

use cartograph_core::synthesis::{NarrativeSynthesizer, QueryContext};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{SynthesisError, prompt::build_prompt, template::render_template};

const API_VERSION: &str = "2023-06-01";

// ─── Config ──────────────────────────────────────────────────────────────────

fn default_model() -> String { "claude-3-haiku-20240307".to_owned() }
fn default_max_tokens() -> u32 { 2000 }
fn default_temperature() -> f32 { 0.7 }
fn default_top_p() -> f32 { 0.9 }
fn default_timeout_secs() -> u64 { 30 }
fn default_max_context_results() -> usize { 10 }

/// `[synthesizer]` configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesizerConfig {
  /// Messages endpoint URL. Absent selects the offline template variant.
  #[serde(default)]
  pub endpoint:            Option<String>,
  #[serde(default)]
  pub api_key:             Option<String>,
  #[serde(default = "default_model")]
  pub model:               String,
  #[serde(default = "default_max_tokens")]
  pub max_tokens:          u32,
  #[serde(default = "default_temperature")]
  pub temperature:         f32,
  #[serde(default = "default_top_p")]
  pub top_p:               f32,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:        u64,
  /// Hits fed into one prompt.
  #[serde(default = "default_max_context_results")]
  pub max_context_results: usize,
}

impl Default for SynthesizerConfig {
  fn default() -> Self {
    Self {
      endpoint:            None,
      api_key:             None,
      model:               default_model(),
      max_tokens:          default_max_tokens(),
      temperature:         default_temperature(),
      top_p:               default_top_p(),
      timeout_secs:        default_timeout_secs(),
      max_context_results: default_max_context_results(),
    }
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Message<'a> {
  role:    &'static str,
  content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
  model:       &'a str,
  max_tokens:  u32,
  messages:    [Message<'a>; 1],
  #[serde(skip_serializing_if = "Option::is_none")]
  temperature: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  top_p:       Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
  #[serde(default)]
  text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
  #[serde(default)]
  content: Vec<ContentBlock>,
}

// ─── Live backend ────────────────────────────────────────────────────────────

/// HTTP client for a messages-style model endpoint.
#[derive(Debug, Clone)]
pub struct LiveSynthesizer {
  client:      Client,
  endpoint:    String,
  api_key:     Option<String>,
  model:       String,
  max_tokens:  u32,
  temperature: f32,
  top_p:       f32,
}

impl LiveSynthesizer {
  fn new(endpoint: String, config: &SynthesizerConfig) -> Result<Self, SynthesisError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self {
      client,
      endpoint,
      api_key: config.api_key.clone(),
      model: config.model.clone(),
      max_tokens: config.max_tokens,
      temperature: config.temperature,
      top_p: config.top_p,
    })
  }

  async fn send(&self, body: &MessagesRequest<'_>) -> Result<String, SynthesisError> {
    let mut req = self
      .client
      .post(&self.endpoint)
      .header("anthropic-version", API_VERSION)
      .json(body);
    if let Some(key) = &self.api_key {
      req = req.header("x-api-key", key);
    }

    let resp = req.send().await?;
    match resp.status() {
      StatusCode::TOO_MANY_REQUESTS => return Err(SynthesisError::Throttled),
      status if !status.is_success() => {
        let body = resp.text().await.unwrap_or_default();
        return Err(SynthesisError::Status { status: status.as_u16(), body });
      }
      _ => {}
    }

    let parsed: MessagesResponse = resp.json().await?;
    parsed
      .content
      .into_iter()
      .next()
      .and_then(|block| block.text)
      .filter(|text| !text.trim().is_empty())
      .ok_or(SynthesisError::EmptyResponse)
  }

  async fn generate(&self, context: &QueryContext) -> Result<String, SynthesisError> {
    let prompt = build_prompt(context);
    debug!(chars = prompt.len(), hits = context.search_results.len(), "prompt built");
    let body = MessagesRequest {
      model:       &self.model,
      max_tokens:  self.max_tokens,
      messages:    [Message { role: "user", content: &prompt }],
      temperature: Some(self.temperature),
      top_p:       Some(self.top_p),
    };
    let text = self.send(&body).await?;
    info!(chars = text.len(), "narrative generated");
    Ok(text)
  }

  async fn health_check(&self) -> bool {
    let body = MessagesRequest {
      model:       &self.model,
      max_tokens:  10,
      messages:    [Message { role: "user", content: "Hello" }],
      temperature: None,
      top_p:       None,
    };
    match self.send(&body).await {
      Ok(_) => true,
      Err(e) => {
        warn!(error = %e, "synthesizer health check failed");
        false
      }
    }
  }
}

// ─── Synthesizer ─────────────────────────────────────────────────────────────

/// Live model backend or offline template renderer, chosen at construction.
#[derive(Debug, Clone)]
pub enum Synthesizer {
  Live(LiveSynthesizer),
  Template,
}

impl Synthesizer {
  pub fn from_config(config: &SynthesizerConfig) -> Result<Self, SynthesisError> {
    let synthesizer = match config.endpoint.as_deref().map(str::trim) {
      Some(endpoint) if !endpoint.is_empty() => {
        Self::Live(LiveSynthesizer::new(endpoint.to_owned(), config)?)
      }
      _ => Self::Template,
    };
    info!(variant = synthesizer.variant(), model = %config.model, "synthesizer ready");
    Ok(synthesizer)
  }
}

impl NarrativeSynthesizer for Synthesizer {
  type Error = SynthesisError;

  async fn generate(&self, context: &QueryContext) -> Result<String, SynthesisError> {
    match self {
      Self::Live(live) => live.generate(context).await,
      Self::Template => Ok(render_template(context)),
    }
  }

  async fn health_check(&self) -> bool {
    match self {
      Self::Live(live) => live.health_check().await,
      Self::Template => true,
    }
  }

  fn variant(&self) -> &'static str {
    match self {
      Self::Live(_) => "live",
      Self::Template => "template",
    }
  }
}
