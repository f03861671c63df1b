//! Text embeddings with a deterministic offline fallback.
//!
//! The offline variant seeds a PRNG from the SHA-256 of the text and draws a
//! standard-normal vector, so equal texts always embed identically. The live
//! variant falls back to the same vectors when a call fails.

use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::EmbeddingError;

/// Longest input the live model accepts, in characters.
const MAX_INPUT_CHARS: usize = 8192;

fn default_model() -> String { "amazon.titan-embed-text-v2:0".to_owned() }
fn default_dimension() -> usize { 1024 }
fn default_timeout_secs() -> u64 { 30 }

/// `[embedding]` configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
  /// Absent selects the offline variant.
  #[serde(default)]
  pub endpoint:     Option<String>,
  #[serde(default)]
  pub api_key:      Option<String>,
  #[serde(default = "default_model")]
  pub model:        String,
  #[serde(default = "default_dimension")]
  pub dimension:    usize,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
  fn default() -> Self {
    Self {
      endpoint:     None,
      api_key:      None,
      model:        default_model(),
      dimension:    default_dimension(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

/// Vectors plus the variant that actually produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embeddings {
  pub vectors:  Vec<Vec<f32>>,
  pub provider: &'static str,
  pub model:    String,
}

// ─── Offline ─────────────────────────────────────────────────────────────────

fn seed_for(text: &str) -> u64 {
  let digest = Sha256::digest(text.as_bytes());
  let mut seed = [0u8; 8];
  seed.copy_from_slice(&digest[..8]);
  u64::from_le_bytes(seed)
}

fn offline_vector(text: &str, dimension: usize, normalize: bool) -> Vec<f32> {
  let mut rng = StdRng::seed_from_u64(seed_for(text));
  let mut vector: Vec<f32> =
    (0..dimension).map(|_| rng.sample::<f32, _>(StandardNormal)).collect();
  if normalize {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
      vector.iter_mut().for_each(|v| *v /= norm);
    }
  }
  vector
}

// ─── Live ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest<'a> {
  input_text: &'a str,
  dimensions: usize,
  normalize:  bool,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
  embedding: Vec<f32>,
}

#[derive(Debug, Clone)]
struct LiveEmbedder {
  client:   Client,
  endpoint: String,
  api_key:  Option<String>,
}

impl LiveEmbedder {
  async fn embed_one(
    &self,
    text: &str,
    dimension: usize,
    normalize: bool,
  ) -> Result<Vec<f32>, EmbeddingError> {
    let input = match text.char_indices().nth(MAX_INPUT_CHARS) {
      Some((idx, _)) => &text[..idx],
      None => text,
    };
    let mut req = self.client.post(&self.endpoint).json(&EmbedRequest {
      input_text: input,
      dimensions: dimension,
      normalize,
    });
    if let Some(key) = &self.api_key {
      req = req.bearer_auth(key);
    }
    let resp = req.send().await?;
    if !resp.status().is_success() {
      return Err(EmbeddingError::Status(resp.status().as_u16()));
    }
    let parsed: EmbedResponse = resp.json().await?;
    if parsed.embedding.len() != dimension {
      return Err(EmbeddingError::Dimension {
        expected: dimension,
        got:      parsed.embedding.len(),
      });
    }
    Ok(parsed.embedding)
  }
}

// ─── Gateway ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Backend {
  Live(LiveEmbedder),
  Offline,
}

/// Text → vector gateway. Never fails: a live failure degrades the whole
/// batch to offline vectors.
#[derive(Debug, Clone)]
pub struct EmbeddingGateway {
  backend:   Backend,
  model:     String,
  dimension: usize,
}

impl EmbeddingGateway {
  pub fn from_config(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
    let backend = match config.endpoint.as_deref().map(str::trim) {
      Some(endpoint) if !endpoint.is_empty() => {
        let client = Client::builder()
          .timeout(Duration::from_secs(config.timeout_secs))
          .build()?;
        Backend::Live(LiveEmbedder {
          client,
          endpoint: endpoint.to_owned(),
          api_key: config.api_key.clone(),
        })
      }
      _ => Backend::Offline,
    };
    let gateway = Self {
      backend,
      model: config.model.clone(),
      dimension: config.dimension,
    };
    info!(variant = gateway.variant(), dimension = gateway.dimension, "embedder ready");
    Ok(gateway)
  }

  pub fn offline(dimension: usize) -> Self {
    Self { backend: Backend::Offline, model: "offline".to_owned(), dimension }
  }

  pub fn variant(&self) -> &'static str {
    match self.backend {
      Backend::Live(_) => "live",
      Backend::Offline => "offline",
    }
  }

  pub fn dimension(&self) -> usize { self.dimension }

  fn offline_batch(&self, texts: &[String], normalize: bool) -> Embeddings {
    Embeddings {
      vectors:  texts
        .iter()
        .map(|t| offline_vector(t, self.dimension, normalize))
        .collect(),
      provider: "offline",
      model:    "offline".to_owned(),
    }
  }

  pub async fn embed(&self, texts: &[String], normalize: bool) -> Embeddings {
    let Backend::Live(live) = &self.backend else {
      return self.offline_batch(texts, normalize);
    };

    let mut vectors = Vec::with_capacity(texts.len());
    for text in texts {
      match live.embed_one(text, self.dimension, normalize).await {
        Ok(vector) => vectors.push(vector),
        Err(e) => {
          warn!(error = %e, texts = texts.len(), "live embedding failed, using offline vectors");
          return self.offline_batch(texts, normalize);
        }
      }
    }
    Embeddings { vectors, provider: "live", model: self.model.clone() }
  }

  /// Probe the live backend with a short text. Offline is always healthy.
  pub async fn health_check(&self) -> bool {
    match &self.backend {
      Backend::Offline => true,
      Backend::Live(live) => match live.embed_one("health check", self.dimension, true).await {
        Ok(_) => true,
        Err(e) => {
          warn!(error = %e, "embedding health check failed");
          false
        }
      },
    }
  }
}
