//! Error types for `cartograph-providers`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SynthesisError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("model throttled the request")]
  Throttled,

  #[error("model returned status {status}: {body}")]
  Status { status: u16, body: String },

  #[error("model response had no text content")]
  EmptyResponse,
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("embedding backend returned status {0}")]
  Status(u16),

  #[error("expected {expected} dimensions, got {got}")]
  Dimension { expected: usize, got: usize },
}
