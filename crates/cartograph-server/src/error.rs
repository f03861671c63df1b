//! Startup errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("synthesizer setup failed: {0}")]
  Synthesizer(#[from] cartograph_providers::SynthesisError),

  #[error("embedding setup failed: {0}")]
  Embedding(#[from] cartograph_providers::EmbeddingError),

  #[error("citation client setup failed: {0}")]
  Citation(#[from] cartograph_citation::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
