//! Pipeline stage failures. None of these reach the caller: each one moves
//! the request to a weaker response tier.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("search failed: {0}")]
  Search(#[source] BoxError),

  #[error("synthesis failed: {0}")]
  Synthesis(#[source] BoxError),
}

impl Error {
  pub(crate) fn search(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Search(Box::new(e))
  }

  pub(crate) fn synthesis(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Synthesis(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
