//! Error types for `cartograph-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("query cannot be empty")]
  EmptyQuery,

  #[error("k must be between 1 and 20, got {0}")]
  InvalidK(usize),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
