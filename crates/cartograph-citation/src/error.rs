//! Error type for `cartograph-citation`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build verification client: {0}")]
  Client(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
