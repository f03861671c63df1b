//! Error type for `cartograph-index`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// No snapshot has been loaded since startup.
  #[error("relationship corpus is not loaded")]
  NotLoaded,

  #[error("failed to read snapshot {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid snapshot: {0}")]
  InvalidSnapshot(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
