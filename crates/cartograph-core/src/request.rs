//! Inbound query request and its validation.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_K: usize = 5;
pub const MAX_K: usize = 20;

fn default_k() -> usize { DEFAULT_K }

/// A free-text question with optional narrowing filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
  pub query:         String,
  /// Number of sources shown to the reader, `1..=20`.
  #[serde(default = "default_k")]
  pub k:             usize,
  #[serde(default)]
  pub source_filter: Option<Vec<String>>,
  #[serde(default)]
  pub entity_filter: Option<Vec<String>>,
}

impl QueryRequest {
  pub fn new(query: impl Into<String>) -> Self {
    Self {
      query:         query.into(),
      k:             DEFAULT_K,
      source_filter: None,
      entity_filter: None,
    }
  }

  /// Reject malformed requests before any I/O. On success the query is
  /// trimmed and blank filter entries are dropped.
  pub fn validate(mut self) -> Result<Self> {
    let trimmed = self.query.trim();
    if trimmed.is_empty() {
      return Err(Error::EmptyQuery);
    }
    if !(1..=MAX_K).contains(&self.k) {
      return Err(Error::InvalidK(self.k));
    }
    self.query = trimmed.to_owned();
    self.source_filter = self.source_filter.map(clean_filter);
    self.entity_filter = self.entity_filter.map(clean_filter);
    Ok(self)
  }
}

fn clean_filter(entries: Vec<String>) -> Vec<String> {
  entries
    .into_iter()
    .map(|e| e.trim().to_owned())
    .filter(|e| !e.is_empty())
    .collect()
}
