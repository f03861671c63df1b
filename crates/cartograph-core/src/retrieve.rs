//! The `Retriever` trait and supporting search types.
//!
//! The trait is implemented by corpus backends (e.g. `cartograph-index`).
//! The query orchestrator depends on this abstraction, not on any concrete
//! index.

use std::{collections::BTreeMap, future::Future, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::relationship::Relationship;

/// Confidence floor applied by the query pipeline unless the caller says
/// otherwise.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.1;

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`Retriever::search`].
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
  /// Free text; split on whitespace into terms.
  pub text:           String,
  /// Maximum number of hits returned.
  pub k:              usize,
  /// Case-insensitive substrings; a hit's publisher must contain at least one.
  pub source_filter:  Vec<String>,
  /// Case-insensitive substrings; either entity must contain at least one.
  pub entity_filter:  Vec<String>,
  /// Relationships below this confidence are skipped.
  pub min_confidence: f64,
}

impl SearchQuery {
  pub fn new(text: impl Into<String>, k: usize) -> Self {
    Self {
      text: text.into(),
      k,
      source_filter: Vec::new(),
      entity_filter: Vec::new(),
      min_confidence: DEFAULT_MIN_CONFIDENCE,
    }
  }

  pub fn with_source_filter(mut self, sources: Vec<String>) -> Self {
    self.source_filter = sources;
    self
  }

  pub fn with_entity_filter(mut self, entities: Vec<String>) -> Self {
    self.entity_filter = entities;
    self
  }

  pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
    self.min_confidence = min_confidence;
    self
  }
}

// ─── Hits ────────────────────────────────────────────────────────────────────

/// One ranked search result. Lives only for the duration of a single query.
#[derive(Debug, Clone)]
pub struct SearchHit {
  /// Shared with the corpus snapshot the hit came from.
  pub relationship:    Arc<Relationship>,
  /// Fraction of query terms found in the projected text, in `(0, 1]`.
  pub relevance_score: f64,
  /// Lower-cased projection, truncated to 200 characters.
  pub matched_text:    String,
}

impl SearchHit {
  /// Reader-facing passage for this hit.
  pub fn content(&self) -> String { self.relationship.passage() }

  pub fn entities(&self) -> Vec<&str> { self.relationship.entities() }

  pub fn source_name(&self) -> Option<&str> { self.relationship.source_name() }

  pub fn url(&self) -> Option<&str> {
    self.relationship.source_attribution.url()
  }

  pub fn relationship_type(&self) -> Option<&str> {
    let kind = self.relationship.relationship_type.as_str();
    (!kind.is_empty()).then_some(kind)
  }

  pub fn content_type(&self) -> &str {
    self
      .relationship
      .source_attribution
      .publication_type
      .as_deref()
      .unwrap_or("article")
  }
}

// ─── Corpus summary ──────────────────────────────────────────────────────────

/// Counts of relationships per confidence band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceDistribution {
  /// `confidence >= 0.8`
  pub high:   usize,
  /// `0.6 <= confidence < 0.8`
  pub medium: usize,
  pub low:    usize,
}

impl ConfidenceDistribution {
  pub fn record(&mut self, confidence: f64) {
    if confidence >= 0.8 {
      self.high += 1;
    } else if confidence >= 0.6 {
      self.medium += 1;
    } else {
      self.low += 1;
    }
  }
}

/// Corpus-wide statistics for the currently loaded snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusSummary {
  pub snapshot_id:             Option<Uuid>,
  pub loaded_at:               Option<DateTime<Utc>>,
  /// Hex SHA-256 of the snapshot document.
  pub fingerprint:             Option<String>,
  pub total_relationships:     usize,
  /// Records in the snapshot that could not be decoded.
  pub skipped_records:         usize,
  pub source_distribution:     BTreeMap<String, usize>,
  pub confidence_distribution: ConfidenceDistribution,
  pub relationship_types:      BTreeMap<String, usize>,
  pub enhancement_info:        Option<serde_json::Value>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a searchable relationship corpus.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait Retriever: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Filtered, ranked term-overlap search. An empty corpus or a blank query
  /// yields `Ok(vec![])`.
  fn search<'a>(
    &'a self,
    query: &'a SearchQuery,
  ) -> impl Future<Output = Result<Vec<SearchHit>, Self::Error>> + Send + 'a;

  /// Corpus-wide statistics used to frame responses.
  fn summary(
    &self,
  ) -> impl Future<Output = Result<CorpusSummary, Self::Error>> + Send + '_;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn confidence_bands() {
    let mut dist = ConfidenceDistribution::default();
    for c in [0.95, 0.8, 0.79, 0.6, 0.59, 0.0] {
      dist.record(c);
    }
    assert_eq!(dist, ConfidenceDistribution { high: 2, medium: 2, low: 2 });
  }

  #[test]
  fn new_query_uses_pipeline_confidence_floor() {
    let q = SearchQuery::new("dylan", 5);
    assert_eq!(q.min_confidence, DEFAULT_MIN_CONFIDENCE);
    assert!(q.source_filter.is_empty());
  }
}
