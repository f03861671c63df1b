//! The `NarrativeSynthesizer` capability and its per-request context.

use std::{collections::BTreeMap, future::Future};

use crate::retrieve::SearchHit;

/// Everything a synthesizer sees for one request. Built once per query.
#[derive(Debug, Clone)]
pub struct QueryContext {
  pub query:               String,
  /// Ranked hits; never empty when synthesis is attempted.
  pub search_results:      Vec<SearchHit>,
  /// Corpus-wide relationship count, for scale framing.
  pub total_relationships: usize,
  pub source_distribution: BTreeMap<String, usize>,
}

impl QueryContext {
  /// Distinct source names, most represented first.
  pub fn top_sources(&self, limit: usize) -> Vec<&str> {
    let mut sources: Vec<(&str, usize)> = self
      .source_distribution
      .iter()
      .map(|(name, count)| (name.as_str(), *count))
      .collect();
    sources.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    sources.into_iter().take(limit).map(|(name, _)| name).collect()
  }
}

/// Turns ranked evidence into prose.
///
/// Implementations are either a live model backend or an offline template
/// renderer. Callers treat every error the same way: the request degrades
/// to a fallback response.
pub trait NarrativeSynthesizer: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn generate<'a>(
    &'a self,
    context: &'a QueryContext,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  /// `true` when the backend can currently serve `generate`.
  fn health_check(&self) -> impl Future<Output = bool> + Send + '_;

  /// Short label of the active variant, e.g. `"live"` or `"template"`.
  fn variant(&self) -> &'static str;
}
