//! [`RelationshipIndex`]: the in-memory implementation of [`Retriever`].

use std::{cmp::Ordering, collections::BTreeSet, path::Path, sync::Arc};

use cartograph_core::{
  project::project,
  relationship::Relationship,
  retrieve::{CorpusSummary, Retriever, SearchHit, SearchQuery},
  text::excerpt,
};
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{Error, Result, Snapshot};

const MATCHED_TEXT_LIMIT: usize = 200;

// ─── Corpus ──────────────────────────────────────────────────────────────────

/// One loaded snapshot. Immutable once built.
#[derive(Debug)]
struct Corpus {
  relationships: Vec<Arc<Relationship>>,
  summary:       CorpusSummary,
}

impl Corpus {
  fn build(snapshot: Snapshot) -> Self {
    let mut summary = CorpusSummary {
      snapshot_id: Some(Uuid::new_v4()),
      loaded_at: Some(Utc::now()),
      fingerprint: Some(snapshot.fingerprint),
      total_relationships: snapshot.relationships.len(),
      skipped_records: snapshot.skipped,
      enhancement_info: snapshot.enhancement_info,
      ..Default::default()
    };

    for rel in &snapshot.relationships {
      if let Some(source) = rel.source_name() {
        *summary.source_distribution.entry(source.to_owned()).or_default() += 1;
      }
      if !rel.relationship_type.is_empty() {
        *summary
          .relationship_types
          .entry(rel.relationship_type.clone())
          .or_default() += 1;
      }
      summary.confidence_distribution.record(rel.confidence);
    }

    Self {
      relationships: snapshot.relationships.into_iter().map(Arc::new).collect(),
      summary,
    }
  }
}

// ─── Index ───────────────────────────────────────────────────────────────────

/// Holds the current corpus and answers filtered term-overlap searches.
///
/// Starts unloaded; every read before the first [`replace`](Self::replace)
/// returns [`Error::NotLoaded`]. A loaded corpus with zero relationships is
/// valid and simply matches nothing.
#[derive(Debug, Default)]
pub struct RelationshipIndex {
  corpus: RwLock<Option<Arc<Corpus>>>,
}

impl RelationshipIndex {
  pub fn new() -> Self { Self::default() }

  pub fn with_snapshot(snapshot: Snapshot) -> Self {
    Self { corpus: RwLock::new(Some(Arc::new(Corpus::build(snapshot)))) }
  }

  pub async fn is_loaded(&self) -> bool { self.corpus.read().await.is_some() }

  /// Swap in a new corpus. In-flight searches keep reading the corpus they
  /// started with.
  pub async fn replace(&self, snapshot: Snapshot) -> CorpusSummary {
    let corpus = Arc::new(Corpus::build(snapshot));
    let summary = corpus.summary.clone();
    let previous = self.corpus.write().await.replace(corpus);
    info!(
      relationships = summary.total_relationships,
      skipped = summary.skipped_records,
      replaced = previous.is_some(),
      "corpus swapped"
    );
    summary
  }

  /// Read the snapshot at `path` and swap it in. The current corpus stays in
  /// place if the file cannot be read or decoded.
  pub async fn reload_from(&self, path: impl AsRef<Path>) -> Result<CorpusSummary> {
    let snapshot = Snapshot::load(path).await?;
    Ok(self.replace(snapshot).await)
  }

  async fn current(&self) -> Result<Arc<Corpus>> {
    self.corpus.read().await.clone().ok_or(Error::NotLoaded)
  }

  /// Sorted distinct publisher names.
  pub async fn sources(&self) -> Result<Vec<String>> {
    let corpus = self.current().await?;
    Ok(corpus.summary.source_distribution.keys().cloned().collect())
  }

  /// Relationships where either entity contains `name`, case-insensitively.
  pub async fn relationships_for_entity(
    &self,
    name: &str,
  ) -> Result<Vec<Arc<Relationship>>> {
    let corpus = self.current().await?;
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
      return Ok(Vec::new());
    }
    Ok(
      corpus
        .relationships
        .iter()
        .filter(|rel| mentions(rel, &needle))
        .cloned()
        .collect(),
    )
  }

  /// Distinct entity names in the corpus.
  pub async fn entity_count(&self) -> Result<usize> {
    let corpus = self.current().await?;
    let entities: BTreeSet<&str> = corpus
      .relationships
      .iter()
      .flat_map(|rel| rel.entities())
      .collect();
    Ok(entities.len())
  }
}

// ─── Search ──────────────────────────────────────────────────────────────────

fn mentions(rel: &Relationship, needle_lower: &str) -> bool {
  rel.source_entity.to_lowercase().contains(needle_lower)
    || rel.target_entity.to_lowercase().contains(needle_lower)
}

fn lowered(filter: &[String]) -> Vec<String> {
  filter.iter().map(|f| f.to_lowercase()).collect()
}

fn passes_filters(
  rel: &Relationship,
  sources: &[String],
  entities: &[String],
  min_confidence: f64,
) -> bool {
  if !sources.is_empty() {
    let source = rel.source_attribution.source.to_lowercase();
    if !sources.iter().any(|f| source.contains(f.as_str())) {
      return false;
    }
  }
  if !entities.is_empty() && !entities.iter().any(|f| mentions(rel, f)) {
    return false;
  }
  rel.confidence >= min_confidence
}

fn rank(corpus: &Corpus, query: &SearchQuery) -> Vec<SearchHit> {
  let text = query.text.trim().to_lowercase();
  let terms: Vec<&str> = text.split_whitespace().collect();
  if terms.is_empty() || query.k == 0 {
    return Vec::new();
  }

  let sources = lowered(&query.source_filter);
  let entities = lowered(&query.entity_filter);

  let mut hits: Vec<SearchHit> = corpus
    .relationships
    .iter()
    .filter(|rel| passes_filters(rel, &sources, &entities, query.min_confidence))
    .filter_map(|rel| {
      let projected = project(rel).to_lowercase();
      let matches = terms.iter().filter(|t| projected.contains(*t)).count();
      (matches > 0).then(|| SearchHit {
        relationship:    Arc::clone(rel),
        relevance_score: matches as f64 / terms.len() as f64,
        matched_text:    excerpt(&projected, MATCHED_TEXT_LIMIT),
      })
    })
    .collect();

  // Stable sort keeps corpus order among exact ties.
  hits.sort_by(|a, b| {
    b.relevance_score
      .partial_cmp(&a.relevance_score)
      .unwrap_or(Ordering::Equal)
      .then_with(|| {
        b.relationship
          .confidence
          .partial_cmp(&a.relationship.confidence)
          .unwrap_or(Ordering::Equal)
      })
  });
  hits.truncate(query.k);
  hits
}

impl Retriever for RelationshipIndex {
  type Error = Error;

  async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
    let corpus = self.current().await?;
    let hits = rank(&corpus, query);
    debug!(
      query = %query.text,
      k = query.k,
      corpus = corpus.relationships.len(),
      hits = hits.len(),
      "search complete"
    );
    Ok(hits)
  }

  async fn summary(&self) -> Result<CorpusSummary> {
    Ok(self.current().await?.summary.clone())
  }
}
