//! The query pipeline: search, build context, synthesize, attribute, and pick
//! a response tier.
//!
//! Every failure after validation degrades the response instead of surfacing:
//! a synthesis or search error moves the request to a fallback built from a
//! fresh search, and a fallback that cannot search yields an empty response.
//! The language model is never called when nothing matched.

use std::{collections::BTreeMap, collections::HashSet, sync::Arc};

use cartograph_citation::CitationStyle;
use cartograph_core::{
  attribution::SourceAttribution,
  request::QueryRequest,
  response::{QueryResponse, QueryStats, ResponseTier},
  retrieve::{DEFAULT_MIN_CONFIDENCE, Retriever, SearchHit, SearchQuery},
  synthesis::{NarrativeSynthesizer, QueryContext},
};
use tracing::{debug, error, info, warn};

use crate::{
  Error, Result,
  extract::{AttributionExtractor, is_citation_ready, is_verifiable, score},
  pathways::{self, EMPTY_PATHWAYS},
  reply::{empty_text, fallback_text},
};

/// Lower bound on hits fetched for synthesis, whatever the caller asked for.
pub const MIN_SEARCH_RESULTS: usize = 10;
/// Hits fed to the synthesizer unless configured otherwise.
pub const DEFAULT_CONTEXT_LIMIT: usize = 10;
/// Attribution quality above which the enhanced tier is used.
pub const ENHANCED_THRESHOLD: f64 = 0.3;

const FALLBACK_REASON: &str = "Cultural Cartographer temporarily unavailable";

pub struct QueryOrchestrator<R, N> {
  retriever:      Arc<R>,
  synthesizer:    Arc<N>,
  extractor:      AttributionExtractor,
  context_limit:  usize,
  min_confidence: f64,
}

impl<R, N> QueryOrchestrator<R, N>
where
  R: Retriever,
  N: NarrativeSynthesizer,
{
  pub fn new(retriever: Arc<R>, synthesizer: Arc<N>) -> Self {
    Self {
      retriever,
      synthesizer,
      extractor: AttributionExtractor::default(),
      context_limit: DEFAULT_CONTEXT_LIMIT,
      min_confidence: DEFAULT_MIN_CONFIDENCE,
    }
  }

  /// Cap on the number of hits placed in the synthesis context.
  pub fn with_context_limit(mut self, limit: usize) -> Self {
    self.context_limit = limit.max(1);
    self
  }

  /// Render derived citations in `style` instead of the plain form.
  pub fn with_citation_style(mut self, style: Option<CitationStyle>) -> Self {
    self.extractor = AttributionExtractor::new(style);
    self
  }

  pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
    self.min_confidence = min_confidence;
    self
  }

  pub fn retriever(&self) -> &Arc<R> { &self.retriever }

  pub fn synthesizer(&self) -> &Arc<N> { &self.synthesizer }

  /// Answer `request`. Only validation errors are returned; every other
  /// failure is absorbed into a fallback or empty response.
  pub async fn process_query(
    &self,
    request: QueryRequest,
  ) -> cartograph_core::Result<QueryResponse> {
    let request = request.validate()?;
    info!(query = %request.query, k = request.k, "processing query");

    match self.run(&request).await {
      Ok(response) => Ok(response),
      Err(e) => {
        warn!(query = %request.query, error = %e, "pipeline failed, falling back");
        Ok(self.fallback_response(&request).await)
      }
    }
  }

  /// Search results presented directly, without synthesis. Runs its own
  /// search for the requested `k`.
  pub async fn fallback_response(&self, request: &QueryRequest) -> QueryResponse {
    info!(query = %request.query, "building fallback response");
    let hits = match self.retriever.search(&self.search_query(request, request.k)).await {
      Ok(hits) => hits,
      Err(e) => {
        error!(query = %request.query, error = %e, "fallback search failed");
        let (total, _) = self.corpus_scale().await;
        return empty_response(&request.query, total);
      }
    };
    if hits.is_empty() {
      let (total, _) = self.corpus_scale().await;
      return empty_response(&request.query, total);
    }

    let sources = self.extractor.basic(&hits);
    QueryResponse {
      response:           fallback_text(&request.query, &hits),
      query_time_ms:      0,
      discovery_pathways: None,
      stats:              QueryStats {
        search_results_count: hits.len(),
        sources_count: distinct_sources(&sources),
        reason: Some(FALLBACK_REASON.to_owned()),
        ..Default::default()
      },
      tier:               ResponseTier::Fallback { sources },
    }
  }

  fn search_query(&self, request: &QueryRequest, k: usize) -> SearchQuery {
    SearchQuery::new(request.query.clone(), k)
      .with_source_filter(request.source_filter.clone().unwrap_or_default())
      .with_entity_filter(request.entity_filter.clone().unwrap_or_default())
      .with_min_confidence(self.min_confidence)
  }

  /// Corpus size and source distribution; zero and empty when unavailable.
  async fn corpus_scale(&self) -> (usize, BTreeMap<String, usize>) {
    match self.retriever.summary().await {
      Ok(summary) => (summary.total_relationships, summary.source_distribution),
      Err(e) => {
        debug!(error = %e, "corpus summary unavailable");
        (0, BTreeMap::new())
      }
    }
  }

  async fn run(&self, request: &QueryRequest) -> Result<QueryResponse> {
    let search_k = request.k.max(MIN_SEARCH_RESULTS);
    let hits = self
      .retriever
      .search(&self.search_query(request, search_k))
      .await
      .map_err(Error::search)?;
    info!(hits = hits.len(), k = search_k, "search returned");

    let (total_relationships, source_distribution) = self.corpus_scale().await;
    if hits.is_empty() {
      info!(query = %request.query, "no matches, returning empty response");
      return Ok(empty_response(&request.query, total_relationships));
    }

    let context = QueryContext {
      query: request.query.clone(),
      search_results: hits.iter().take(self.context_limit).cloned().collect(),
      total_relationships,
      source_distribution,
    };
    let narrative = self
      .synthesizer
      .generate(&context)
      .await
      .map_err(Error::synthesis)?;

    let shown = top(&hits, request.k);
    let attributions = self.extractor.enhanced(shown);
    let quality = score(&attributions);
    info!(
      quality = quality.attribution_quality,
      attributions = attributions.len(),
      "attribution quality scored"
    );

    if quality.attribution_quality > ENHANCED_THRESHOLD {
      let mut discovery = pathways::enhanced(&attributions);
      if discovery.is_empty() {
        discovery = pathways::basic(&hits);
      }
      let stats = QueryStats {
        search_results_count:     hits.len(),
        sources_count:            attributions.len(),
        total_relationships:      Some(total_relationships),
        average_confidence:       Some(mean(attributions.iter().map(|a| a.confidence))),
        attribution_completeness: Some(quality.attribution_quality),
        citation_ready_sources:   Some(attributions.iter().filter(|a| is_citation_ready(a)).count()),
        verified_sources:         Some(attributions.iter().filter(|a| is_verifiable(a)).count()),
        reason:                   None,
      };
      return Ok(QueryResponse {
        response: narrative,
        query_time_ms: 0,
        discovery_pathways: Some(discovery),
        stats,
        tier: ResponseTier::Enhanced { sources: attributions, quality },
      });
    }

    let sources = self.extractor.basic(shown);
    let stats = QueryStats {
      search_results_count: hits.len(),
      sources_count: distinct_sources(&sources),
      total_relationships: Some(total_relationships),
      average_confidence: Some(mean(hits.iter().map(|h| h.relevance_score))),
      ..Default::default()
    };
    Ok(QueryResponse {
      response: narrative,
      query_time_ms: 0,
      discovery_pathways: Some(pathways::basic(&hits)),
      stats,
      tier: ResponseTier::Full { sources },
    })
  }
}

fn empty_response(query: &str, total_relationships: usize) -> QueryResponse {
  QueryResponse {
    response:           empty_text(query, total_relationships),
    query_time_ms:      0,
    discovery_pathways: Some(EMPTY_PATHWAYS.iter().map(|p| (*p).to_owned()).collect()),
    stats:              QueryStats {
      total_relationships: Some(total_relationships),
      ..Default::default()
    },
    tier:               ResponseTier::empty(),
  }
}

fn distinct_sources(sources: &[SourceAttribution]) -> usize {
  sources.iter().map(|s| s.source.as_str()).collect::<HashSet<_>>().len()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
  let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
  if n == 0 { 0.0 } else { sum / n as f64 }
}

/// The first `k` hits in rank order.
fn top(hits: &[SearchHit], k: usize) -> &[SearchHit] { &hits[..hits.len().min(k)] }
