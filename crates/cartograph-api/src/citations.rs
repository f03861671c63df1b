//! Handlers for `POST /citations` and `POST /citations/verify`.

use std::collections::BTreeMap;

use axum::{Json, extract::State};
use cartograph_citation::{CitationSource, CitationStyle, FormattedCitation, SourceVerification};
use cartograph_core::{
  request::{DEFAULT_K, MAX_K},
  retrieve::{Retriever, SearchQuery},
  synthesis::NarrativeSynthesizer,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError, extract::ApiJson};

const MAX_VERIFY_URLS: usize = 50;

fn default_k() -> usize { DEFAULT_K }

// ─── Format ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CitationsBody {
  pub query:            String,
  #[serde(default = "default_k")]
  pub k:                usize,
  #[serde(default)]
  pub style:            CitationStyle,
  /// Sources below this attribution completeness are left out.
  #[serde(default)]
  pub min_completeness: f64,
}

#[derive(Debug, Serialize)]
pub struct CitationsResponse {
  pub query:     String,
  pub style:     CitationStyle,
  pub citations: Vec<FormattedCitation>,
  pub total:     usize,
}

/// `POST /citations`, body `{"query": "...", "k": 5, "style": "apa", "min_completeness": 0.0}`
///
/// Searches the corpus, then formats, verifies and deduplicates a citation
/// for every hit.
pub async fn format<N>(
  State(state): State<AppState<N>>,
  ApiJson(body): ApiJson<CitationsBody>,
) -> Result<Json<CitationsResponse>, ApiError>
where
  N: NarrativeSynthesizer + 'static,
{
  let query = body.query.trim();
  if query.is_empty() {
    return Err(ApiError::BadRequest("query cannot be empty".to_owned()));
  }
  if !(1..=MAX_K).contains(&body.k) {
    return Err(ApiError::BadRequest(format!("k must be between 1 and {MAX_K}")));
  }

  let hits = state.index.search(&SearchQuery::new(query, body.k)).await?;
  let sources: Vec<CitationSource> = hits.iter().map(CitationSource::from_hit).collect();
  let citations = state
    .citations
    .format_many(&sources, body.style, body.min_completeness)
    .await;
  Ok(Json(CitationsResponse {
    query: query.to_owned(),
    style: body.style,
    total: citations.len(),
    citations,
  }))
}

// ─── Verify ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
  pub urls: Vec<String>,
}

/// `POST /citations/verify`, body `{"urls": ["https://..."]}`
pub async fn verify<N>(
  State(state): State<AppState<N>>,
  ApiJson(body): ApiJson<VerifyBody>,
) -> Result<Json<BTreeMap<String, SourceVerification>>, ApiError>
where
  N: NarrativeSynthesizer + 'static,
{
  if body.urls.is_empty() {
    return Err(ApiError::BadRequest("urls cannot be empty".to_owned()));
  }
  if body.urls.len() > MAX_VERIFY_URLS {
    return Err(ApiError::BadRequest(format!("at most {MAX_VERIFY_URLS} urls per request")));
  }
  Ok(Json(state.citations.bulk_verify(&body.urls).await))
}
