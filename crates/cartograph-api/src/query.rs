//! Handler for `POST /query`.

use std::time::Instant;

use axum::{Json, extract::State};
use cartograph_core::{
  request::QueryRequest, response::QueryResponse, synthesis::NarrativeSynthesizer,
};
use tracing::info;

use crate::{AppState, error::ApiError, extract::ApiJson};

/// `POST /query`, body `{"query": "...", "k": 5, "source_filter": [..], "entity_filter": [..]}`
///
/// Responds 400 for invalid input and 503 while no corpus has been loaded.
/// Every other outcome, including synthesis failure, is a 200 whose `mode`
/// names the tier that answered.
pub async fn handler<N>(
  State(state): State<AppState<N>>,
  ApiJson(request): ApiJson<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError>
where
  N: NarrativeSynthesizer + 'static,
{
  let started = Instant::now();

  if !state.index.is_loaded().await {
    state.metrics.record_failure();
    return Err(ApiError::Unavailable("relationship corpus is not loaded".to_owned()));
  }

  let mut response = match state.orchestrator.process_query(request).await {
    Ok(response) => response,
    Err(e) => {
      state.metrics.record_failure();
      return Err(e.into());
    }
  };
  response.query_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
  state.metrics.record(&response);

  info!(
    mode = %response.mode(),
    sources = response.tier.source_count(),
    elapsed_ms = response.query_time_ms,
    "query answered"
  );
  Ok(Json(response))
}
