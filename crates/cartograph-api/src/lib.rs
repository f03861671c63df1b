//! JSON HTTP API for cartograph.
//!
//! Exposes an axum [`Router`] over a [`RelationshipIndex`] and a
//! [`QueryOrchestrator`] generic over its narrative synthesizer. TLS, auth
//! and request tracing are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = cartograph_api::api_router(state).layer(TraceLayer::new_for_http());
//! ```

pub mod citations;
pub mod corpus;
pub mod embed;
pub mod error;
pub mod extract;
pub mod health;
pub mod metrics;
pub mod query;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use cartograph_citation::CitationFormatter;
use cartograph_core::synthesis::NarrativeSynthesizer;
use cartograph_index::RelationshipIndex;
use cartograph_providers::EmbeddingGateway;
use cartograph_query::QueryOrchestrator;

pub use error::ApiError;
pub use metrics::{MetricsSnapshot, QueryMetrics};

/// The orchestrator type served by the API.
pub type Orchestrator<N> = QueryOrchestrator<RelationshipIndex, N>;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<N> {
  pub index:         Arc<RelationshipIndex>,
  pub orchestrator:  Arc<Orchestrator<N>>,
  pub embedder:      Arc<EmbeddingGateway>,
  pub citations:     CitationFormatter,
  pub metrics:       Arc<QueryMetrics>,
  /// Snapshot re-read by `POST /corpus/reload`.
  pub snapshot_path: Option<Arc<PathBuf>>,
}

impl<N> Clone for AppState<N> {
  fn clone(&self) -> Self {
    Self {
      index:         Arc::clone(&self.index),
      orchestrator:  Arc::clone(&self.orchestrator),
      embedder:      Arc::clone(&self.embedder),
      citations:     self.citations.clone(),
      metrics:       Arc::clone(&self.metrics),
      snapshot_path: self.snapshot_path.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<N>(state: AppState<N>) -> Router<()>
where
  N: NarrativeSynthesizer + 'static,
{
  Router::new()
    // Query pipeline
    .route("/query", post(query::handler::<N>))
    .route("/health", get(health::health::<N>))
    .route("/stats", get(health::stats::<N>))
    // Corpus
    .route("/corpus", axum::routing::put(corpus::replace::<N>))
    .route("/corpus/reload", post(corpus::reload::<N>))
    .route("/sources", get(corpus::sources::<N>))
    .route("/entity/{name}", get(corpus::entity::<N>))
    .route("/data/summary", get(corpus::summary::<N>))
    // Providers
    .route("/embed", post(embed::handler::<N>))
    .route("/citations", post(citations::format::<N>))
    .route("/citations/verify", post(citations::verify::<N>))
    .with_state(state)
}
