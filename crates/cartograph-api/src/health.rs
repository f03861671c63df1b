//! Handlers for `GET /health` and `GET /stats`.

use std::collections::BTreeMap;

use axum::{Json, extract::State};
use cartograph_core::{retrieve::Retriever, synthesis::NarrativeSynthesizer};
use serde::Serialize;

use crate::{AppState, metrics::MetricsSnapshot};

#[derive(Debug, Serialize)]
pub struct HealthReport {
  /// `healthy` when every dependency is, otherwise `degraded`.
  pub status:     &'static str,
  pub services:   BTreeMap<&'static str, bool>,
  pub last_query: MetricsSnapshot,
}

/// `GET /health`
pub async fn health<N>(State(state): State<AppState<N>>) -> Json<HealthReport>
where
  N: NarrativeSynthesizer + 'static,
{
  let (corpus, synthesizer, embedding) = tokio::join!(
    state.index.is_loaded(),
    state.orchestrator.synthesizer().health_check(),
    state.embedder.health_check(),
  );
  let services = BTreeMap::from([
    ("corpus", corpus),
    ("synthesizer", synthesizer),
    ("embedding", embedding),
  ]);
  let status = if services.values().all(|ok| *ok) { "healthy" } else { "degraded" };
  Json(HealthReport { status, services, last_query: state.metrics.snapshot() })
}

#[derive(Debug, Serialize)]
pub struct Providers {
  pub synthesizer: &'static str,
  pub embedding:   &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatsReport {
  #[serde(flatten)]
  pub queries:             MetricsSnapshot,
  pub providers:           Providers,
  /// `None` while no corpus is loaded.
  pub total_relationships: Option<usize>,
}

/// `GET /stats`
pub async fn stats<N>(State(state): State<AppState<N>>) -> Json<StatsReport>
where
  N: NarrativeSynthesizer + 'static,
{
  let total_relationships = state.index.summary().await.ok().map(|s| s.total_relationships);
  Json(StatsReport {
    queries: state.metrics.snapshot(),
    providers: Providers {
      synthesizer: state.orchestrator.synthesizer().variant(),
      embedding:   state.embedder.variant(),
    },
    total_relationships,
  })
}
