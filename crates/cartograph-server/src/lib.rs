//! Service wiring for the cartograph server.
//!
//! [`ServerConfig`] is deserialised from `config.toml` plus `CARTOGRAPH_*`
//! environment variables. [`Services`] owns every long-lived component and
//! hands them to the HTTP router; nothing is held in globals.

pub mod error;

pub use error::{Error, Result};

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use cartograph_api::{AppState, QueryMetrics, api_router};
use cartograph_citation::{CitationConfig, CitationFormatter};
use cartograph_index::RelationshipIndex;
use cartograph_providers::{
  EmbeddingConfig, EmbeddingGateway, Synthesizer, SynthesizerConfig,
};
use cartograph_query::QueryOrchestrator;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_host() -> String { "0.0.0.0".to_owned() }
fn default_port() -> u16 { 8000 }

/// Runtime server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:          String,
  #[serde(default = "default_port")]
  pub port:          u16,
  /// Knowledge-graph snapshot loaded at startup and on reload. Absent starts
  /// the service without a corpus.
  #[serde(default)]
  pub snapshot_path: Option<PathBuf>,
  #[serde(default)]
  pub synthesizer:   SynthesizerConfig,
  #[serde(default)]
  pub embedding:     EmbeddingConfig,
  #[serde(default)]
  pub citations:     CitationConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:          default_host(),
      port:          default_port(),
      snapshot_path: None,
      synthesizer:   SynthesizerConfig::default(),
      embedding:     EmbeddingConfig::default(),
      citations:     CitationConfig::default(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Services ────────────────────────────────────────────────────────────────

/// Every long-lived component of the running service.
pub struct Services {
  pub index:         Arc<RelationshipIndex>,
  pub orchestrator:  Arc<QueryOrchestrator<RelationshipIndex, Synthesizer>>,
  pub embedder:      Arc<EmbeddingGateway>,
  pub citations:     CitationFormatter,
  pub metrics:       Arc<QueryMetrics>,
  pub snapshot_path: Option<Arc<PathBuf>>,
}

impl Services {
  /// Build every component from `config`. A snapshot that fails to load is
  /// logged and the service starts without a corpus.
  pub async fn init(config: &ServerConfig) -> Result<Self> {
    let index = Arc::new(RelationshipIndex::new());
    match &config.snapshot_path {
      Some(path) => match index.reload_from(path).await {
        Ok(summary) => info!(
          path = %path.display(),
          relationships = summary.total_relationships,
          "corpus loaded"
        ),
        Err(e) => warn!(path = %path.display(), error = %e, "starting without corpus"),
      },
      None => warn!("no snapshot_path configured, starting without corpus"),
    }

    let synthesizer = Arc::new(Synthesizer::from_config(&config.synthesizer)?);
    let embedder = Arc::new(EmbeddingGateway::from_config(&config.embedding)?);
    let citations = CitationFormatter::new(&config.citations)?;

    let orchestrator = QueryOrchestrator::new(Arc::clone(&index), synthesizer)
      .with_context_limit(config.synthesizer.max_context_results)
      .with_citation_style(config.citations.style);

    info!("services initialised");
    Ok(Self {
      index,
      orchestrator: Arc::new(orchestrator),
      embedder,
      citations,
      metrics: Arc::new(QueryMetrics::default()),
      snapshot_path: config.snapshot_path.clone().map(Arc::new),
    })
  }

  pub fn app_state(&self) -> AppState<Synthesizer> {
    AppState {
      index:         Arc::clone(&self.index),
      orchestrator:  Arc::clone(&self.orchestrator),
      embedder:      Arc::clone(&self.embedder),
      citations:     self.citations.clone(),
      metrics:       Arc::clone(&self.metrics),
      snapshot_path: self.snapshot_path.clone(),
    }
  }

  /// The API router with request tracing.
  pub fn router(&self) -> Router {
    api_router(self.app_state()).layer(TraceLayer::new_for_http())
  }

  /// Log final counters and release every component.
  pub fn shutdown(self) {
    let metrics = self.metrics.snapshot();
    info!(
      queries = metrics.total_queries,
      fallback = metrics.fallback_queries,
      failed = metrics.failed_queries,
      "shutting down"
    );
  }
}
