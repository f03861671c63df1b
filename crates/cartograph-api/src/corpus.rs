//! Handlers for the loaded relationship corpus.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/corpus/reload` | Re-reads the configured snapshot file |
//! | `PUT`  | `/corpus` | Body is a full snapshot document |
//! | `GET`  | `/sources` | Sorted distinct publishers |
//! | `GET`  | `/entity/{name}` | 404 when nothing mentions `name` |
//! | `GET`  | `/data/summary` | Corpus statistics |

use axum::{
  Json,
  extract::{Path, State},
};
use cartograph_core::{
  relationship::Relationship,
  retrieve::{CorpusSummary, Retriever},
  synthesis::NarrativeSynthesizer,
};
use cartograph_index::Snapshot;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::{AppState, error::ApiError, extract::ApiJson};

// ─── Reload / replace ────────────────────────────────────────────────────────

/// `POST /corpus/reload`
pub async fn reload<N>(State(state): State<AppState<N>>) -> Result<Json<CorpusSummary>, ApiError>
where
  N: NarrativeSynthesizer + 'static,
{
  let path = state
    .snapshot_path
    .as_deref()
    .ok_or_else(|| ApiError::BadRequest("no snapshot path configured".to_owned()))?;
  info!(path = %path.display(), "reloading corpus");
  let summary = state.index.reload_from(path).await?;
  Ok(Json(summary))
}

/// `PUT /corpus`, body `{"relationships": [..], "enhancement_info": {..}}`
pub async fn replace<N>(
  State(state): State<AppState<N>>,
  ApiJson(document): ApiJson<Value>,
) -> Result<Json<CorpusSummary>, ApiError>
where
  N: NarrativeSynthesizer + 'static,
{
  let snapshot = Snapshot::from_value(document)?;
  Ok(Json(state.index.replace(snapshot).await))
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SourcesResponse {
  pub sources: Vec<String>,
  pub total:   usize,
}

/// `GET /sources`
pub async fn sources<N>(State(state): State<AppState<N>>) -> Result<Json<SourcesResponse>, ApiError>
where
  N: NarrativeSynthesizer + 'static,
{
  let sources = state.index.sources().await?;
  Ok(Json(SourcesResponse { total: sources.len(), sources }))
}

#[derive(Debug, Serialize)]
pub struct EntityResponse {
  pub entity:        String,
  pub relationships: Vec<Relationship>,
  pub total:         usize,
}

/// `GET /entity/{name}`
pub async fn entity<N>(
  State(state): State<AppState<N>>,
  Path(name): Path<String>,
) -> Result<Json<EntityResponse>, ApiError>
where
  N: NarrativeSynthesizer + 'static,
{
  let relationships: Vec<Relationship> = state
    .index
    .relationships_for_entity(&name)
    .await?
    .iter()
    .map(|rel| Relationship::clone(rel))
    .collect();
  if relationships.is_empty() {
    return Err(ApiError::NotFound(format!("no relationships mention {name}")));
  }
  Ok(Json(EntityResponse { total: relationships.len(), entity: name, relationships }))
}

/// `GET /data/summary`
pub async fn summary<N>(State(state): State<AppState<N>>) -> Result<Json<CorpusSummary>, ApiError>
where
  N: NarrativeSynthesizer + 'static,
{
  Ok(Json(state.index.summary().await?))
}
