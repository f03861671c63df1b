//! Handler for `POST /embed`.

use axum::{Json, extract::State};
use cartograph_core::synthesis::NarrativeSynthesizer;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError, extract::ApiJson};

const MAX_TEXTS: usize = 100;

fn default_normalize() -> bool { true }

#[derive(Debug, Deserialize)]
pub struct EmbedBody {
  pub texts:     Vec<String>,
  #[serde(default = "default_normalize")]
  pub normalize: bool,
}

#[derive(Debug, Serialize)]
pub struct EmbedResponse {
  pub embeddings: Vec<Vec<f32>>,
  /// Variant that produced the vectors, `live` or `offline`.
  pub provider:   &'static str,
  pub model:      String,
  pub dimension:  usize,
}

/// `POST /embed`, body `{"texts": ["..."], "normalize": true}`
pub async fn handler<N>(
  State(state): State<AppState<N>>,
  ApiJson(body): ApiJson<EmbedBody>,
) -> Result<Json<EmbedResponse>, ApiError>
where
  N: NarrativeSynthesizer + 'static,
{
  if body.texts.is_empty() {
    return Err(ApiError::BadRequest("texts cannot be empty".to_owned()));
  }
  if body.texts.len() > MAX_TEXTS {
    return Err(ApiError::BadRequest(format!("at most {MAX_TEXTS} texts per request")));
  }
  let embeddings = state.embedder.embed(&body.texts, body.normalize).await;
  Ok(Json(EmbedResponse {
    embeddings: embeddings.vectors,
    provider:   embeddings.provider,
    model:      embeddings.model,
    dimension:  state.embedder.dimension(),
  }))
}
