//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A dependency the request needs has never become available.
  #[error("service unavailable: {0}")]
  Unavailable(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<cartograph_core::Error> for ApiError {
  fn from(e: cartograph_core::Error) -> Self { ApiError::BadRequest(e.to_string()) }
}

impl From<cartograph_index::Error> for ApiError {
  fn from(e: cartograph_index::Error) -> Self {
    use cartograph_index::Error;
    match e {
      Error::NotLoaded => ApiError::Unavailable(e.to_string()),
      Error::InvalidSnapshot(_) | Error::Json(_) => ApiError::BadRequest(e.to_string()),
      Error::Io { .. } => ApiError::Internal(Box::new(e)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),
      ApiError::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
