//! Request body extraction with API-shaped rejections.

use axum::extract::{FromRequest, rejection::JsonRejection};

use crate::error::ApiError;

/// `axum::Json` whose rejections render as `400 {"error": ...}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}
