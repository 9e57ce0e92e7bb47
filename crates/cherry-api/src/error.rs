//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use cherry_core::{StatusClass, identity::EntityKind};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Domain(#[from] cherry_core::Error),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Domain(e) => match e.status() {
        StatusClass::BadRequest => StatusCode::BAD_REQUEST,
        StatusClass::NotFound => StatusCode::NOT_FOUND,
        StatusClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }

  fn entity_kind(&self) -> EntityKind {
    match self {
      ApiError::BadRequest(_) => EntityKind::Unspecified,
      ApiError::Domain(e) => e.entity_kind(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(error = %self, "request failed");
    }
    let body = json!({ "error": self.to_string(), "entityType": self.entity_kind() });
    (status, Json(body)).into_response()
  }
}
