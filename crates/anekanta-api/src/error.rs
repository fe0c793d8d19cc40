//! API error type and [`axum::response::IntoResponse`] implementation.

use anekanta_core::{Classify, ErrorClass, moderation::ModerationResult};
use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  /// Submission rejected by the moderation scorer.
  #[error("content blocked by moderation")]
  Blocked(ModerationResult),

  #[error("authentication required")]
  Unauthorized,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Pick the variant for a store (or core) error by its class.
  pub fn from_store<E>(err: E) -> Self
  where
    E: std::error::Error + Classify + Send + Sync + 'static,
  {
    match err.class() {
      ErrorClass::Validation => Self::BadRequest(err.to_string()),
      ErrorClass::NotFound => Self::NotFound(err.to_string()),
      ErrorClass::Unauthenticated => Self::Unauthorized,
      ErrorClass::Forbidden => Self::Forbidden(err.to_string()),
      ErrorClass::Conflict => Self::Conflict(err.to_string()),
      ErrorClass::Internal => Self::Store(Box::new(err)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Blocked(result) => (
        StatusCode::BAD_REQUEST,
        json!({ "error": self.to_string(), "moderation": result }),
      ),
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": self.to_string() })),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, json!({ "error": m })),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, json!({ "error": m })),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": e.to_string() }))
      }
    };

    let mut res = (status, Json(body)).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"anekanta\""),
      );
    }
    res
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn core_errors_map_to_status_codes() {
    let cases = [
      (anekanta_core::Error::validation("x"), StatusCode::BAD_REQUEST),
      (anekanta_core::Error::DebateNotFound(uuid::Uuid::nil()), StatusCode::NOT_FOUND),
      (anekanta_core::Error::Unauthenticated, StatusCode::UNAUTHORIZED),
      (anekanta_core::Error::Forbidden("admin"), StatusCode::FORBIDDEN),
      (anekanta_core::Error::Conflict("busy".into()), StatusCode::CONFLICT),
    ];
    for (err, status) in cases {
      assert_eq!(ApiError::from_store(err).into_response().status(), status);
    }
  }

  #[test]
  fn unauthorized_carries_challenge() {
    let res = ApiError::Unauthorized.into_response();
    let challenge = res.headers().get(header::WWW_AUTHENTICATE).unwrap();
    assert_eq!(challenge, "Basic realm=\"anekanta\"");
  }
}
