//! Request body extraction.

use axum::extract::{FromRequest, rejection::JsonRejection};

use crate::error::ApiError;

/// [`axum::Json`] with its rejections reported as [`ApiError::BadRequest`].
///
/// A body that fails to parse, or parses into the wrong shape (a fractional
/// vote value, an unknown argument kind), is invalid input like any other.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}
