//! HTTP Basic-auth extractor.
//!
//! Credentials are checked against the users table of the store. A request
//! without an `Authorization` header is anonymous; a request with a header
//! that does not verify is rejected outright, so a typo in a password never
//! silently downgrades the caller.

use std::sync::Arc;

use anekanta_core::{store::DebateStore, user::Principal};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};

use crate::error::ApiError;

/// The caller, if the request carried valid credentials.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<Principal>);

/// Split a `Basic` authorization header into username and password.
///
/// `Ok(None)` means no header was sent.
pub fn basic_credentials(headers: &HeaderMap) -> Result<Option<(String, String)>, ApiError> {
  let Some(value) = headers.get(header::AUTHORIZATION) else {
    return Ok(None);
  };

  let encoded = value
    .to_str()
    .ok()
    .and_then(|v| v.strip_prefix("Basic "))
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;
  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  Ok(Some((username.to_owned(), password.to_owned())))
}

/// Check `password` against a stored argon2 PHC string.
pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .and_then(|hash| Argon2::default().verify_password(password.as_bytes(), &hash))
    .is_ok()
}

impl<S> FromRequestParts<Arc<S>> for MaybeUser
where
  S: DebateStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    store: &Arc<S>,
  ) -> Result<Self, Self::Rejection> {
    let Some((username, password)) = basic_credentials(&parts.headers)? else {
      return Ok(MaybeUser(None));
    };

    let creds = store
      .find_credentials(&username)
      .await
      .map_err(ApiError::from_store)?
      .ok_or(ApiError::Unauthorized)?;

    if !verify_password(&password, &creds.password_hash) {
      tracing::debug!(%username, "rejected credentials");
      return Err(ApiError::Unauthorized);
    }

    Ok(MaybeUser(Some(Principal::from(&creds.user))))
  }
}
