//! JSON REST API for Anekanta.
//!
//! Exposes an axum [`Router`] backed by any [`DebateStore`]. Callers
//! authenticate with HTTP Basic credentials checked against the store's users;
//! TLS and other transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", anekanta_api::api_router(store.clone()))
//! ```

pub mod activity;
pub mod arguments;
pub mod auth;
pub mod comments;
pub mod debates;
pub mod error;
pub mod extract;
pub mod moderation;
pub mod reactions;

use std::sync::Arc;

use anekanta_core::{moderation::ModerationResult, service::Submission, store::DebateStore};
use axum::{
  Router,
  routing::{get, patch, post},
};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: DebateStore + 'static,
{
  Router::new()
    // Debates
    .route("/debates", get(debates::list::<S>).post(debates::create::<S>))
    .route("/debates/{id}", get(debates::get_one::<S>))
    // Arguments
    .route("/debates/{id}/arguments", post(arguments::create::<S>))
    .route("/arguments/{id}/vote", post(arguments::vote::<S>))
    .route(
      "/arguments/{id}/comments",
      get(comments::list::<S>).post(comments::create::<S>),
    )
    .route(
      "/arguments/{id}/reactions",
      get(reactions::list::<S>).post(reactions::toggle::<S>),
    )
    // Activity
    .route("/activity", get(activity::feed::<S>))
    // Moderation
    .route("/moderation/check", post(moderation::check))
    .route("/moderation/flagged", get(moderation::flagged::<S>))
    .route("/moderation/flagged/{id}", patch(moderation::resolve::<S>))
    .route("/moderation/stats", get(moderation::stats::<S>))
    .with_state(store)
}

/// Unwrap an accepted submission, or turn a blocked one into a 400.
pub(crate) fn accepted<T>(submission: Submission<T>) -> Result<(T, ModerationResult), ApiError> {
  match submission {
    Submission::Accepted { item, moderation } => Ok((item, moderation)),
    Submission::Blocked(result) => Err(ApiError::Blocked(result)),
  }
}
