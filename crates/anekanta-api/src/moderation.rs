//! Handlers for `/moderation` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/moderation/check` | Body: `{"text":"..."}`; nothing is stored |
//! | `GET`   | `/moderation/flagged` | Admin. Optional `?status=pending\|reviewed\|dismissed\|actioned` |
//! | `PATCH` | `/moderation/flagged/{id}` | Admin. Body: `{"status":"reviewed"}` |
//! | `GET`   | `/moderation/stats` | Admin. Site-wide counters |

use std::sync::Arc;

use anekanta_core::{
  moderation::{self, ModerationResult},
  review::{FlaggedContent, ModerationStats, ReviewStatus},
  service,
  store::DebateStore,
};
use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::MaybeUser, error::ApiError, extract::JsonBody};

#[derive(Debug, Deserialize)]
pub struct CheckBody {
  pub text: String,
}

/// `POST /moderation/check`
pub async fn check(JsonBody(body): JsonBody<CheckBody>) -> Json<ModerationResult> {
  Json(moderation::score(&body.text))
}

#[derive(Debug, Deserialize, Default)]
pub struct FlaggedParams {
  pub status: Option<ReviewStatus>,
}

/// `GET /moderation/flagged[?status=...]`
pub async fn flagged<S>(
  State(store): State<Arc<S>>,
  MaybeUser(principal): MaybeUser,
  Query(params): Query<FlaggedParams>,
) -> Result<Json<Vec<FlaggedContent>>, ApiError>
where
  S: DebateStore + 'static,
{
  let queue = service::review_queue(store.as_ref(), principal, params.status)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(queue))
}

#[derive(Debug, Deserialize)]
pub struct ResolveBody {
  pub status: ReviewStatus,
}

/// `PATCH /moderation/flagged/{id}`
pub async fn resolve<S>(
  State(store): State<Arc<S>>,
  MaybeUser(principal): MaybeUser,
  Path(id): Path<Uuid>,
  JsonBody(body): JsonBody<ResolveBody>,
) -> Result<Json<FlaggedContent>, ApiError>
where
  S: DebateStore + 'static,
{
  let entry = service::resolve_review(store.as_ref(), principal, id, body.status)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(entry))
}

/// `GET /moderation/stats`
pub async fn stats<S>(
  State(store): State<Arc<S>>,
  MaybeUser(principal): MaybeUser,
) -> Result<Json<ModerationStats>, ApiError>
where
  S: DebateStore + 'static,
{
  let stats = service::moderation_stats(store.as_ref(), principal)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(stats))
}
