//! Handlers for `/debates` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/debates` | `?category&search&sort=recent\|popular\|active&page` |
//! | `POST` | `/debates` | Auth. Body: [`DebateDraft`]; returns 201 |
//! | `GET`  | `/debates/{id}` | Debate with its argument tree |

use std::sync::Arc;

use anekanta_core::{
  argument::Argument,
  debate::{Category, Debate, DebatePage, DebateQuery, DebateSort},
  moderation::ModerationResult,
  service::{self, DebateDraft, DebateView},
  store::DebateStore,
};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{accepted, auth::MaybeUser, error::ApiError, extract::JsonBody};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub category: Option<Category>,
  pub search:   Option<String>,
  pub sort:     Option<DebateSort>,
  pub page:     Option<u32>,
}

/// `GET /debates[?category=...][&search=...][&sort=...][&page=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<DebatePage>, ApiError>
where
  S: DebateStore,
{
  let query = DebateQuery {
    category: params.category,
    search:   params.search,
    sort:     params.sort.unwrap_or_default(),
    page:     params.page.unwrap_or(1),
  };
  let page = store.list_debates(&query).await.map_err(ApiError::from_store)?;
  Ok(Json(page))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreatedDebate {
  pub debate:     Debate,
  pub thesis:     Argument,
  pub moderation: ModerationResult,
}

/// `POST /debates`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  MaybeUser(principal): MaybeUser,
  JsonBody(body): JsonBody<DebateDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DebateStore + 'static,
{
  let submission = service::submit_debate(store.as_ref(), principal, body)
    .await
    .map_err(ApiError::from_store)?;
  let ((debate, thesis), moderation) = accepted(submission)?;
  Ok((StatusCode::CREATED, Json(CreatedDebate { debate, thesis, moderation })))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /debates/{id}`; the tree carries the caller's votes when
/// authenticated.
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  MaybeUser(viewer): MaybeUser,
  Path(id): Path<Uuid>,
) -> Result<Json<DebateView>, ApiError>
where
  S: DebateStore + 'static,
{
  let view = service::view_debate(store.as_ref(), viewer, id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(view))
}
