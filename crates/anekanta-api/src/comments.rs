//! Handlers for `/arguments/{id}/comments`.

use std::sync::Arc;

use anekanta_core::{
  comment::Comment,
  moderation::ModerationResult,
  service::{self, CommentDraft},
  store::DebateStore,
};
use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{accepted, auth::MaybeUser, error::ApiError, extract::JsonBody};

/// `GET /arguments/{id}/comments`, oldest first.
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(argument_id): Path<Uuid>,
) -> Result<Json<Vec<Comment>>, ApiError>
where
  S: DebateStore,
{
  let comments = store
    .list_comments(argument_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(comments))
}

#[derive(Debug, Serialize)]
pub struct CreatedComment {
  pub comment:    Comment,
  pub moderation: ModerationResult,
}

/// `POST /arguments/{id}/comments`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  MaybeUser(principal): MaybeUser,
  Path(argument_id): Path<Uuid>,
  JsonBody(body): JsonBody<CommentDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DebateStore + 'static,
{
  let submission = service::submit_comment(store.as_ref(), principal, argument_id, body)
    .await
    .map_err(ApiError::from_store)?;
  let (comment, moderation) = accepted(submission)?;
  Ok((StatusCode::CREATED, Json(CreatedComment { comment, moderation })))
}
