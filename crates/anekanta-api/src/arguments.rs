//! Handlers for arguments and votes.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/debates/{id}/arguments` | Auth. Body: [`ArgumentDraft`]; returns 201 |
//! | `POST` | `/arguments/{id}/vote` | Auth. Body: `{"value":0..4}`; `0` retracts |

use std::sync::Arc;

use anekanta_core::{
  argument::Argument,
  moderation::ModerationResult,
  service::{self, ArgumentDraft},
  store::DebateStore,
  vote::VoteResult,
};
use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{accepted, auth::MaybeUser, error::ApiError, extract::JsonBody};

#[derive(Debug, Serialize)]
pub struct CreatedArgument {
  pub argument:   Argument,
  pub moderation: ModerationResult,
}

/// `POST /debates/{id}/arguments`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  MaybeUser(principal): MaybeUser,
  Path(debate_id): Path<Uuid>,
  JsonBody(body): JsonBody<ArgumentDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DebateStore + 'static,
{
  let submission = service::submit_argument(store.as_ref(), principal, debate_id, body)
    .await
    .map_err(ApiError::from_store)?;
  let (argument, moderation) = accepted(submission)?;
  Ok((StatusCode::CREATED, Json(CreatedArgument { argument, moderation })))
}

#[derive(Debug, Deserialize)]
pub struct VoteBody {
  pub value: i64,
}

/// `POST /arguments/{id}/vote`
pub async fn vote<S>(
  State(store): State<Arc<S>>,
  MaybeUser(principal): MaybeUser,
  Path(argument_id): Path<Uuid>,
  JsonBody(body): JsonBody<VoteBody>,
) -> Result<Json<VoteResult>, ApiError>
where
  S: DebateStore + 'static,
{
  let result = service::cast_vote(store.as_ref(), principal, argument_id, body.value)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(result))
}
