//! Handlers for `/arguments/{id}/reactions`.

use std::sync::Arc;

use anekanta_core::{
  reaction::{ReactionKind, ReactionSummary, ReactionToggle},
  service,
  store::DebateStore,
};
use axum::{
  Json,
  extract::{Path, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::MaybeUser, error::ApiError, extract::JsonBody};

/// `GET /arguments/{id}/reactions`. Authenticated callers also see their own
/// reactions.
pub async fn list<S>(
  State(store): State<Arc<S>>,
  MaybeUser(viewer): MaybeUser,
  Path(argument_id): Path<Uuid>,
) -> Result<Json<ReactionSummary>, ApiError>
where
  S: DebateStore + 'static,
{
  let summary = service::reactions(store.as_ref(), viewer, argument_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
pub struct ReactBody {
  pub kind: ReactionKind,
}

/// `POST /arguments/{id}/reactions`. Reacting twice with the same kind takes
/// the reaction back.
pub async fn toggle<S>(
  State(store): State<Arc<S>>,
  MaybeUser(principal): MaybeUser,
  Path(argument_id): Path<Uuid>,
  JsonBody(body): JsonBody<ReactBody>,
) -> Result<Json<ReactionToggle>, ApiError>
where
  S: DebateStore + 'static,
{
  let toggle = service::react(store.as_ref(), principal, argument_id, body.kind)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(toggle))
}
