//! `GET /activity[?debate_id=...&limit=...]`, newest first.

use std::sync::Arc;

use anekanta_core::{
  activity::{Activity, ActivityQuery},
  service,
  store::DebateStore,
};
use axum::{
  Json,
  extract::{Query, State},
};

use crate::error::ApiError;

pub async fn feed<S>(
  State(store): State<Arc<S>>,
  Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<Activity>>, ApiError>
where
  S: DebateStore,
{
  let entries = service::activity_feed(store.as_ref(), &query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(entries))
}
