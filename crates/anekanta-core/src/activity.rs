//! The activity feed: a log of who started debates, added arguments and
//! commented.
//!
//! Entries are written by the store in the same transaction as the content
//! they describe, so the feed never mentions a row that was rolled back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
  /// Opened a debate; the target is the debate.
  Created,
  /// The target is the new argument.
  AddedArgument,
  /// The target is the argument that was commented on.
  Commented,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
  pub activity_id:  Uuid,
  pub debate_id:    Uuid,
  pub debate_title: String,
  pub action:       ActivityAction,
  pub target_id:    Uuid,
  /// `None` when the content was posted anonymously.
  pub actor_id:     Option<Uuid>,
  pub actor_name:   Option<String>,
  pub created_at:   DateTime<Utc>,
}

/// Entries returned when a query does not name a limit.
pub const DEFAULT_LIMIT: usize = 20;
/// Upper bound on entries per query.
pub const MAX_LIMIT: usize = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityQuery {
  /// Restrict the feed to one debate.
  pub debate_id: Option<Uuid>,
  pub limit:     Option<usize>,
}

impl ActivityQuery {
  /// The effective limit: [`DEFAULT_LIMIT`] when unset, clamped to
  /// `1..=MAX_LIMIT`.
  pub fn limit(&self) -> usize { self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT) }
}
