//! The moderation review queue.
//!
//! Accepted content that produced at least one moderation flag is queued here
//! for a human moderator. Blocked content is never stored, so it never
//! appears in the queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::moderation::ModerationFlag;

/// What kind of row a queue entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
  Debate,
  Argument,
  Comment,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
  #[default]
  Pending,
  Reviewed,
  Dismissed,
  Actioned,
}

impl ReviewStatus {
  /// Whether a moderator may move an entry into this status.
  pub fn is_resolution(self) -> bool { !matches!(self, Self::Pending) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlaggedContent {
  pub flagged_id:   Uuid,
  pub content_type: ContentType,
  pub content_id:   Uuid,
  pub author_id:    Uuid,
  /// Detail of the first flag, for one-line display.
  pub reason:       String,
  pub flags:        Vec<ModerationFlag>,
  pub score:        f64,
  pub status:       ReviewStatus,
  pub created_at:   DateTime<Utc>,
  pub resolved_at:  Option<DateTime<Utc>>,
  pub resolved_by:  Option<Uuid>,
}

/// Site-wide counters for the moderator dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationStats {
  pub total_users:     u64,
  pub total_debates:   u64,
  pub total_arguments: u64,
  pub pending_flags:   u64,
}
