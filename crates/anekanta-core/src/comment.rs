//! Free-text comments attached to an argument.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id:   Uuid,
  pub argument_id:  Uuid,
  pub author_id:    Uuid,
  pub content:      String,
  pub is_anonymous: bool,
  pub created_at:   DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
  pub argument_id:  Uuid,
  pub author_id:    Uuid,
  pub content:      String,
  pub is_anonymous: bool,
}
