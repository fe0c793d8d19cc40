//! Argument rows: the flat storage form of a debate's tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Deepest level a reply may sit at. The thesis is level 0.
pub const MAX_DEPTH: u32 = 64;

/// The polarity of an argument relative to its parent, or the thesis root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentKind {
  Thesis,
  Pro,
  Con,
}

/// One stored argument.
///
/// Exactly one argument per debate is the thesis root (`kind = thesis`, no
/// parent, depth 0). Every other argument is pro or con, has a parent in the
/// same debate, and sits one level below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
  pub argument_id:  Uuid,
  pub debate_id:    Uuid,
  pub parent_id:    Option<Uuid>,
  pub author_id:    Uuid,
  pub content:      String,
  pub kind:         ArgumentKind,
  pub depth:        u32,
  /// Cached impact score. Only the vote aggregator writes this.
  pub vote_score:   i64,
  pub is_anonymous: bool,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

impl Argument {
  pub fn is_root(&self) -> bool {
    self.kind == ArgumentKind::Thesis && self.parent_id.is_none()
  }
}

/// Input to [`crate::store::DebateStore::create_argument`]. The store derives
/// `depth` from the parent and starts `vote_score` at zero.
#[derive(Debug, Clone)]
pub struct NewArgument {
  pub debate_id:    Uuid,
  pub parent_id:    Uuid,
  pub author_id:    Uuid,
  pub content:      String,
  pub kind:         ArgumentKind,
  pub is_anonymous: bool,
}
