//! Lightweight per-argument reactions.
//!
//! Unlike votes, reactions carry no weight in the tree ordering. A user holds
//! at most one reaction of each kind on an argument; reacting again with the
//! same kind takes it back.

use serde::{Deserialize, Serialize};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
  Insightful,
  Agree,
  Disagree,
  ThoughtProvoking,
}

impl ReactionKind {
  pub const ALL: [ReactionKind; 4] =
    [Self::Insightful, Self::Agree, Self::Disagree, Self::ThoughtProvoking];
}

/// Whether a toggle added or removed the caller's reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggled {
  On,
  Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionToggle {
  pub kind:    ReactionKind,
  pub toggled: Toggled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCount {
  pub kind:  ReactionKind,
  pub count: u64,
}

/// Reaction totals on one argument, as seen by one viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionSummary {
  /// Only kinds with at least one reaction, in [`ReactionKind`] order.
  pub counts: Vec<ReactionCount>,
  /// The viewer's own reactions; empty for anonymous viewers.
  pub mine:   Vec<ReactionKind>,
}

impl ReactionSummary {
  pub fn count(&self, kind: ReactionKind) -> u64 {
    self.counts.iter().find(|c| c.kind == kind).map_or(0, |c| c.count)
  }
}
