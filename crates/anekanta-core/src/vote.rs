//! Ordinal impact votes and the aggregator that maintains each argument's
//! cached score.
//!
//! The aggregator is written once against [`VoteLedger`], a synchronous view
//! of the vote and argument rows that a backend binds to a single transaction.
//! Running [`cast_vote`] inside that transaction makes the write and the
//! recompute one atomic unit for the argument, so two overlapping voters can
//! never overwrite each other's contribution with a stale score.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Values ──────────────────────────────────────────────────────────────────

/// How much weight a voter gives an argument, from low to decisive.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Impact {
  Low = 1,
  Moderate = 2,
  Strong = 3,
  Decisive = 4,
}

impl Impact {
  pub fn value(self) -> u8 { self as u8 }
}

impl From<Impact> for u8 {
  fn from(impact: Impact) -> Self { impact.value() }
}

impl TryFrom<u8> for Impact {
  type Error = Error;

  fn try_from(value: u8) -> Result<Self> {
    match value {
      1 => Ok(Self::Low),
      2 => Ok(Self::Moderate),
      3 => Ok(Self::Strong),
      4 => Ok(Self::Decisive),
      other => Err(Error::validation(format!(
        "impact must be between 1 and 4, got {other}"
      ))),
    }
  }
}

/// A decoded vote request: `0` retracts, `1..=4` casts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteIntent {
  Retract,
  Cast(Impact),
}

impl VoteIntent {
  pub fn from_value(value: i64) -> Result<Self> {
    if value == 0 {
      return Ok(Self::Retract);
    }
    u8::try_from(value)
      .ok()
      .and_then(|v| Impact::try_from(v).ok())
      .map(Self::Cast)
      .ok_or_else(|| Error::validation(format!("vote value must be 0-4, got {value}")))
  }

  pub fn impact(self) -> Option<Impact> {
    match self {
      Self::Retract => None,
      Self::Cast(impact) => Some(impact),
    }
  }
}

/// What the caller sees after a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResult {
  /// The argument's recomputed cached score.
  pub score:      i64,
  /// The caller's live vote, or `None` after a retraction.
  pub user_vote:  Option<Impact>,
  pub vote_count: u64,
}

/// The impact score of a set of votes: `round(mean × count)`, or 0 when there
/// are no votes. Equal to the plain sum for any realistic vote count.
pub fn impact_score(values: &[Impact]) -> i64 {
  if values.is_empty() {
    return 0;
  }
  let count = values.len() as f64;
  let mean = values.iter().map(|v| f64::from(v.value())).sum::<f64>() / count;
  (mean * count).round() as i64
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// Row-level access to votes and argument scores, scoped to one transaction.
///
/// Implementations must guarantee that no other writer touches the same
/// argument's votes between the first call and the end of the transaction.
pub trait VoteLedger {
  type Error: From<Error>;

  fn argument_exists(&mut self, argument_id: Uuid) -> Result<bool, Self::Error>;

  /// Insert the voter's vote, or overwrite the value if one exists.
  fn upsert_vote(
    &mut self,
    argument_id: Uuid,
    voter_id: Uuid,
    impact: Impact,
  ) -> Result<(), Self::Error>;

  /// Remove the voter's vote. Absent votes are not an error.
  fn delete_vote(&mut self, argument_id: Uuid, voter_id: Uuid) -> Result<(), Self::Error>;

  /// All live vote values for the argument.
  fn vote_values(&mut self, argument_id: Uuid) -> Result<Vec<Impact>, Self::Error>;

  fn update_argument_score(&mut self, argument_id: Uuid, score: i64) -> Result<(), Self::Error>;
}

/// Apply one vote request and recompute the argument's cached score.
///
/// This is the only code that writes `vote_score`.
pub fn cast_vote<L: VoteLedger>(
  ledger: &mut L,
  argument_id: Uuid,
  voter_id: Uuid,
  value: i64,
) -> Result<VoteResult, L::Error> {
  let intent = VoteIntent::from_value(value)?;

  if !ledger.argument_exists(argument_id)? {
    return Err(Error::ArgumentNotFound(argument_id).into());
  }

  match intent {
    VoteIntent::Retract => ledger.delete_vote(argument_id, voter_id)?,
    VoteIntent::Cast(impact) => ledger.upsert_vote(argument_id, voter_id, impact)?,
  }

  let values = ledger.vote_values(argument_id)?;
  let score = impact_score(&values);
  ledger.update_argument_score(argument_id, score)?;

  tracing::debug!(%argument_id, %voter_id, score, votes = values.len(), "vote recorded");

  Ok(VoteResult {
    score,
    user_vote: intent.impact(),
    vote_count: values.len() as u64,
  })
}
