//! The `DebateStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `anekanta-store-sqlite`).
//! Higher layers (`anekanta-api`, the [`service`](crate::service) functions)
//! depend on this abstraction, not on any concrete backend.

use std::{collections::HashMap, future::Future};

use uuid::Uuid;

use crate::{
  Classify,
  activity::{Activity, ActivityQuery},
  argument::{Argument, NewArgument},
  comment::{Comment, NewComment},
  debate::{Debate, DebatePage, DebateQuery, DebateSummary, NewDebate},
  moderation::ModerationReport,
  reaction::{ReactionKind, ReactionSummary, ReactionToggle},
  review::{FlaggedContent, ModerationStats, ReviewStatus},
  user::{Credentials, NewUser, User},
  vote::{Impact, VoteResult},
};

/// Abstraction over an Anekanta store backend.
///
/// Writes that take a `review` argument persist the content and, when the
/// report is present, a pending review-queue entry for it in one atomic unit.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait DebateStore: Send + Sync {
  type Error: std::error::Error + Classify + From<crate::Error> + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user. The username is stored lower-cased and must be
  /// unique.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up a user and their password hash by (case-insensitive) username.
  fn find_credentials<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + 'a;

  // ── Debates ───────────────────────────────────────────────────────────

  /// Create a debate together with its thesis root argument.
  ///
  /// This write, [`create_argument`](Self::create_argument) and
  /// [`add_comment`](Self::add_comment) each append an activity entry in the
  /// same transaction.
  fn create_debate(
    &self,
    input: NewDebate,
    review: Option<ModerationReport>,
  ) -> impl Future<Output = Result<(Debate, Argument), Self::Error>> + Send + '_;

  /// Retrieve a debate with its counters. Returns `None` if not found.
  fn get_debate(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<DebateSummary>, Self::Error>> + Send + '_;

  fn list_debates<'a>(
    &'a self,
    query: &'a DebateQuery,
  ) -> impl Future<Output = Result<DebatePage, Self::Error>> + Send + 'a;

  // ── Arguments ─────────────────────────────────────────────────────────

  fn get_argument(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Argument>, Self::Error>> + Send + '_;

  /// Every argument row of a debate, in no particular order.
  fn get_arguments_by_debate(
    &self,
    debate_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Argument>, Self::Error>> + Send + '_;

  /// Create a pro/con argument below `input.parent_id`.
  ///
  /// Fails with `DebateNotFound` for an unknown debate, `ArgumentNotFound` if
  /// the parent is not in that debate, and `Validation` if the debate is
  /// closed.
  fn create_argument(
    &self,
    input: NewArgument,
    review: Option<ModerationReport>,
  ) -> impl Future<Output = Result<Argument, Self::Error>> + Send + '_;

  // ── Votes ─────────────────────────────────────────────────────────────

  /// Apply a vote (`0` retracts, `1..=4` casts) and recompute the argument's
  /// score, atomically with respect to other votes on the same argument.
  /// Implementations delegate to [`crate::vote::cast_vote`].
  fn cast_vote(
    &self,
    argument_id: Uuid,
    voter_id: Uuid,
    value: i64,
  ) -> impl Future<Output = Result<VoteResult, Self::Error>> + Send + '_;

  /// The voter's live votes on every argument of a debate.
  fn user_votes_in_debate(
    &self,
    debate_id: Uuid,
    voter_id: Uuid,
  ) -> impl Future<Output = Result<HashMap<Uuid, Impact>, Self::Error>> + Send + '_;

  // ── Reactions ─────────────────────────────────────────────────────────

  /// Add the user's `kind` reaction to an argument, or remove it if present.
  /// Fails with `ArgumentNotFound` for an unknown argument.
  fn toggle_reaction(
    &self,
    argument_id: Uuid,
    user_id: Uuid,
    kind: ReactionKind,
  ) -> impl Future<Output = Result<ReactionToggle, Self::Error>> + Send + '_;

  /// Reaction counts on an argument plus `viewer`'s own reactions.
  fn reactions(
    &self,
    argument_id: Uuid,
    viewer: Option<Uuid>,
  ) -> impl Future<Output = Result<ReactionSummary, Self::Error>> + Send + '_;

  // ── Activity ──────────────────────────────────────────────────────────

  /// Feed entries, newest first.
  fn list_activity<'a>(
    &'a self,
    query: &'a ActivityQuery,
  ) -> impl Future<Output = Result<Vec<Activity>, Self::Error>> + Send + 'a;

  // ── Comments ──────────────────────────────────────────────────────────

  fn add_comment(
    &self,
    input: NewComment,
    review: Option<ModerationReport>,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Comments on an argument, oldest first.
  fn list_comments(
    &self,
    argument_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  // ── Review queue ──────────────────────────────────────────────────────

  /// Queue entries, newest first.
  fn list_flagged(
    &self,
    status: Option<ReviewStatus>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<FlaggedContent>, Self::Error>> + Send + '_;

  /// Move an entry to `status`, recording who resolved it and when.
  fn resolve_flagged(
    &self,
    flagged_id: Uuid,
    status: ReviewStatus,
    resolver: Uuid,
  ) -> impl Future<Output = Result<FlaggedContent, Self::Error>> + Send + '_;

  fn moderation_stats(
    &self,
  ) -> impl Future<Output = Result<ModerationStats, Self::Error>> + Send + '_;
}
