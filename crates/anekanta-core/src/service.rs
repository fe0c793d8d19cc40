//! Request-level operations over any [`DebateStore`].
//!
//! Each function checks the caller, validates input, runs free text through
//! the moderation scorer and only then touches the store. A blocked
//! submission comes back as [`Submission::Blocked`] and nothing is written.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error,
  activity::{Activity, ActivityQuery},
  argument::{Argument, ArgumentKind, NewArgument},
  comment::{Comment, NewComment},
  debate::{Category, Debate, DebateSummary, NewDebate},
  moderation::{self, ModerationResult},
  reaction::{ReactionKind, ReactionSummary, ReactionToggle},
  review::{FlaggedContent, ModerationStats, ReviewStatus},
  store::DebateStore,
  tree::{self, ArgumentTree},
  user::{self, Principal},
  vote::VoteResult,
};

/// How many queue entries a moderator sees at once.
pub const REVIEW_PAGE: usize = 50;

/// The outcome of a moderated submission.
#[derive(Debug, Clone)]
pub enum Submission<T> {
  Accepted {
    item:       T,
    /// Flags (if any) were queued for review alongside the item.
    moderation: ModerationResult,
  },
  /// Rejected by moderation; nothing was persisted.
  Blocked(ModerationResult),
}

impl<T> Submission<T> {
  pub fn accepted(self) -> Option<T> {
    match self {
      Self::Accepted { item, .. } => Some(item),
      Self::Blocked(_) => None,
    }
  }

  pub fn moderation(&self) -> &ModerationResult {
    match self {
      Self::Accepted { moderation, .. } | Self::Blocked(moderation) => moderation,
    }
  }
}

/// Trim `text` and reject it if nothing remains.
fn required(field: &str, text: &str) -> Result<String, Error> {
  let trimmed = text.trim();
  if trimmed.is_empty() {
    return Err(Error::validation(format!("{field} is required")));
  }
  Ok(trimmed.to_owned())
}

// ─── Debates ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebateDraft {
  pub title:        String,
  pub thesis:       String,
  #[serde(default)]
  pub description:  String,
  #[serde(default)]
  pub category:     Category,
  #[serde(default)]
  pub is_anonymous: bool,
}

/// Open a new debate. Title, thesis and description are moderated as one
/// text.
pub async fn submit_debate<S: DebateStore>(
  store: &S,
  principal: Option<Principal>,
  draft: DebateDraft,
) -> Result<Submission<(Debate, Argument)>, S::Error> {
  let principal = user::require(principal)?;
  let title = required("title", &draft.title)?;
  let thesis = required("thesis", &draft.thesis)?;
  let description = draft.description.trim().to_owned();

  let moderation = moderation::score(&format!("{title} {thesis} {description}"));
  if moderation.is_blocked() {
    tracing::warn!(author = %principal.user_id, score = moderation.score, "debate blocked by moderation");
    return Ok(Submission::Blocked(moderation));
  }

  let input = NewDebate {
    title,
    description,
    thesis,
    author_id: principal.user_id,
    category: draft.category,
    is_anonymous: draft.is_anonymous,
  };
  let created = store.create_debate(input, moderation.report()).await?;
  tracing::info!(debate = %created.0.debate_id, action = ?moderation.action, "debate created");

  Ok(Submission::Accepted { item: created, moderation })
}

// ─── Arguments ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ArgumentDraft {
  pub parent_id:    Option<Uuid>,
  #[serde(default)]
  pub content:      String,
  pub kind:         ArgumentKind,
  #[serde(default)]
  pub is_anonymous: bool,
}

/// Add a pro or con argument under an existing argument of the debate.
pub async fn submit_argument<S: DebateStore>(
  store: &S,
  principal: Option<Principal>,
  debate_id: Uuid,
  draft: ArgumentDraft,
) -> Result<Submission<Argument>, S::Error> {
  let principal = user::require(principal)?;
  let content = required("content", &draft.content)?;
  if draft.kind == ArgumentKind::Thesis {
    return Err(Error::validation("arguments must be pro or con").into());
  }
  let parent_id = draft
    .parent_id
    .ok_or_else(|| Error::validation("parent argument is required"))?;

  let moderation = moderation::score(&content);
  if moderation.is_blocked() {
    tracing::warn!(%debate_id, author = %principal.user_id, score = moderation.score, "argument blocked by moderation");
    return Ok(Submission::Blocked(moderation));
  }

  let input = NewArgument {
    debate_id,
    parent_id,
    author_id: principal.user_id,
    content,
    kind: draft.kind,
    is_anonymous: draft.is_anonymous,
  };
  let argument = store.create_argument(input, moderation.report()).await?;
  tracing::debug!(%debate_id, argument = %argument.argument_id, depth = argument.depth, "argument added");

  Ok(Submission::Accepted { item: argument, moderation })
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentDraft {
  #[serde(default)]
  pub content:      String,
  #[serde(default)]
  pub is_anonymous: bool,
}

pub async fn submit_comment<S: DebateStore>(
  store: &S,
  principal: Option<Principal>,
  argument_id: Uuid,
  draft: CommentDraft,
) -> Result<Submission<Comment>, S::Error> {
  let principal = user::require(principal)?;
  let content = required("content", &draft.content)?;

  let moderation = moderation::score(&content);
  if moderation.is_blocked() {
    tracing::warn!(%argument_id, author = %principal.user_id, "comment blocked by moderation");
    return Ok(Submission::Blocked(moderation));
  }

  let input = NewComment {
    argument_id,
    author_id: principal.user_id,
    content,
    is_anonymous: draft.is_anonymous,
  };
  let comment = store.add_comment(input, moderation.report()).await?;
  Ok(Submission::Accepted { item: comment, moderation })
}

// ─── Votes ───────────────────────────────────────────────────────────────────

/// Cast, change or (with `0`) retract the caller's vote on an argument.
pub async fn cast_vote<S: DebateStore>(
  store: &S,
  principal: Option<Principal>,
  argument_id: Uuid,
  value: i64,
) -> Result<VoteResult, S::Error> {
  let principal = user::require(principal)?;
  store.cast_vote(argument_id, principal.user_id, value).await
}

// ─── Reactions ───────────────────────────────────────────────────────────────

/// Toggle the caller's `kind` reaction on an argument.
pub async fn react<S: DebateStore>(
  store: &S,
  principal: Option<Principal>,
  argument_id: Uuid,
  kind: ReactionKind,
) -> Result<ReactionToggle, S::Error> {
  let principal = user::require(principal)?;
  let toggle = store.toggle_reaction(argument_id, principal.user_id, kind).await?;
  tracing::debug!(%argument_id, user = %principal.user_id, ?kind, toggled = ?toggle.toggled, "reaction toggled");
  Ok(toggle)
}

pub async fn reactions<S: DebateStore>(
  store: &S,
  viewer: Option<Principal>,
  argument_id: Uuid,
) -> Result<ReactionSummary, S::Error> {
  store.reactions(argument_id, viewer.map(|p| p.user_id)).await
}

// ─── Activity ────────────────────────────────────────────────────────────────

pub async fn activity_feed<S: DebateStore>(
  store: &S,
  query: &ActivityQuery,
) -> Result<Vec<Activity>, S::Error> {
  store.list_activity(query).await
}

// ─── Debate view ─────────────────────────────────────────────────────────────

/// A debate with its assembled argument tree, from one viewer's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateView {
  pub debate: DebateSummary,
  pub tree:   ArgumentTree,
}

pub async fn view_debate<S: DebateStore>(
  store: &S,
  viewer: Option<Principal>,
  debate_id: Uuid,
) -> Result<DebateView, S::Error> {
  let debate = store
    .get_debate(debate_id)
    .await?
    .ok_or(Error::DebateNotFound(debate_id))?;

  let rows = store.get_arguments_by_debate(debate_id).await?;
  let votes = match viewer {
    Some(p) => store.user_votes_in_debate(debate_id, p.user_id).await?,
    None => HashMap::new(),
  };

  let tree = tree::build(&rows, &votes);
  if !tree.orphans.is_empty() {
    tracing::warn!(%debate_id, orphans = ?tree.orphans, "debate snapshot held unreachable arguments");
  }

  Ok(DebateView { debate, tree })
}

// ─── Review queue ────────────────────────────────────────────────────────────

pub async fn review_queue<S: DebateStore>(
  store: &S,
  principal: Option<Principal>,
  status: Option<ReviewStatus>,
) -> Result<Vec<FlaggedContent>, S::Error> {
  user::require(principal)?.require_admin()?;
  store.list_flagged(status, REVIEW_PAGE).await
}

pub async fn moderation_stats<S: DebateStore>(
  store: &S,
  principal: Option<Principal>,
) -> Result<ModerationStats, S::Error> {
  user::require(principal)?.require_admin()?;
  store.moderation_stats().await
}

pub async fn resolve_review<S: DebateStore>(
  store: &S,
  principal: Option<Principal>,
  flagged_id: Uuid,
  status: ReviewStatus,
) -> Result<FlaggedContent, S::Error> {
  let principal = user::require(principal)?;
  principal.require_admin()?;
  if !status.is_resolution() {
    return Err(Error::validation("status must be reviewed, dismissed or actioned").into());
  }
  let entry = store.resolve_flagged(flagged_id, status, principal.user_id).await?;
  tracing::info!(flagged = %flagged_id, status = ?status, moderator = %principal.user_id, "review resolved");
  Ok(entry)
}
