//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with fixed microsecond precision
//! and a `Z` suffix, so text order is time order. Moderation flags are stored
//! as compact JSON. UUIDs are stored as hyphenated lowercase strings.

use anekanta_core::{
  activity::{Activity, ActivityAction},
  argument::{Argument, ArgumentKind},
  comment::Comment,
  debate::{Category, Debate, DebateStatus, DebateSummary},
  moderation::ModerationFlag,
  reaction::ReactionKind,
  review::{ContentType, FlaggedContent, ReviewStatus},
  user::{Role, User},
};
use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── Enumerations ────────────────────────────────────────────────────────────

pub fn encode_role(role: Role) -> &'static str {
  match role {
    Role::User => "user",
    Role::Admin => "admin",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "user" => Ok(Role::User),
    "admin" => Ok(Role::Admin),
    other => Err(Error::Decode(format!("unknown role: {other:?}"))),
  }
}

pub fn decode_category(s: &str) -> Result<Category> {
  Category::from_name(s).ok_or_else(|| Error::Decode(format!("unknown category: {s:?}")))
}

pub fn encode_debate_status(status: DebateStatus) -> &'static str {
  match status {
    DebateStatus::Active => "active",
    DebateStatus::Closed => "closed",
  }
}

pub fn decode_debate_status(s: &str) -> Result<DebateStatus> {
  match s {
    "active" => Ok(DebateStatus::Active),
    "closed" => Ok(DebateStatus::Closed),
    other => Err(Error::Decode(format!("unknown debate status: {other:?}"))),
  }
}

pub fn encode_kind(kind: ArgumentKind) -> &'static str {
  match kind {
    ArgumentKind::Thesis => "thesis",
    ArgumentKind::Pro => "pro",
    ArgumentKind::Con => "con",
  }
}

pub fn decode_kind(s: &str) -> Result<ArgumentKind> {
  match s {
    "thesis" => Ok(ArgumentKind::Thesis),
    "pro" => Ok(ArgumentKind::Pro),
    "con" => Ok(ArgumentKind::Con),
    other => Err(Error::Decode(format!("unknown argument kind: {other:?}"))),
  }
}

pub fn encode_content_type(t: ContentType) -> &'static str {
  match t {
    ContentType::Debate => "debate",
    ContentType::Argument => "argument",
    ContentType::Comment => "comment",
  }
}

pub fn decode_content_type(s: &str) -> Result<ContentType> {
  match s {
    "debate" => Ok(ContentType::Debate),
    "argument" => Ok(ContentType::Argument),
    "comment" => Ok(ContentType::Comment),
    other => Err(Error::Decode(format!("unknown content type: {other:?}"))),
  }
}

pub fn encode_review_status(status: ReviewStatus) -> &'static str {
  match status {
    ReviewStatus::Pending => "pending",
    ReviewStatus::Reviewed => "reviewed",
    ReviewStatus::Dismissed => "dismissed",
    ReviewStatus::Actioned => "actioned",
  }
}

pub fn decode_review_status(s: &str) -> Result<ReviewStatus> {
  match s {
    "pending" => Ok(ReviewStatus::Pending),
    "reviewed" => Ok(ReviewStatus::Reviewed),
    "dismissed" => Ok(ReviewStatus::Dismissed),
    "actioned" => Ok(ReviewStatus::Actioned),
    other => Err(Error::Decode(format!("unknown review status: {other:?}"))),
  }
}

pub fn encode_reaction_kind(kind: ReactionKind) -> &'static str {
  match kind {
    ReactionKind::Insightful => "insightful",
    ReactionKind::Agree => "agree",
    ReactionKind::Disagree => "disagree",
    ReactionKind::ThoughtProvoking => "thought_provoking",
  }
}

pub fn decode_reaction_kind(s: &str) -> Result<ReactionKind> {
  match s {
    "insightful" => Ok(ReactionKind::Insightful),
    "agree" => Ok(ReactionKind::Agree),
    "disagree" => Ok(ReactionKind::Disagree),
    "thought_provoking" => Ok(ReactionKind::ThoughtProvoking),
    other => Err(Error::Decode(format!("unknown reaction kind: {other:?}"))),
  }
}

pub fn encode_action(action: ActivityAction) -> &'static str {
  match action {
    ActivityAction::Created => "created",
    ActivityAction::AddedArgument => "added_argument",
    ActivityAction::Commented => "commented",
  }
}

pub fn decode_action(s: &str) -> Result<ActivityAction> {
  match s {
    "created" => Ok(ActivityAction::Created),
    "added_argument" => Ok(ActivityAction::AddedArgument),
    "commented" => Ok(ActivityAction::Commented),
    other => Err(Error::Decode(format!("unknown activity action: {other:?}"))),
  }
}

// ─── Flags ───────────────────────────────────────────────────────────────────

pub fn encode_flags(flags: &[ModerationFlag]) -> Result<String> {
  Ok(serde_json::to_string(flags)?)
}

pub fn decode_flags(s: &str) -> Result<Vec<ModerationFlag>> { Ok(serde_json::from_str(s)?) }

/// SQLite integers are signed; counts and depths never go negative.
pub fn decode_count(n: i64, column: &str) -> Result<u64> {
  u64::try_from(n).map_err(|_| Error::Decode(format!("negative {column}: {n}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str =
  "user_id, username, display_name, role, created_at";

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:      String,
  pub username:     String,
  pub display_name: String,
  pub role:         String,
  pub created_at:   String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:      row.get(0)?,
      username:     row.get(1)?,
      display_name: row.get(2)?,
      role:         row.get(3)?,
      created_at:   row.get(4)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:      decode_uuid(&self.user_id)?,
      username:     self.username,
      display_name: self.display_name,
      role:         decode_role(&self.role)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Debate columns plus the two listing counters, in this order.
pub const DEBATE_SUMMARY_COLUMNS: &str = "
  d.debate_id, d.title, d.description, d.thesis, d.author_id, d.category,
  d.status, d.is_anonymous, d.created_at, d.updated_at,
  (SELECT COUNT(*) FROM arguments a WHERE a.debate_id = d.debate_id) AS argument_count,
  (SELECT COUNT(*) FROM votes v JOIN arguments a ON a.argument_id = v.argument_id
    WHERE a.debate_id = d.debate_id) AS vote_count";

/// Raw values read from a `debates` row with its counters.
pub struct RawDebateSummary {
  pub debate_id:      String,
  pub title:          String,
  pub description:    String,
  pub thesis:         String,
  pub author_id:      String,
  pub category:       String,
  pub status:         String,
  pub is_anonymous:   bool,
  pub created_at:     String,
  pub updated_at:     String,
  pub argument_count: i64,
  pub vote_count:     i64,
}

impl RawDebateSummary {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      debate_id:      row.get(0)?,
      title:          row.get(1)?,
      description:    row.get(2)?,
      thesis:         row.get(3)?,
      author_id:      row.get(4)?,
      category:       row.get(5)?,
      status:         row.get(6)?,
      is_anonymous:   row.get(7)?,
      created_at:     row.get(8)?,
      updated_at:     row.get(9)?,
      argument_count: row.get(10)?,
      vote_count:     row.get(11)?,
    })
  }

  pub fn into_summary(self) -> Result<DebateSummary> {
    let debate = Debate {
      debate_id:    decode_uuid(&self.debate_id)?,
      title:        self.title,
      description:  self.description,
      thesis:       self.thesis,
      author_id:    decode_uuid(&self.author_id)?,
      category:     decode_category(&self.category)?,
      status:       decode_debate_status(&self.status)?,
      is_anonymous: self.is_anonymous,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    };
    Ok(DebateSummary {
      debate,
      argument_count: decode_count(self.argument_count, "argument_count")?,
      vote_count: decode_count(self.vote_count, "vote_count")?,
    })
  }
}

pub const ARGUMENT_COLUMNS: &str = "
  argument_id, debate_id, parent_id, author_id, content, kind, depth,
  vote_score, is_anonymous, created_at, updated_at";

/// Raw values read directly from an `arguments` row.
pub struct RawArgument {
  pub argument_id:  String,
  pub debate_id:    String,
  pub parent_id:    Option<String>,
  pub author_id:    String,
  pub content:      String,
  pub kind:         String,
  pub depth:        i64,
  pub vote_score:   i64,
  pub is_anonymous: bool,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawArgument {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      argument_id:  row.get(0)?,
      debate_id:    row.get(1)?,
      parent_id:    row.get(2)?,
      author_id:    row.get(3)?,
      content:      row.get(4)?,
      kind:         row.get(5)?,
      depth:        row.get(6)?,
      vote_score:   row.get(7)?,
      is_anonymous: row.get(8)?,
      created_at:   row.get(9)?,
      updated_at:   row.get(10)?,
    })
  }

  pub fn into_argument(self) -> Result<Argument> {
    let depth = u32::try_from(self.depth)
      .map_err(|_| Error::Decode(format!("argument depth out of range: {}", self.depth)))?;
    Ok(Argument {
      argument_id:  decode_uuid(&self.argument_id)?,
      debate_id:    decode_uuid(&self.debate_id)?,
      parent_id:    self.parent_id.as_deref().map(decode_uuid).transpose()?,
      author_id:    decode_uuid(&self.author_id)?,
      content:      self.content,
      kind:         decode_kind(&self.kind)?,
      depth,
      vote_score:   self.vote_score,
      is_anonymous: self.is_anonymous,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

pub const COMMENT_COLUMNS: &str =
  "comment_id, argument_id, author_id, content, is_anonymous, created_at";

pub struct RawComment {
  pub comment_id:   String,
  pub argument_id:  String,
  pub author_id:    String,
  pub content:      String,
  pub is_anonymous: bool,
  pub created_at:   String,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id:   row.get(0)?,
      argument_id:  row.get(1)?,
      author_id:    row.get(2)?,
      content:      row.get(3)?,
      is_anonymous: row.get(4)?,
      created_at:   row.get(5)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      comment_id:   decode_uuid(&self.comment_id)?,
      argument_id:  decode_uuid(&self.argument_id)?,
      author_id:    decode_uuid(&self.author_id)?,
      content:      self.content,
      is_anonymous: self.is_anonymous,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub const FLAGGED_COLUMNS: &str = "
  flagged_id, content_type, content_id, author_id, reason, flags, score,
  status, created_at, resolved_at, resolved_by";

/// Raw values read directly from a `flagged_content` row.
pub struct RawFlagged {
  pub flagged_id:   String,
  pub content_type: String,
  pub content_id:   String,
  pub author_id:    String,
  pub reason:       String,
  pub flags:        String,
  pub score:        f64,
  pub status:       String,
  pub created_at:   String,
  pub resolved_at:  Option<String>,
  pub resolved_by:  Option<String>,
}

impl RawFlagged {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      flagged_id:   row.get(0)?,
      content_type: row.get(1)?,
      content_id:   row.get(2)?,
      author_id:    row.get(3)?,
      reason:       row.get(4)?,
      flags:        row.get(5)?,
      score:        row.get(6)?,
      status:       row.get(7)?,
      created_at:   row.get(8)?,
      resolved_at:  row.get(9)?,
      resolved_by:  row.get(10)?,
    })
  }

  pub fn into_flagged(self) -> Result<FlaggedContent> {
    Ok(FlaggedContent {
      flagged_id:   decode_uuid(&self.flagged_id)?,
      content_type: decode_content_type(&self.content_type)?,
      content_id:   decode_uuid(&self.content_id)?,
      author_id:    decode_uuid(&self.author_id)?,
      reason:       self.reason,
      flags:        decode_flags(&self.flags)?,
      score:        self.score,
      status:       decode_review_status(&self.status)?,
      created_at:   decode_dt(&self.created_at)?,
      resolved_at:  self.resolved_at.as_deref().map(decode_dt).transpose()?,
      resolved_by:  self.resolved_by.as_deref().map(decode_uuid).transpose()?,
    })
  }
}

/// Activity columns joined with the actor's display name and the debate
/// title. Expects `activity AS a`, `users AS u` and `debates AS d`.
pub const ACTIVITY_COLUMNS: &str = "
  a.activity_id, a.debate_id, d.title, a.action, a.target_id, a.actor_id,
  u.display_name, a.is_anonymous, a.created_at";

pub struct RawActivity {
  pub activity_id:  String,
  pub debate_id:    String,
  pub debate_title: String,
  pub action:       String,
  pub target_id:    String,
  pub actor_id:     String,
  pub actor_name:   String,
  pub is_anonymous: bool,
  pub created_at:   String,
}

impl RawActivity {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      activity_id:  row.get(0)?,
      debate_id:    row.get(1)?,
      debate_title: row.get(2)?,
      action:       row.get(3)?,
      target_id:    row.get(4)?,
      actor_id:     row.get(5)?,
      actor_name:   row.get(6)?,
      is_anonymous: row.get(7)?,
      created_at:   row.get(8)?,
    })
  }

  /// Anonymous entries lose their actor.
  pub fn into_activity(self) -> Result<Activity> {
    let (actor_id, actor_name) = if self.is_anonymous {
      (None, None)
    } else {
      (Some(decode_uuid(&self.actor_id)?), Some(self.actor_name))
    };
    Ok(Activity {
      activity_id: decode_uuid(&self.activity_id)?,
      debate_id: decode_uuid(&self.debate_id)?,
      debate_title: self.debate_title,
      action: decode_action(&self.action)?,
      target_id: decode_uuid(&self.target_id)?,
      actor_id,
      actor_name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
