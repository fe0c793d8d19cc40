//! [`SqliteStore`], the SQLite implementation of [`DebateStore`].

use std::{collections::HashMap, path::Path};

use anekanta_core::{
  activity::{Activity, ActivityAction, ActivityQuery},
  argument::{Argument, ArgumentKind, MAX_DEPTH, NewArgument},
  comment::{Comment, NewComment},
  debate::{Debate, DebatePage, DebateQuery, DebateSort, DebateStatus, DebateSummary, NewDebate, PAGE_SIZE},
  moderation::ModerationReport,
  reaction::{ReactionCount, ReactionKind, ReactionSummary, ReactionToggle, Toggled},
  review::{ContentType, FlaggedContent, ModerationStats, ReviewStatus},
  store::DebateStore,
  user::{Credentials, NewUser, User},
  vote::{self, Impact, VoteLedger, VoteResult},
};
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use crate::{
  encode::{
    ACTIVITY_COLUMNS, ARGUMENT_COLUMNS, COMMENT_COLUMNS, DEBATE_SUMMARY_COLUMNS,
    FLAGGED_COLUMNS, RawActivity, RawArgument, RawComment, RawDebateSummary, RawFlagged,
    RawUser, USER_COLUMNS, decode_count, decode_debate_status, decode_reaction_kind,
    decode_uuid, encode_action, encode_content_type, encode_debate_status, encode_dt,
    encode_flags, encode_kind, encode_reaction_kind, encode_review_status, encode_role,
    encode_uuid, now,
  },
  schema::SCHEMA,
  Error, Result,
};

type CoreError = anekanta_core::Error;

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Anekanta debate store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::info!(path = %path.display(), "opened debate store");
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Mark a debate closed so it stops accepting arguments.
  pub async fn close_debate(&self, debate_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(debate_id);
    let closed = encode_debate_status(DebateStatus::Closed);
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE debates SET status = ?2 WHERE debate_id = ?1",
          rusqlite::params![id_str, closed],
        )?)
      })
      .await?;
    if updated == 0 {
      return Err(CoreError::DebateNotFound(debate_id).into());
    }
    Ok(())
  }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────
//
// These run on the connection thread, usually inside a transaction opened by
// the caller.

fn insert_argument(conn: &rusqlite::Connection, argument: &Argument) -> Result<()> {
  conn.execute(
    "INSERT INTO arguments (
       argument_id, debate_id, parent_id, author_id, content, kind, depth,
       vote_score, is_anonymous, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    rusqlite::params![
      encode_uuid(argument.argument_id),
      encode_uuid(argument.debate_id),
      argument.parent_id.map(encode_uuid),
      encode_uuid(argument.author_id),
      argument.content,
      encode_kind(argument.kind),
      i64::from(argument.depth),
      argument.vote_score,
      argument.is_anonymous,
      encode_dt(argument.created_at),
      encode_dt(argument.updated_at),
    ],
  )?;
  Ok(())
}

/// Queue accepted-but-flagged content for a moderator.
fn insert_flagged(
  conn: &rusqlite::Connection,
  content_type: ContentType,
  content_id: Uuid,
  author_id: Uuid,
  report: &ModerationReport,
  at: DateTime<Utc>,
) -> Result<()> {
  conn.execute(
    "INSERT INTO flagged_content (
       flagged_id, content_type, content_id, author_id, reason, flags, score,
       status, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    rusqlite::params![
      encode_uuid(Uuid::new_v4()),
      encode_content_type(content_type),
      encode_uuid(content_id),
      encode_uuid(author_id),
      report.reason(),
      encode_flags(&report.flags)?,
      report.score,
      encode_review_status(ReviewStatus::Pending),
      encode_dt(at),
    ],
  )?;
  tracing::debug!(?content_type, %content_id, score = report.score, "queued for review");
  Ok(())
}

/// One feed entry describing a write made in the same transaction.
struct ActivityEntry {
  debate_id:    Uuid,
  actor_id:     Uuid,
  action:       ActivityAction,
  target_id:    Uuid,
  is_anonymous: bool,
  at:           DateTime<Utc>,
}

fn insert_activity(conn: &rusqlite::Connection, entry: ActivityEntry) -> Result<()> {
  conn.execute(
    "INSERT INTO activity (
       activity_id, debate_id, actor_id, action, target_id, is_anonymous, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    rusqlite::params![
      encode_uuid(Uuid::new_v4()),
      encode_uuid(entry.debate_id),
      encode_uuid(entry.actor_id),
      encode_action(entry.action),
      encode_uuid(entry.target_id),
      entry.is_anonymous,
      encode_dt(entry.at),
    ],
  )?;
  Ok(())
}

fn argument_exists(conn: &rusqlite::Connection, argument_id: Uuid) -> Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM arguments WHERE argument_id = ?1",
        rusqlite::params![encode_uuid(argument_id)],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

fn select_flagged(conn: &rusqlite::Connection, flagged_id: Uuid) -> Result<Option<FlaggedContent>> {
  let raw = conn
    .query_row(
      &format!("SELECT {FLAGGED_COLUMNS} FROM flagged_content WHERE flagged_id = ?1"),
      rusqlite::params![encode_uuid(flagged_id)],
      RawFlagged::from_row,
    )
    .optional()?;
  raw.map(RawFlagged::into_flagged).transpose()
}

/// Escape `%`, `_` and `\` so user text matches literally under
/// `LIKE ... ESCAPE '\'`, and wrap it for a substring match.
fn like_pattern(text: &str) -> String {
  let mut pattern = String::with_capacity(text.len() + 2);
  pattern.push('%');
  for c in text.chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

fn order_clause(sort: DebateSort) -> &'static str {
  match sort {
    DebateSort::Recent => "d.created_at DESC, d.debate_id",
    DebateSort::Popular => "argument_count DESC, d.created_at DESC, d.debate_id",
    DebateSort::Active => "d.updated_at DESC, d.debate_id",
  }
}

// ─── Write paths ─────────────────────────────────────────────────────────────

fn create_debate_tx(
  conn: &mut rusqlite::Connection,
  input: NewDebate,
  review: Option<ModerationReport>,
) -> Result<(Debate, Argument)> {
  let at = now();
  let debate = Debate {
    debate_id:    Uuid::new_v4(),
    title:        input.title,
    description:  input.description,
    thesis:       input.thesis,
    author_id:    input.author_id,
    category:     input.category,
    status:       DebateStatus::Active,
    is_anonymous: input.is_anonymous,
    created_at:   at,
    updated_at:   at,
  };
  let root = Argument {
    argument_id:  Uuid::new_v4(),
    debate_id:    debate.debate_id,
    parent_id:    None,
    author_id:    debate.author_id,
    content:      debate.thesis.clone(),
    kind:         ArgumentKind::Thesis,
    depth:        0,
    vote_score:   0,
    is_anonymous: debate.is_anonymous,
    created_at:   at,
    updated_at:   at,
  };

  let tx = conn.transaction()?;
  tx.execute(
    "INSERT INTO debates (
       debate_id, title, description, thesis, author_id, category, status,
       is_anonymous, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    rusqlite::params![
      encode_uuid(debate.debate_id),
      debate.title,
      debate.description,
      debate.thesis,
      encode_uuid(debate.author_id),
      debate.category.as_str(),
      encode_debate_status(debate.status),
      debate.is_anonymous,
      encode_dt(debate.created_at),
      encode_dt(debate.updated_at),
    ],
  )?;
  insert_argument(&tx, &root)?;
  if let Some(report) = &review {
    insert_flagged(&tx, ContentType::Debate, debate.debate_id, debate.author_id, report, at)?;
  }
  insert_activity(&tx, ActivityEntry {
    debate_id:    debate.debate_id,
    actor_id:     debate.author_id,
    action:       ActivityAction::Created,
    target_id:    debate.debate_id,
    is_anonymous: debate.is_anonymous,
    at,
  })?;
  tx.commit()?;

  Ok((debate, root))
}

fn create_argument_tx(
  conn: &mut rusqlite::Connection,
  input: NewArgument,
  review: Option<ModerationReport>,
) -> Result<Argument> {
  if input.kind == ArgumentKind::Thesis {
    return Err(CoreError::validation("a debate has exactly one thesis").into());
  }

  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let debate_str = encode_uuid(input.debate_id);

  let status: Option<String> = tx
    .query_row(
      "SELECT status FROM debates WHERE debate_id = ?1",
      rusqlite::params![debate_str],
      |r| r.get(0),
    )
    .optional()?;
  let status = status.ok_or(CoreError::DebateNotFound(input.debate_id))?;
  if decode_debate_status(&status)? == DebateStatus::Closed {
    return Err(CoreError::validation("debate is closed").into());
  }

  let parent_depth: Option<i64> = tx
    .query_row(
      "SELECT depth FROM arguments WHERE argument_id = ?1 AND debate_id = ?2",
      rusqlite::params![encode_uuid(input.parent_id), debate_str],
      |r| r.get(0),
    )
    .optional()?;
  let parent_depth = parent_depth.ok_or(CoreError::ArgumentNotFound(input.parent_id))?;
  let depth = u32::try_from(parent_depth + 1)
    .map_err(|_| Error::Decode(format!("argument depth out of range: {parent_depth}")))?;
  if depth > MAX_DEPTH {
    return Err(CoreError::validation(format!("replies cannot nest deeper than {MAX_DEPTH} levels")).into());
  }

  let at = now();
  let argument = Argument {
    argument_id: Uuid::new_v4(),
    debate_id: input.debate_id,
    parent_id: Some(input.parent_id),
    author_id: input.author_id,
    content: input.content,
    kind: input.kind,
    depth,
    vote_score: 0,
    is_anonymous: input.is_anonymous,
    created_at: at,
    updated_at: at,
  };
  insert_argument(&tx, &argument)?;
  if let Some(report) = &review {
    insert_flagged(&tx, ContentType::Argument, argument.argument_id, argument.author_id, report, at)?;
  }
  insert_activity(&tx, ActivityEntry {
    debate_id:    argument.debate_id,
    actor_id:     argument.author_id,
    action:       ActivityAction::AddedArgument,
    target_id:    argument.argument_id,
    is_anonymous: argument.is_anonymous,
    at,
  })?;
  tx.execute(
    "UPDATE debates SET updated_at = ?2 WHERE debate_id = ?1",
    rusqlite::params![debate_str, encode_dt(at)],
  )?;
  tx.commit()?;

  Ok(argument)
}

fn add_comment_tx(
  conn: &mut rusqlite::Connection,
  input: NewComment,
  review: Option<ModerationReport>,
) -> Result<Comment> {
  let tx = conn.transaction()?;
  let debate_id: Option<String> = tx
    .query_row(
      "SELECT debate_id FROM arguments WHERE argument_id = ?1",
      rusqlite::params![encode_uuid(input.argument_id)],
      |r| r.get(0),
    )
    .optional()?;
  let debate_id = decode_uuid(&debate_id.ok_or(CoreError::ArgumentNotFound(input.argument_id))?)?;

  let comment = Comment {
    comment_id:   Uuid::new_v4(),
    argument_id:  input.argument_id,
    author_id:    input.author_id,
    content:      input.content,
    is_anonymous: input.is_anonymous,
    created_at:   now(),
  };
  tx.execute(
    "INSERT INTO comments (comment_id, argument_id, author_id, content, is_anonymous, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      encode_uuid(comment.comment_id),
      encode_uuid(comment.argument_id),
      encode_uuid(comment.author_id),
      comment.content,
      comment.is_anonymous,
      encode_dt(comment.created_at),
    ],
  )?;
  if let Some(report) = &review {
    insert_flagged(&tx, ContentType::Comment, comment.comment_id, comment.author_id, report, comment.created_at)?;
  }
  insert_activity(&tx, ActivityEntry {
    debate_id,
    actor_id: comment.author_id,
    action: ActivityAction::Commented,
    target_id: comment.argument_id,
    is_anonymous: comment.is_anonymous,
    at: comment.created_at,
  })?;
  tx.commit()?;

  Ok(comment)
}

fn resolve_flagged_tx(
  conn: &mut rusqlite::Connection,
  flagged_id: Uuid,
  status: ReviewStatus,
  resolver: Uuid,
) -> Result<FlaggedContent> {
  let tx = conn.transaction()?;
  let updated = tx.execute(
    "UPDATE flagged_content
     SET status = ?2, resolved_at = ?3, resolved_by = ?4
     WHERE flagged_id = ?1",
    rusqlite::params![
      encode_uuid(flagged_id),
      encode_review_status(status),
      encode_dt(now()),
      encode_uuid(resolver),
    ],
  )?;
  if updated == 0 {
    return Err(CoreError::FlaggedNotFound(flagged_id).into());
  }
  let entry = select_flagged(&tx, flagged_id)?.ok_or(CoreError::FlaggedNotFound(flagged_id))?;
  tx.commit()?;
  Ok(entry)
}

// ─── Vote ledger ─────────────────────────────────────────────────────────────

/// The vote rows of one `IMMEDIATE` transaction. SQLite takes the write lock
/// when the transaction begins, so no other writer can interleave between the
/// vote write and the score recompute.
struct SqliteLedger<'c> {
  conn: &'c rusqlite::Connection,
}

impl VoteLedger for SqliteLedger<'_> {
  type Error = Error;

  fn argument_exists(&mut self, argument_id: Uuid) -> Result<bool> {
    argument_exists(self.conn, argument_id)
  }

  fn upsert_vote(&mut self, argument_id: Uuid, voter_id: Uuid, impact: Impact) -> Result<()> {
    self.conn.execute(
      "INSERT INTO votes (vote_id, argument_id, voter_id, value, created_at)
       VALUES (?1, ?2, ?3, ?4, ?5)
       ON CONFLICT (argument_id, voter_id) DO UPDATE SET value = excluded.value",
      rusqlite::params![
        encode_uuid(Uuid::new_v4()),
        encode_uuid(argument_id),
        encode_uuid(voter_id),
        impact.value(),
        encode_dt(now()),
      ],
    )?;
    Ok(())
  }

  fn delete_vote(&mut self, argument_id: Uuid, voter_id: Uuid) -> Result<()> {
    self.conn.execute(
      "DELETE FROM votes WHERE argument_id = ?1 AND voter_id = ?2",
      rusqlite::params![encode_uuid(argument_id), encode_uuid(voter_id)],
    )?;
    Ok(())
  }

  fn vote_values(&mut self, argument_id: Uuid) -> Result<Vec<Impact>> {
    let mut stmt = self
      .conn
      .prepare_cached("SELECT value FROM votes WHERE argument_id = ?1")?;
    let values = stmt
      .query_map(rusqlite::params![encode_uuid(argument_id)], |r| r.get::<_, u8>(0))?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    values
      .into_iter()
      .map(|v| Impact::try_from(v).map_err(Error::from))
      .collect()
  }

  fn update_argument_score(&mut self, argument_id: Uuid, score: i64) -> Result<()> {
    self.conn.execute(
      "UPDATE arguments SET vote_score = ?2 WHERE argument_id = ?1",
      rusqlite::params![encode_uuid(argument_id), score],
    )?;
    Ok(())
  }
}

fn cast_vote_tx(
  conn: &mut rusqlite::Connection,
  argument_id: Uuid,
  voter_id: Uuid,
  value: i64,
) -> Result<VoteResult> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let result = vote::cast_vote(&mut SqliteLedger { conn: &tx }, argument_id, voter_id, value)?;
  tx.commit()?;
  Ok(result)
}

// ─── Reactions ───────────────────────────────────────────────────────────────

fn toggle_reaction_tx(
  conn: &mut rusqlite::Connection,
  argument_id: Uuid,
  user_id: Uuid,
  kind: ReactionKind,
) -> Result<ReactionToggle> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  if !argument_exists(&tx, argument_id)? {
    return Err(CoreError::ArgumentNotFound(argument_id).into());
  }

  let removed = tx.execute(
    "DELETE FROM reactions WHERE argument_id = ?1 AND user_id = ?2 AND kind = ?3",
    rusqlite::params![encode_uuid(argument_id), encode_uuid(user_id), encode_reaction_kind(kind)],
  )?;
  let toggled = if removed > 0 {
    Toggled::Off
  } else {
    tx.execute(
      "INSERT INTO reactions (argument_id, user_id, kind, created_at)
       VALUES (?1, ?2, ?3, ?4)",
      rusqlite::params![
        encode_uuid(argument_id),
        encode_uuid(user_id),
        encode_reaction_kind(kind),
        encode_dt(now()),
      ],
    )?;
    Toggled::On
  };
  tx.commit()?;

  Ok(ReactionToggle { kind, toggled })
}

fn reactions_query(
  conn: &mut rusqlite::Connection,
  argument_id: Uuid,
  viewer: Option<Uuid>,
) -> Result<ReactionSummary> {
  let tx = conn.transaction()?;
  if !argument_exists(&tx, argument_id)? {
    return Err(CoreError::ArgumentNotFound(argument_id).into());
  }
  let id_str = encode_uuid(argument_id);

  let mut counts = {
    let mut stmt = tx.prepare_cached(
      "SELECT kind, COUNT(*) FROM reactions WHERE argument_id = ?1 GROUP BY kind",
    )?;
    let rows = stmt
      .query_map(rusqlite::params![id_str], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    rows
      .into_iter()
      .map(|(kind, count)| -> Result<ReactionCount> {
        Ok(ReactionCount {
          kind:  decode_reaction_kind(&kind)?,
          count: decode_count(count, "reaction count")?,
        })
      })
      .collect::<Result<Vec<_>>>()?
  };
  counts.sort_by_key(|c| c.kind);

  let mut mine = match viewer {
    Some(user_id) => {
      let mut stmt = tx.prepare_cached(
        "SELECT kind FROM reactions WHERE argument_id = ?1 AND user_id = ?2",
      )?;
      let rows = stmt
        .query_map(rusqlite::params![id_str, encode_uuid(user_id)], |r| r.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      rows
        .iter()
        .map(|kind| decode_reaction_kind(kind))
        .collect::<Result<Vec<_>>>()?
    }
    None => Vec::new(),
  };
  mine.sort();

  Ok(ReactionSummary { counts, mine })
}

// ─── DebateStore impl ────────────────────────────────────────────────────────

impl DebateStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let username = input.username.trim().to_lowercase();
    if username.is_empty() {
      return Err(CoreError::validation("username is required").into());
    }

    let user = User {
      user_id: Uuid::new_v4(),
      username,
      display_name: input.display_name,
      role: input.role,
      created_at: now(),
    };

    let id_str = encode_uuid(user.user_id);
    let username = user.username.clone();
    let display_name = user.display_name.clone();
    let role_str = encode_role(user.role);
    let at_str = encode_dt(user.created_at);
    let hash = input.password_hash;

    self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO users (user_id, username, display_name, password_hash, role, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, username, display_name, hash, role_str, at_str],
        );
        Ok(inserted.map_err(Error::from))
      })
      .await??;

    tracing::info!(user = %user.user_id, username = %user.username, role = ?user.role, "user added");
    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
            rusqlite::params![id_str],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>> {
    let name = username.trim().to_lowercase();

    let raw: Option<(RawUser, String)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = ?1"),
            rusqlite::params![name],
            |row| Ok((RawUser::from_row(row)?, row.get(5)?)),
          )
          .optional()?)
      })
      .await?;

    raw
      .map(|(user, password_hash)| -> Result<Credentials> {
        Ok(Credentials { user: user.into_user()?, password_hash })
      })
      .transpose()
  }

  // ── Debates ───────────────────────────────────────────────────────────────

  async fn create_debate(
    &self,
    input: NewDebate,
    review: Option<ModerationReport>,
  ) -> Result<(Debate, Argument)> {
    self
      .conn
      .call(move |conn| Ok(create_debate_tx(conn, input, review)))
      .await?
  }

  async fn get_debate(&self, id: Uuid) -> Result<Option<DebateSummary>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawDebateSummary> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {DEBATE_SUMMARY_COLUMNS} FROM debates d WHERE d.debate_id = ?1"),
            rusqlite::params![id_str],
            RawDebateSummary::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawDebateSummary::into_summary).transpose()
  }

  async fn list_debates(&self, query: &DebateQuery) -> Result<DebatePage> {
    let page = query.page();
    let category = query.category.map(|c| c.as_str());
    let search = query
      .search
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(like_pattern);
    let order = order_clause(query.sort);
    let limit = i64::from(PAGE_SIZE);
    let offset = i64::try_from(query.offset()).unwrap_or(i64::MAX);
    let active = encode_debate_status(DebateStatus::Active);

    let (raws, total): (Vec<RawDebateSummary>, i64) = self
      .conn
      .call(move |conn| {
        let filter = "d.status = ?1
           AND (?2 IS NULL OR d.category = ?2)
           AND (?3 IS NULL OR d.title LIKE ?3 ESCAPE '\\' OR d.thesis LIKE ?3 ESCAPE '\\')";

        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM debates d WHERE {filter}"),
          rusqlite::params![active, category, search],
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {DEBATE_SUMMARY_COLUMNS}
           FROM debates d
           WHERE {filter}
           ORDER BY {order}
           LIMIT ?4 OFFSET ?5"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![active, category, search, limit, offset],
            RawDebateSummary::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, total))
      })
      .await?;

    let debates = raws
      .into_iter()
      .map(RawDebateSummary::into_summary)
      .collect::<Result<Vec<_>>>()?;
    let total = u64::try_from(total).unwrap_or_default();

    Ok(DebatePage::new(debates, total, page))
  }

  // ── Arguments ─────────────────────────────────────────────────────────────

  async fn get_argument(&self, id: Uuid) -> Result<Option<Argument>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawArgument> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ARGUMENT_COLUMNS} FROM arguments WHERE argument_id = ?1"),
            rusqlite::params![id_str],
            RawArgument::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawArgument::into_argument).transpose()
  }

  async fn get_arguments_by_debate(&self, debate_id: Uuid) -> Result<Vec<Argument>> {
    let id_str = encode_uuid(debate_id);

    let raws: Vec<RawArgument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ARGUMENT_COLUMNS} FROM arguments WHERE debate_id = ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawArgument::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawArgument::into_argument).collect()
  }

  async fn create_argument(
    &self,
    input: NewArgument,
    review: Option<ModerationReport>,
  ) -> Result<Argument> {
    self
      .conn
      .call(move |conn| Ok(create_argument_tx(conn, input, review)))
      .await?
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  async fn cast_vote(&self, argument_id: Uuid, voter_id: Uuid, value: i64) -> Result<VoteResult> {
    self
      .conn
      .call(move |conn| Ok(cast_vote_tx(conn, argument_id, voter_id, value)))
      .await?
  }

  async fn user_votes_in_debate(
    &self,
    debate_id: Uuid,
    voter_id: Uuid,
  ) -> Result<HashMap<Uuid, Impact>> {
    let debate_str = encode_uuid(debate_id);
    let voter_str = encode_uuid(voter_id);

    let raws: Vec<(String, u8)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT v.argument_id, v.value
           FROM votes v
           JOIN arguments a ON a.argument_id = v.argument_id
           WHERE a.debate_id = ?1 AND v.voter_id = ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![debate_str, voter_str], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(id, value)| -> Result<(Uuid, Impact)> {
        Ok((decode_uuid(&id)?, Impact::try_from(value)?))
      })
      .collect()
  }

  // ── Reactions ─────────────────────────────────────────────────────────────

  async fn toggle_reaction(
    &self,
    argument_id: Uuid,
    user_id: Uuid,
    kind: ReactionKind,
  ) -> Result<ReactionToggle> {
    self
      .conn
      .call(move |conn| Ok(toggle_reaction_tx(conn, argument_id, user_id, kind)))
      .await?
  }

  async fn reactions(&self, argument_id: Uuid, viewer: Option<Uuid>) -> Result<ReactionSummary> {
    self
      .conn
      .call(move |conn| Ok(reactions_query(conn, argument_id, viewer)))
      .await?
  }

  // ── Activity ──────────────────────────────────────────────────────────────

  async fn list_activity(&self, query: &ActivityQuery) -> Result<Vec<Activity>> {
    let debate_str = query.debate_id.map(encode_uuid);
    let limit = i64::try_from(query.limit()).unwrap_or(i64::MAX);

    let raws: Vec<RawActivity> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ACTIVITY_COLUMNS}
           FROM activity a
           JOIN users u ON u.user_id = a.actor_id
           JOIN debates d ON d.debate_id = a.debate_id
           WHERE (?1 IS NULL OR a.debate_id = ?1)
           ORDER BY a.created_at DESC, a.rowid DESC
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![debate_str, limit], RawActivity::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawActivity::into_activity).collect()
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn add_comment(
    &self,
    input: NewComment,
    review: Option<ModerationReport>,
  ) -> Result<Comment> {
    self
      .conn
      .call(move |conn| Ok(add_comment_tx(conn, input, review)))
      .await?
  }

  async fn list_comments(&self, argument_id: Uuid) -> Result<Vec<Comment>> {
    let id_str = encode_uuid(argument_id);

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS} FROM comments
           WHERE argument_id = ?1
           ORDER BY created_at, comment_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  // ── Review queue ──────────────────────────────────────────────────────────

  async fn list_flagged(
    &self,
    status: Option<ReviewStatus>,
    limit: usize,
  ) -> Result<Vec<FlaggedContent>> {
    let status_str = status.map(encode_review_status);
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawFlagged> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FLAGGED_COLUMNS} FROM flagged_content
           WHERE (?1 IS NULL OR status = ?1)
           ORDER BY created_at DESC, flagged_id
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![status_str, limit], RawFlagged::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFlagged::into_flagged).collect()
  }

  async fn resolve_flagged(
    &self,
    flagged_id: Uuid,
    status: ReviewStatus,
    resolver: Uuid,
  ) -> Result<FlaggedContent> {
    self
      .conn
      .call(move |conn| Ok(resolve_flagged_tx(conn, flagged_id, status, resolver)))
      .await?
  }

  async fn moderation_stats(&self) -> Result<ModerationStats> {
    let pending = encode_review_status(ReviewStatus::Pending);

    let counts: [i64; 4] = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT
             (SELECT COUNT(*) FROM users),
             (SELECT COUNT(*) FROM debates),
             (SELECT COUNT(*) FROM arguments),
             (SELECT COUNT(*) FROM flagged_content WHERE status = ?1)",
          rusqlite::params![pending],
          |r| Ok([r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?]),
        )?)
      })
      .await?;

    let [users, debates, arguments, flags] = counts;
    Ok(ModerationStats {
      total_users:     decode_count(users, "user count")?,
      total_debates:   decode_count(debates, "debate count")?,
      total_arguments: decode_count(arguments, "argument count")?,
      pending_flags:   decode_count(flags, "pending flag count")?,
    })
  }
}
