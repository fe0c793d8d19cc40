//! SQL schema for the Anekanta SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for later migrations.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,   -- lower-cased
    display_name  TEXT NOT NULL,
    password_hash TEXT NOT NULL,          -- argon2 PHC string
    role          TEXT NOT NULL DEFAULT 'user',
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS debates (
    debate_id    TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    description  TEXT NOT NULL DEFAULT '',
    thesis       TEXT NOT NULL,
    author_id    TEXT NOT NULL REFERENCES users(user_id),
    category     TEXT NOT NULL DEFAULT 'general',
    status       TEXT NOT NULL DEFAULT 'active',   -- 'active' | 'closed'
    is_anonymous INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

-- Only the vote path updates vote_score.
CREATE TABLE IF NOT EXISTS arguments (
    argument_id  TEXT PRIMARY KEY,
    debate_id    TEXT NOT NULL REFERENCES debates(debate_id),
    parent_id    TEXT REFERENCES arguments(argument_id),
    author_id    TEXT NOT NULL REFERENCES users(user_id),
    content      TEXT NOT NULL,
    kind         TEXT NOT NULL,   -- 'thesis' | 'pro' | 'con'
    depth        INTEGER NOT NULL,
    vote_score   INTEGER NOT NULL DEFAULT 0,
    is_anonymous INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    CHECK ((kind = 'thesis') = (parent_id IS NULL))
);

CREATE TABLE IF NOT EXISTS votes (
    vote_id     TEXT PRIMARY KEY,
    argument_id TEXT NOT NULL REFERENCES arguments(argument_id),
    voter_id    TEXT NOT NULL REFERENCES users(user_id),
    value       INTEGER NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (argument_id, voter_id),
    CHECK  (value BETWEEN 1 AND 4)
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id   TEXT PRIMARY KEY,
    argument_id  TEXT NOT NULL REFERENCES arguments(argument_id),
    author_id    TEXT NOT NULL REFERENCES users(user_id),
    content      TEXT NOT NULL,
    is_anonymous INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS flagged_content (
    flagged_id   TEXT PRIMARY KEY,
    content_type TEXT NOT NULL,   -- 'debate' | 'argument' | 'comment'
    content_id   TEXT NOT NULL,
    author_id    TEXT NOT NULL REFERENCES users(user_id),
    reason       TEXT NOT NULL,
    flags        TEXT NOT NULL DEFAULT '[]',   -- JSON array of flags
    score        REAL NOT NULL,
    status       TEXT NOT NULL DEFAULT 'pending',
    created_at   TEXT NOT NULL,
    resolved_at  TEXT,
    resolved_by  TEXT REFERENCES users(user_id)
);

CREATE TABLE IF NOT EXISTS reactions (
    argument_id TEXT NOT NULL REFERENCES arguments(argument_id),
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    kind        TEXT NOT NULL,   -- 'insightful' | 'agree' | 'disagree' | 'thought_provoking'
    created_at  TEXT NOT NULL,
    PRIMARY KEY (argument_id, user_id, kind)
);

-- Append-only; written in the same transaction as the content it describes.
CREATE TABLE IF NOT EXISTS activity (
    activity_id  TEXT PRIMARY KEY,
    debate_id    TEXT NOT NULL REFERENCES debates(debate_id),
    actor_id     TEXT NOT NULL REFERENCES users(user_id),
    action       TEXT NOT NULL,   -- 'created' | 'added_argument' | 'commented'
    target_id    TEXT NOT NULL,
    is_anonymous INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS arguments_debate_idx ON arguments(debate_id);
CREATE INDEX IF NOT EXISTS arguments_parent_idx ON arguments(parent_id);
CREATE INDEX IF NOT EXISTS votes_argument_idx   ON votes(argument_id);
CREATE INDEX IF NOT EXISTS comments_argument_idx ON comments(argument_id);
CREATE INDEX IF NOT EXISTS debates_listing_idx  ON debates(status, category, created_at);
CREATE INDEX IF NOT EXISTS flagged_status_idx   ON flagged_content(status, created_at);
CREATE INDEX IF NOT EXISTS activity_debate_idx  ON activity(debate_id, created_at);
CREATE INDEX IF NOT EXISTS activity_recent_idx  ON activity(created_at);

PRAGMA user_version = 2;
";
