//! Error type for `anekanta-store-sqlite`.

use anekanta_core::{Classify, ErrorClass};
use rusqlite::{ErrorCode, ffi};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] anekanta_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A column held a value this version cannot interpret.
  #[error("decode error: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Busy and locked failures, and unique-key violations, are conflicts
/// between writers; the caller may retry them. Everything else, foreign-key
/// and check failures included, stays a driver error.
impl From<rusqlite::Error> for Error {
  fn from(err: rusqlite::Error) -> Self {
    match conflict_kind(&err) {
      Some(Conflict::Busy) => {
        Self::Core(anekanta_core::Error::Conflict("database is busy".into()))
      }
      Some(Conflict::Duplicate) => {
        Self::Core(anekanta_core::Error::Conflict(err.to_string()))
      }
      None => Self::Sqlite(err),
    }
  }
}

enum Conflict {
  Busy,
  Duplicate,
}

fn conflict_kind(err: &rusqlite::Error) -> Option<Conflict> {
  let rusqlite::Error::SqliteFailure(failure, _) = err else {
    return None;
  };
  match (failure.code, failure.extended_code) {
    (ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked, _) => Some(Conflict::Busy),
    (
      ErrorCode::ConstraintViolation,
      ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY,
    ) => Some(Conflict::Duplicate),
    _ => None,
  }
}

impl Classify for Error {
  fn class(&self) -> ErrorClass {
    match self {
      Self::Core(e) => e.class(),
      Self::Database(tokio_rusqlite::Error::Rusqlite(e)) if conflict_kind(e).is_some() => {
        ErrorClass::Conflict
      }
      _ => ErrorClass::Internal,
    }
  }
}
