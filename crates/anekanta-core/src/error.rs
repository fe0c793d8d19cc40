//! Error types for `anekanta-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  Validation(String),

  #[error("debate not found: {0}")]
  DebateNotFound(Uuid),

  #[error("argument not found: {0}")]
  ArgumentNotFound(Uuid),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("flagged item not found: {0}")]
  FlaggedNotFound(Uuid),

  #[error("authentication required")]
  Unauthenticated,

  #[error("the {0} role is required")]
  Forbidden(&'static str),

  #[error("write conflict: {0}")]
  Conflict(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// The coarse category of a failure, independent of the backend that raised
/// it. Transport layers pick status codes from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
  Validation,
  NotFound,
  Unauthenticated,
  Forbidden,
  Conflict,
  /// Anything the caller cannot act on: I/O, corrupt rows, driver failures.
  Internal,
}

/// Implemented by every error type that can cross the store boundary.
pub trait Classify {
  fn class(&self) -> ErrorClass;
}

impl Classify for Error {
  fn class(&self) -> ErrorClass {
    match self {
      Self::Validation(_) => ErrorClass::Validation,
      Self::DebateNotFound(_)
      | Self::ArgumentNotFound(_)
      | Self::UserNotFound(_)
      | Self::FlaggedNotFound(_) => ErrorClass::NotFound,
      Self::Unauthenticated => ErrorClass::Unauthenticated,
      Self::Forbidden(_) => ErrorClass::Forbidden,
      Self::Conflict(_) => ErrorClass::Conflict,
    }
  }
}

impl Error {
  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }
}
