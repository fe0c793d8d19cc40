//! Users and the authenticated caller.
//!
//! Sessions and profile pages live outside this crate. The core only needs to
//! know who is acting and whether they hold the admin role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  User,
  Admin,
}

/// A registered account. The password hash never leaves the store except via
/// [`Credentials`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:      Uuid,
  /// Always lower-case.
  pub username:     String,
  pub display_name: String,
  pub role:         Role,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::DebateStore::add_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub display_name:  String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub role:          Role,
}

/// A user together with their stored password hash, for verification only.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub user:          User,
  pub password_hash: String,
}

// ─── Principal ───────────────────────────────────────────────────────────────

/// The caller of an operation, as resolved by the auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
  pub user_id: Uuid,
  pub role:    Role,
}

impl Principal {
  pub fn is_admin(&self) -> bool { self.role == Role::Admin }

  pub fn require_admin(&self) -> Result<()> {
    if self.is_admin() {
      Ok(())
    } else {
      Err(Error::Forbidden("admin"))
    }
  }
}

impl From<&User> for Principal {
  fn from(user: &User) -> Self {
    Self {
      user_id: user.user_id,
      role:    user.role,
    }
  }
}

/// Turn an optional caller into a required one.
pub fn require(principal: Option<Principal>) -> Result<Principal> {
  principal.ok_or(Error::Unauthenticated)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_principal_is_unauthenticated() {
    assert!(matches!(require(None), Err(Error::Unauthenticated)));
  }

  #[test]
  fn plain_user_cannot_act_as_admin() {
    let p = Principal { user_id: Uuid::new_v4(), role: Role::User };
    assert!(matches!(p.require_admin(), Err(Error::Forbidden("admin"))));

    let admin = Principal { role: Role::Admin, ..p };
    assert!(admin.require_admin().is_ok());
  }
}
