//! Debates: the envelope that owns one argument tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Topic bucket used for filtering debate listings.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Politics,
  Philosophy,
  Science,
  Ethics,
  Technology,
  Economics,
  Education,
  Environment,
  Health,
  Society,
  Religion,
  Culture,
  Law,
  History,
  #[default]
  General,
}

impl Category {
  pub const ALL: [Category; 15] = [
    Self::Politics,
    Self::Philosophy,
    Self::Science,
    Self::Ethics,
    Self::Technology,
    Self::Economics,
    Self::Education,
    Self::Environment,
    Self::Health,
    Self::Society,
    Self::Religion,
    Self::Culture,
    Self::Law,
    Self::History,
    Self::General,
  ];

  /// The lower-case name used in URLs and in the `category` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Politics => "politics",
      Self::Philosophy => "philosophy",
      Self::Science => "science",
      Self::Ethics => "ethics",
      Self::Technology => "technology",
      Self::Economics => "economics",
      Self::Education => "education",
      Self::Environment => "environment",
      Self::Health => "health",
      Self::Society => "society",
      Self::Religion => "religion",
      Self::Culture => "culture",
      Self::Law => "law",
      Self::History => "history",
      Self::General => "general",
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|c| c.as_str() == name)
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DebateStatus {
  #[default]
  Active,
  /// No new arguments are accepted; votes and reads still work.
  Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debate {
  pub debate_id:    Uuid,
  pub title:        String,
  pub description:  String,
  /// Mirrors the content of the thesis root argument.
  pub thesis:       String,
  pub author_id:    Uuid,
  pub category:     Category,
  pub status:       DebateStatus,
  pub is_anonymous: bool,
  pub created_at:   DateTime<Utc>,
  /// Bumped whenever an argument is added.
  pub updated_at:   DateTime<Utc>,
}

/// A debate with the derived counters shown in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateSummary {
  #[serde(flatten)]
  pub debate:         Debate,
  pub argument_count: u64,
  pub vote_count:     u64,
}

/// Input to [`crate::store::DebateStore::create_debate`].
#[derive(Debug, Clone)]
pub struct NewDebate {
  pub title:        String,
  pub description:  String,
  pub thesis:       String,
  pub author_id:    Uuid,
  pub category:     Category,
  pub is_anonymous: bool,
}

// ─── Listing ─────────────────────────────────────────────────────────────────

/// Debates per listing page.
pub const PAGE_SIZE: u32 = 20;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DebateSort {
  /// Newest first.
  #[default]
  Recent,
  /// Most arguments first.
  Popular,
  /// Most recently updated first.
  Active,
}

/// Parameters for [`crate::store::DebateStore::list_debates`]. Only active
/// debates are listed.
#[derive(Debug, Clone, Default)]
pub struct DebateQuery {
  pub category: Option<Category>,
  /// Substring match over title and thesis.
  pub search:   Option<String>,
  pub sort:     DebateSort,
  /// 1-based; `0` is treated as `1`.
  pub page:     u32,
}

impl DebateQuery {
  pub fn page(&self) -> u32 { self.page.max(1) }

  pub fn offset(&self) -> u64 { u64::from(self.page() - 1) * u64::from(PAGE_SIZE) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebatePage {
  pub debates: Vec<DebateSummary>,
  pub total:   u64,
  pub page:    u32,
  pub pages:   u32,
}

impl DebatePage {
  pub fn new(debates: Vec<DebateSummary>, total: u64, page: u32) -> Self {
    let pages = total.div_ceil(u64::from(PAGE_SIZE));
    Self {
      debates,
      total,
      page,
      pages: u32::try_from(pages).unwrap_or(u32::MAX),
    }
  }
}
