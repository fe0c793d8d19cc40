//! Rule-based moderation scoring.
//!
//! [`score`] is a pure function from text to a [`ModerationResult`]: a fixed,
//! ordered set of rule categories runs over the text, each triggered category
//! appends a flag and adds to a running total, and the clamped total picks the
//! [`ModerationAction`]. There is no configuration and no shared mutable
//! state, so the scorer can be called from any number of threads at once.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// ─── Result types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
  Toxicity,
  Threat,
  PersonalAttack,
  Spam,
  FoulLanguage,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Low,
  Medium,
  High,
  Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationFlag {
  pub kind:     FlagKind,
  pub severity: Severity,
  pub detail:   String,
}

/// The disposition of a piece of text, ordered from mildest to harshest.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
  /// Accept silently.
  Allow,
  /// Accept, but show the author a caution.
  Warn,
  /// Accept and display, but queue for a moderator.
  Review,
  /// Reject; the caller must not persist the content.
  Block,
}

impl ModerationAction {
  /// Map a score in `[0, 1]` to an action. Each threshold is an inclusive
  /// lower bound.
  pub fn for_score(score: f64) -> Self {
    if score >= threshold(BLOCK_AT) {
      Self::Block
    } else if score >= threshold(REVIEW_AT) {
      Self::Review
    } else if score >= threshold(WARN_AT) {
      Self::Warn
    } else {
      Self::Allow
    }
  }

  fn for_points(points: u32) -> Self {
    if points >= BLOCK_AT {
      Self::Block
    } else if points >= REVIEW_AT {
      Self::Review
    } else if points >= WARN_AT {
      Self::Warn
    } else {
      Self::Allow
    }
  }

  pub fn is_approved(self) -> bool { matches!(self, Self::Allow | Self::Warn) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
  pub approved: bool,
  /// Clamped to `[0, 1]`; higher is worse.
  pub score:    f64,
  pub flags:    Vec<ModerationFlag>,
  pub action:   ModerationAction,
}

impl ModerationResult {
  pub fn is_blocked(&self) -> bool { self.action == ModerationAction::Block }

  /// The review-queue entry for accepted content, if any flag was raised.
  pub fn report(&self) -> Option<ModerationReport> {
    if self.is_blocked() || self.flags.is_empty() {
      return None;
    }
    Some(ModerationReport {
      score: self.score,
      flags: self.flags.clone(),
    })
  }
}

/// What a store needs to enqueue flagged content for review.
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationReport {
  pub score: f64,
  /// Never empty.
  pub flags: Vec<ModerationFlag>,
}

impl ModerationReport {
  pub fn reason(&self) -> &str {
    self.flags.first().map_or("", |f| f.detail.as_str())
  }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

// Scores are accumulated in hundredths so the thresholds compare exactly.
const TOXICITY_POINTS: u32 = 40;
const THREAT_POINTS: u32 = 50;
const PERSONAL_ATTACK_POINTS: u32 = 30;
const SPAM_POINTS_PER_INDICATOR: u32 = 20;
const PROFANITY_POINTS_PER_HIT: u32 = 15;
const MAX_POINTS: u32 = 100;

const BLOCK_AT: u32 = 70;
const REVIEW_AT: u32 = 40;
const WARN_AT: u32 = 15;

fn threshold(points: u32) -> f64 { f64::from(points) / 100.0 }

/// Length of a run of one repeated character that counts as spam.
const SPAM_RUN_LEN: usize = 6;
/// Number of links that counts as spam.
const SPAM_LINK_COUNT: usize = 2;

fn compile(patterns: &[&str]) -> Vec<Regex> {
  patterns
    .iter()
    .map(|p| Regex::new(p).expect("invalid moderation pattern"))
    .collect()
}

static TOXIC_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
  compile(&[
    // Hate phrasing
    r"(?i)\b(hate|kill|murder|destroy)\s+(all|every|them)\b",
    // Derogatory terms
    r"(?i)\b(idiot|stupid|moron|retard|dumb)\b",
    // Threat phrasing
    r"(?i)\b(i will|gonna|going to)\s+(kill|hurt|attack|destroy)\b",
    // Insults aimed at the reader
    r"(?i)\b(you are|you're|ur)\s+(stupid|idiot|trash|garbage|worthless)\b",
  ])
});

static THREAT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\b(i will|gonna|going to)\s+(kill|hurt|attack)")
    .expect("invalid threat pattern")
});

static PERSONAL_ATTACK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\b(you are|you're)\s+(stupid|idiot|trash|worthless)")
    .expect("invalid personal-attack pattern")
});

static PROMOTIONAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)(buy|click|visit|check out|free money|earn \$)")
    .expect("invalid promotional pattern")
});

static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)https?://\S+").expect("invalid link pattern")
});

static PROFANITY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
  compile(&[
    r"(?i)\b(fuck|shit|bitch|ass|damn|hell|crap)\b",
    r"(?i)\b(bastard|whore|slut|dick|cock|pussy)\b",
  ])
});

/// Whether `text` contains `len` or more consecutive copies of one character
/// on a single line.
fn has_repeated_run(text: &str, len: usize) -> bool {
  let mut prev = None;
  let mut run = 0;
  for c in text.chars() {
    if c != '\n' && Some(c) == prev {
      run += 1;
    } else {
      run = 1;
    }
    if c != '\n' && run >= len {
      return true;
    }
    prev = Some(c);
  }
  false
}

fn spam_indicators(text: &str) -> u32 {
  let indicators = [
    has_repeated_run(text, SPAM_RUN_LEN),
    PROMOTIONAL_PATTERN.is_match(text),
    LINK_PATTERN.find_iter(text).take(SPAM_LINK_COUNT).count() >= SPAM_LINK_COUNT,
  ];
  indicators.into_iter().filter(|hit| *hit).count() as u32
}

fn profanity_hits(text: &str) -> u32 {
  PROFANITY_PATTERNS
    .iter()
    .map(|p| p.find_iter(text).count() as u32)
    .sum()
}

// ─── Scorer ──────────────────────────────────────────────────────────────────

/// Classify `text`. Deterministic: the same input always yields the same
/// result.
pub fn score(text: &str) -> ModerationResult {
  let mut flags = Vec::new();
  let mut points: u32 = 0;

  for pattern in TOXIC_PATTERNS.iter() {
    if pattern.is_match(text) {
      flags.push(ModerationFlag {
        kind:     FlagKind::Toxicity,
        severity: Severity::High,
        detail:   "Content contains potentially harmful language".to_owned(),
      });
      points += TOXICITY_POINTS;
    }
  }

  if THREAT_PATTERN.is_match(text) {
    flags.push(ModerationFlag {
      kind:     FlagKind::Threat,
      severity: Severity::Critical,
      detail:   "Content contains a potential threat".to_owned(),
    });
    points += THREAT_POINTS;
  }

  if PERSONAL_ATTACK_PATTERN.is_match(text) {
    flags.push(ModerationFlag {
      kind:     FlagKind::PersonalAttack,
      severity: Severity::High,
      detail:   "Content contains a personal attack".to_owned(),
    });
    points += PERSONAL_ATTACK_POINTS;
  }

  let spam = spam_indicators(text);
  if spam > 0 {
    flags.push(ModerationFlag {
      kind:     FlagKind::Spam,
      severity: if spam > 1 { Severity::High } else { Severity::Medium },
      detail:   "Content may be spam".to_owned(),
    });
    points += SPAM_POINTS_PER_INDICATOR * spam;
  }

  let foul = profanity_hits(text);
  if foul > 0 {
    flags.push(ModerationFlag {
      kind:     FlagKind::FoulLanguage,
      severity: if foul > 2 { Severity::High } else { Severity::Low },
      detail:   format!(
        "Content contains {foul} instance(s) of inappropriate language"
      ),
    });
    points = points.saturating_add(PROFANITY_POINTS_PER_HIT.saturating_mul(foul));
  }

  let points = points.min(MAX_POINTS);
  let action = ModerationAction::for_points(points);

  ModerationResult {
    approved: action.is_approved(),
    score: f64::from(points) / 100.0,
    flags,
    action,
  }
}
