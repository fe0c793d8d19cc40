//! Assembly of a debate's flat argument rows into a pro/con tree.
//!
//! [`build`] is a pure function over a snapshot of rows. Rows whose parent is
//! missing from the snapshot (an orphan, typically from a concurrent
//! deletion) are dropped from the tree together with everything beneath them;
//! their ids are reported in [`ArgumentTree::orphans`] for the caller to log.
//!
//! Neither building nor dropping a tree recurses, so chain depth is bounded
//! only by memory.

use std::{cmp::Reverse, collections::HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  argument::{Argument, ArgumentKind},
  vote::Impact,
};

/// One argument with its children, as served to a viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentNode {
  pub argument_id:  Uuid,
  pub kind:         ArgumentKind,
  pub content:      String,
  pub vote_score:   i64,
  pub author_id:    Uuid,
  pub is_anonymous: bool,
  pub depth:        u32,
  pub created_at:   DateTime<Utc>,
  /// The viewer's own vote on this argument.
  pub user_vote:    Option<Impact>,
  /// Highest score first, then oldest first.
  pub pro:          Vec<ArgumentNode>,
  pub con:          Vec<ArgumentNode>,
}

impl ArgumentNode {
  /// This node and every descendant, depth first.
  pub fn iter(&self) -> impl Iterator<Item = &ArgumentNode> {
    let mut stack = vec![self];
    std::iter::from_fn(move || {
      let node = stack.pop()?;
      stack.extend(node.con.iter().rev());
      stack.extend(node.pro.iter().rev());
      Some(node)
    })
  }
}

impl Drop for ArgumentNode {
  // Unlink children onto a heap stack so a long reply chain does not recurse.
  fn drop(&mut self) {
    let mut stack: Vec<ArgumentNode> = std::mem::take(&mut self.pro);
    stack.append(&mut std::mem::take(&mut self.con));
    while let Some(mut node) = stack.pop() {
      stack.append(&mut node.pro);
      stack.append(&mut node.con);
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentTree {
  /// `None` if the snapshot holds no thesis row.
  pub root:    Option<ArgumentNode>,
  /// Rows dropped because their own parent reference could not be resolved,
  /// in snapshot order. Descendants of an orphan are dropped but not listed.
  pub orphans: Vec<Uuid>,
}

impl ArgumentTree {
  pub fn len(&self) -> usize { self.root.as_ref().map_or(0, |r| r.iter().count()) }

  pub fn is_empty(&self) -> bool { self.root.is_none() }
}

/// Build the tree for one debate.
///
/// `user_votes` maps argument ids to the viewer's vote; pass an empty map for
/// anonymous viewers. Deterministic for a given snapshot and vote map.
pub fn build(rows: &[Argument], user_votes: &HashMap<Uuid, Impact>) -> ArgumentTree {
  let index: HashMap<Uuid, usize> = rows
    .iter()
    .enumerate()
    .map(|(i, row)| (row.argument_id, i))
    .collect();

  let mut pro: Vec<Vec<usize>> = vec![Vec::new(); rows.len()];
  let mut con: Vec<Vec<usize>> = vec![Vec::new(); rows.len()];
  let mut root: Option<usize> = None;
  let mut orphans = Vec::new();

  for (i, row) in rows.iter().enumerate() {
    match (row.kind, row.parent_id) {
      (ArgumentKind::Thesis, None) => match root {
        // Several roots should never happen; keep the earliest.
        Some(r) if seniority(&rows[r]) <= seniority(row) => orphans.push(row.argument_id),
        Some(r) => {
          orphans.push(rows[r].argument_id);
          root = Some(i);
        }
        None => root = Some(i),
      },
      (ArgumentKind::Pro, Some(parent)) => match index.get(&parent) {
        Some(&p) => pro[p].push(i),
        None => orphans.push(row.argument_id),
      },
      (ArgumentKind::Con, Some(parent)) => match index.get(&parent) {
        Some(&p) => con[p].push(i),
        None => orphans.push(row.argument_id),
      },
      // A parented thesis or a parentless pro/con cannot be placed.
      _ => orphans.push(row.argument_id),
    }
  }

  for children in pro.iter_mut().chain(con.iter_mut()) {
    children.sort_by_key(|&i| ranking(&rows[i]));
  }

  let root = root.and_then(|r| assemble(r, rows, &pro, &con, user_votes));
  ArgumentTree { root, orphans }
}

/// Sibling order: highest score, then oldest, then id for a total order.
fn ranking(row: &Argument) -> (Reverse<i64>, DateTime<Utc>, Uuid) {
  (Reverse(row.vote_score), row.created_at, row.argument_id)
}

fn seniority(row: &Argument) -> (DateTime<Utc>, Uuid) { (row.created_at, row.argument_id) }

/// Build the subtree under `root` without recursing, children first.
///
/// Each index sits in at most one child list and the root sits in none, so
/// the walk from the root visits every reachable row exactly once.
fn assemble(
  root: usize,
  rows: &[Argument],
  pro: &[Vec<usize>],
  con: &[Vec<usize>],
  user_votes: &HashMap<Uuid, Impact>,
) -> Option<ArgumentNode> {
  let mut order = Vec::new();
  let mut stack = vec![root];
  while let Some(i) = stack.pop() {
    order.push(i);
    stack.extend(pro[i].iter().chain(&con[i]).copied());
  }

  let mut built: Vec<Option<ArgumentNode>> = (0..rows.len()).map(|_| None).collect();
  for &i in order.iter().rev() {
    let row = &rows[i];
    let node = ArgumentNode {
      argument_id:  row.argument_id,
      kind:         row.kind,
      content:      row.content.clone(),
      vote_score:   row.vote_score,
      author_id:    row.author_id,
      is_anonymous: row.is_anonymous,
      depth:        row.depth,
      created_at:   row.created_at,
      user_vote:    user_votes.get(&row.argument_id).copied(),
      pro:          take_built(&pro[i], &mut built),
      con:          take_built(&con[i], &mut built),
    };
    built[i] = Some(node);
  }

  built[root].take()
}

fn take_built(children: &[usize], built: &mut [Option<ArgumentNode>]) -> Vec<ArgumentNode> {
  children.iter().filter_map(|&c| built[c].take()).collect()
}
