//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::HashMap;

use anekanta_core::{
  Classify, ErrorClass,
  activity::{ActivityAction, ActivityQuery},
  argument::{ArgumentKind, MAX_DEPTH, NewArgument},
  comment::NewComment,
  debate::{Category, DebateQuery, DebateSort, DebateStatus, NewDebate},
  moderation,
  reaction::{ReactionKind, Toggled},
  review::{ContentType, ReviewStatus},
  service::{self, ArgumentDraft, CommentDraft, DebateDraft, Submission},
  store::DebateStore,
  user::{NewUser, Principal, Role, User},
  vote::Impact,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, name: &str, role: Role) -> User {
  s.add_user(NewUser {
    username:      name.into(),
    display_name:  name.into(),
    password_hash: "$argon2id$placeholder".into(),
    role,
  })
  .await
  .unwrap()
}

fn debate_input(author: Uuid, title: &str) -> NewDebate {
  NewDebate {
    title:        title.into(),
    description:  String::new(),
    thesis:       format!("{title} is worth doing"),
    author_id:    author,
    category:     Category::Environment,
    is_anonymous: false,
  }
}

fn argument_input(debate: Uuid, parent: Uuid, author: Uuid, kind: ArgumentKind) -> NewArgument {
  NewArgument {
    debate_id: debate,
    parent_id: parent,
    author_id: author,
    content: format!("a {kind:?} point"),
    kind,
    is_anonymous: false,
  }
}

fn principal(user: &User) -> Option<Principal> { Some(Principal::from(user)) }

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_user_lowercases_and_finds_credentials() {
  let s = store().await;
  let u = user(&s, "  Alice ", Role::User).await;
  assert_eq!(u.username, "alice");

  let creds = s.find_credentials("ALICE").await.unwrap().unwrap();
  assert_eq!(creds.user, u);
  assert_eq!(creds.password_hash, "$argon2id$placeholder");

  assert!(s.find_credentials("bob").await.unwrap().is_none());
  assert_eq!(s.get_user(u.user_id).await.unwrap(), Some(u));
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
  let s = store().await;
  user(&s, "alice", Role::User).await;
  let err = s
    .add_user(NewUser {
      username:      "Alice".into(),
      display_name:  "Other".into(),
      password_hash: "x".into(),
      role:          Role::User,
    })
    .await
    .unwrap_err();
  assert_eq!(err.class(), ErrorClass::Conflict);
}

// ─── Debates ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_debate_writes_thesis_root() {
  let s = store().await;
  let u = user(&s, "alice", Role::User).await;

  let (debate, root) = s.create_debate(debate_input(u.user_id, "Solar"), None).await.unwrap();
  assert!(root.is_root());
  assert_eq!(root.depth, 0);
  assert_eq!(root.content, debate.thesis);

  let summary = s.get_debate(debate.debate_id).await.unwrap().unwrap();
  assert_eq!(summary.debate.title, "Solar");
  assert_eq!(summary.debate.status, DebateStatus::Active);
  assert_eq!(summary.argument_count, 1);
  assert_eq!(summary.vote_count, 0);

  let rows = s.get_arguments_by_debate(debate.debate_id).await.unwrap();
  assert_eq!(rows, vec![root]);
}

#[tokio::test]
async fn unknown_author_is_not_a_conflict() {
  let s = store().await;
  let err = s.create_debate(debate_input(Uuid::new_v4(), "Ghost"), None).await.unwrap_err();
  assert_eq!(err.class(), ErrorClass::Internal);
  assert!(s.list_debates(&DebateQuery::default()).await.unwrap().debates.is_empty());
}

#[tokio::test]
async fn get_debate_missing_returns_none() {
  let s = store().await;
  assert!(s.get_debate(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_debates_filters_and_pages() {
  let s = store().await;
  let u = user(&s, "alice", Role::User).await;

  for i in 0..23 {
    s.create_debate(debate_input(u.user_id, &format!("Energy {i}")), None)
      .await
      .unwrap();
  }
  let mut other = debate_input(u.user_id, "Free will");
  other.category = Category::Philosophy;
  s.create_debate(other, None).await.unwrap();

  let first = s.list_debates(&DebateQuery::default()).await.unwrap();
  assert_eq!(first.total, 24);
  assert_eq!(first.pages, 2);
  assert_eq!(first.debates.len(), 20);

  let second = s
    .list_debates(&DebateQuery { page: 2, ..Default::default() })
    .await
    .unwrap();
  assert_eq!(second.debates.len(), 4);

  let philosophy = s
    .list_debates(&DebateQuery {
      category: Some(Category::Philosophy),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(philosophy.total, 1);
  assert_eq!(philosophy.debates[0].debate.title, "Free will");

  let search = s
    .list_debates(&DebateQuery {
      search: Some("energy 1".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  // "Energy 1" and "Energy 10".."Energy 19"
  assert_eq!(search.total, 11);
}

#[tokio::test]
async fn search_wildcards_match_literally() {
  let s = store().await;
  let u = user(&s, "alice", Role::User).await;
  s.create_debate(debate_input(u.user_id, "Tax at 100%"), None).await.unwrap();
  s.create_debate(debate_input(u.user_id, "Tax at 1000"), None).await.unwrap();

  let page = s
    .list_debates(&DebateQuery { search: Some("100%".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(page.total, 1);
}

#[tokio::test]
async fn popular_sort_orders_by_argument_count() {
  let s = store().await;
  let u = user(&s, "alice", Role::User).await;
  let (quiet, _) = s.create_debate(debate_input(u.user_id, "Quiet"), None).await.unwrap();
  let (busy, root) = s.create_debate(debate_input(u.user_id, "Busy"), None).await.unwrap();
  s.create_argument(argument_input(busy.debate_id, root.argument_id, u.user_id, ArgumentKind::Pro), None)
    .await
    .unwrap();

  let page = s
    .list_debates(&DebateQuery { sort: DebateSort::Popular, ..Default::default() })
    .await
    .unwrap();
  let order: Vec<Uuid> = page.debates.iter().map(|d| d.debate.debate_id).collect();
  assert_eq!(order, vec![busy.debate_id, quiet.debate_id]);
  assert_eq!(page.debates[0].argument_count, 2);
}

#[tokio::test]
async fn closed_debates_are_not_listed() {
  let s = store().await;
  let u = user(&s, "alice", Role::User).await;
  let (debate, _) = s.create_debate(debate_input(u.user_id, "Old"), None).await.unwrap();
  s.close_debate(debate.debate_id).await.unwrap();

  let page = s.list_debates(&DebateQuery::default()).await.unwrap();
  assert_eq!(page.total, 0);
}

// ─── Arguments ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_argument_derives_depth_and_bumps_debate() {
  let s = store().await;
  let u = user(&s, "alice", Role::User).await;
  let (debate, root) = s.create_debate(debate_input(u.user_id, "Solar"), None).await.unwrap();

  let pro = s
    .create_argument(argument_input(debate.debate_id, root.argument_id, u.user_id, ArgumentKind::Pro), None)
    .await
    .unwrap();
  assert_eq!(pro.depth, 1);
  assert_eq!(pro.parent_id, Some(root.argument_id));
  assert_eq!(pro.vote_score, 0);

  let rebuttal = s
    .create_argument(argument_input(debate.debate_id, pro.argument_id, u.user_id, ArgumentKind::Con), None)
    .await
    .unwrap();
  assert_eq!(rebuttal.depth, 2);

  let summary = s.get_debate(debate.debate_id).await.unwrap().unwrap();
  assert_eq!(summary.argument_count, 3);
  assert!(summary.debate.updated_at >= debate.updated_at);
  assert_eq!(s.get_argument(rebuttal.argument_id).await.unwrap(), Some(rebuttal));
}

#[tokio::test]
async fn parent_from_another_debate_is_not_found() {
  let s = store().await;
  let u = user(&s, "alice", Role::User).await;
  let (a, _) = s.create_debate(debate_input(u.user_id, "A"), None).await.unwrap();
  let (_, b_root) = s.create_debate(debate_input(u.user_id, "B"), None).await.unwrap();

  let err = s
    .create_argument(argument_input(a.debate_id, b_root.argument_id, u.user_id, ArgumentKind::Pro), None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(anekanta_core::Error::ArgumentNotFound(id)) if id == b_root.argument_id));
}

#[tokio::test]
async fn unknown_debate_is_not_found() {
  let s = store().await;
  let u = user(&s, "alice", Role::User).await;
  let err = s
    .create_argument(argument_input(Uuid::new_v4(), Uuid::new_v4(), u.user_id, ArgumentKind::Con), None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(anekanta_core::Error::DebateNotFound(_))));
}

#[tokio::test]
async fn closed_debate_refuses_arguments() {
  let s = store().await;
  let u = user(&s, "alice", Role::User).await;
  let (debate, root) = s.create_debate(debate_input(u.user_id, "Old"), None).await.unwrap();
  s.close_debate(debate.debate_id).await.unwrap();

  let err = s
    .create_argument(argument_input(debate.debate_id, root.argument_id, u.user_id, ArgumentKind::Pro), None)
    .await
    .unwrap_err();
  assert_eq!(err.class(), ErrorClass::Validation);
}

#[tokio::test]
async fn replies_stop_at_the_depth_cap() {
  let s = store().await;
  let u = user(&s, "alice", Role::User).await;
  let (debate, root) = s.create_debate(debate_input(u.user_id, "Chain"), None).await.unwrap();

  let mut parent = root.argument_id;
  for depth in 1..=MAX_DEPTH {
    let reply = s
      .create_argument(argument_input(debate.debate_id, parent, u.user_id, ArgumentKind::Pro), None)
      .await
      .unwrap();
    assert_eq!(reply.depth, depth);
    parent = reply.argument_id;
  }

  let err = s
    .create_argument(argument_input(debate.debate_id, parent, u.user_id, ArgumentKind::Con), None)
    .await
    .unwrap_err();
  assert_eq!(err.class(), ErrorClass::Validation);
  assert_eq!(
    s.get_arguments_by_debate(debate.debate_id).await.unwrap().len(),
    MAX_DEPTH as usize + 1
  );
}

#[tokio::test]
async fn second_thesis_is_rejected() {
  let s = store().await;
  let u = user(&s, "alice", Role::User).await;
  let (debate, root) = s.create_debate(debate_input(u.user_id, "Solar"), None).await.unwrap();
  let err = s
    .create_argument(argument_input(debate.debate_id, root.argument_id, u.user_id, ArgumentKind::Thesis), None)
    .await
    .unwrap_err();
  assert_eq!(err.class(), ErrorClass::Validation);
}

// ─── Votes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn votes_update_cached_score() {
  let s = store().await;
  let alice = user(&s, "alice", Role::User).await;
  let bob = user(&s, "bob", Role::User).await;
  let (debate, root) = s.create_debate(debate_input(alice.user_id, "Solar"), None).await.unwrap();

  let r = s.cast_vote(root.argument_id, alice.user_id, 4).await.unwrap();
  assert_eq!((r.score, r.vote_count), (4, 1));
  let r = s.cast_vote(root.argument_id, bob.user_id, 2).await.unwrap();
  assert_eq!((r.score, r.vote_count), (6, 2));

  // Re-vote overwrites rather than adding a row.
  let r = s.cast_vote(root.argument_id, alice.user_id, 1).await.unwrap();
  assert_eq!((r.score, r.vote_count), (3, 2));
  assert_eq!(r.user_vote, Some(Impact::Low));

  let r = s.cast_vote(root.argument_id, bob.user_id, 0).await.unwrap();
  assert_eq!((r.score, r.vote_count, r.user_vote), (1, 1, None));

  let stored = s.get_argument(root.argument_id).await.unwrap().unwrap();
  assert_eq!(stored.vote_score, 1);

  let mine = s.user_votes_in_debate(debate.debate_id, alice.user_id).await.unwrap();
  assert_eq!(mine, HashMap::from([(root.argument_id, Impact::Low)]));
  assert!(s.user_votes_in_debate(debate.debate_id, bob.user_id).await.unwrap().is_empty());

  let summary = s.get_debate(debate.debate_id).await.unwrap().unwrap();
  assert_eq!(summary.vote_count, 1);
}

#[tokio::test]
async fn retract_without_vote_is_a_noop() {
  let s = store().await;
  let alice = user(&s, "alice", Role::User).await;
  let (_, root) = s.create_debate(debate_input(alice.user_id, "Solar"), None).await.unwrap();

  let r = s.cast_vote(root.argument_id, alice.user_id, 0).await.unwrap();
  assert_eq!((r.score, r.vote_count, r.user_vote), (0, 0, None));
}

#[tokio::test]
async fn vote_errors_are_classified() {
  let s = store().await;
  let alice = user(&s, "alice", Role::User).await;
  let (_, root) = s.create_debate(debate_input(alice.user_id, "Solar"), None).await.unwrap();

  let err = s.cast_vote(root.argument_id, alice.user_id, 5).await.unwrap_err();
  assert_eq!(err.class(), ErrorClass::Validation);

  let err = s.cast_vote(Uuid::new_v4(), alice.user_id, 2).await.unwrap_err();
  assert_eq!(err.class(), ErrorClass::NotFound);

  let stored = s.get_argument(root.argument_id).await.unwrap().unwrap();
  assert_eq!(stored.vote_score, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_votes_across_connections_are_all_counted() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("debates.db");
  let first = SqliteStore::open(&path).await.unwrap();
  let second = SqliteStore::open(&path).await.unwrap();

  let author = user(&first, "author", Role::User).await;
  let (_, root) = first.create_debate(debate_input(author.user_id, "Solar"), None).await.unwrap();

  let mut voters = Vec::new();
  for i in 0..16 {
    voters.push(user(&first, &format!("voter{i}"), Role::User).await);
  }

  let mut handles = Vec::new();
  for (i, voter) in voters.iter().enumerate() {
    let s = if i % 2 == 0 { first.clone() } else { second.clone() };
    let argument_id = root.argument_id;
    let voter_id = voter.user_id;
    let value = (i % 4) as i64 + 1;
    handles.push(tokio::spawn(async move {
      // A writer that loses the lock race sees Conflict and tries again.
      loop {
        match s.cast_vote(argument_id, voter_id, value).await {
          Ok(result) => return result,
          Err(err) => assert_eq!(err.class(), ErrorClass::Conflict, "{err}"),
        }
      }
    }));
  }
  for handle in handles {
    handle.await.unwrap();
  }

  // 4 × (1 + 2 + 3 + 4)
  for s in [&first, &second] {
    let stored = s.get_argument(root.argument_id).await.unwrap().unwrap();
    assert_eq!(stored.vote_score, 40);
  }
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn comments_list_oldest_first() {
  let s = store().await;
  let u = user(&s, "alice", Role::User).await;
  let (_, root) = s.create_debate(debate_input(u.user_id, "Solar"), None).await.unwrap();

  for text in ["first", "second"] {
    s.add_comment(
      NewComment {
        argument_id:  root.argument_id,
        author_id:    u.user_id,
        content:      text.into(),
        is_anonymous: false,
      },
      None,
    )
    .await
    .unwrap();
  }

  let comments = s.list_comments(root.argument_id).await.unwrap();
  let texts: Vec<&str> = comments.iter().map(|c| c.content.as_str()).collect();
  assert_eq!(texts, ["first", "second"]);
}

#[tokio::test]
async fn comment_on_unknown_argument_is_not_found() {
  let s = store().await;
  let u = user(&s, "alice", Role::User).await;
  let err = s
    .add_comment(
      NewComment {
        argument_id:  Uuid::new_v4(),
        author_id:    u.user_id,
        content:      "hello".into(),
        is_anonymous: false,
      },
      None,
    )
    .await
    .unwrap_err();
  assert_eq!(err.class(), ErrorClass::NotFound);
}

// ─── Review queue ────────────────────────────────────────────────────────────

#[tokio::test]
async fn flagged_debate_is_queued_with_its_flags() {
  let s = store().await;
  let u = user(&s, "alice", Role::User).await;
  let report = moderation::score("buy cheap watches http://a http://b http://c")
    .report()
    .unwrap();

  let (debate, _) = s
    .create_debate(debate_input(u.user_id, "Watches"), Some(report.clone()))
    .await
    .unwrap();

  let queue = s.list_flagged(Some(ReviewStatus::Pending), 50).await.unwrap();
  assert_eq!(queue.len(), 1);
  let entry = &queue[0];
  assert_eq!(entry.content_type, ContentType::Debate);
  assert_eq!(entry.content_id, debate.debate_id);
  assert_eq!(entry.flags, report.flags);
  assert_eq!(entry.reason, report.reason());
  assert_eq!(entry.resolved_at, None);

  assert!(s.list_flagged(Some(ReviewStatus::Dismissed), 50).await.unwrap().is_empty());
}

#[tokio::test]
async fn resolve_records_moderator() {
  let s = store().await;
  let u = user(&s, "alice", Role::User).await;
  let admin = user(&s, "root", Role::Admin).await;
  let report = moderation::score("well damn").report().unwrap();
  s.create_debate(debate_input(u.user_id, "Mild"), Some(report)).await.unwrap();

  let entry = s.list_flagged(None, 50).await.unwrap().remove(0);
  let resolved = s
    .resolve_flagged(entry.flagged_id, ReviewStatus::Dismissed, admin.user_id)
    .await
    .unwrap();
  assert_eq!(resolved.status, ReviewStatus::Dismissed);
  assert_eq!(resolved.resolved_by, Some(admin.user_id));
  assert!(resolved.resolved_at.is_some());

  let err = s
    .resolve_flagged(Uuid::new_v4(), ReviewStatus::Reviewed, admin.user_id)
    .await
    .unwrap_err();
  assert_eq!(err.class(), ErrorClass::NotFound);
}

#[tokio::test]
async fn stats_count_rows_and_pending_flags() {
  let s = store().await;
  let u = user(&s, "alice", Role::User).await;
  let admin = user(&s, "root", Role::Admin).await;
  let report = moderation::score("well damn").report().unwrap();
  let (debate, root) = s.create_debate(debate_input(u.user_id, "Mild"), Some(report)).await.unwrap();
  s.create_argument(argument_input(debate.debate_id, root.argument_id, u.user_id, ArgumentKind::Pro), None)
    .await
    .unwrap();

  let stats = s.moderation_stats().await.unwrap();
  assert_eq!(stats.total_users, 2);
  assert_eq!(stats.total_debates, 1);
  assert_eq!(stats.total_arguments, 2);
  assert_eq!(stats.pending_flags, 1);

  let entry = s.list_flagged(None, 50).await.unwrap().remove(0);
  s.resolve_flagged(entry.flagged_id, ReviewStatus::Actioned, admin.user_id).await.unwrap();
  assert_eq!(s.moderation_stats().await.unwrap().pending_flags, 0);

  let err = service::moderation_stats(&s, principal(&u)).await.unwrap_err();
  assert_eq!(err.class(), ErrorClass::Forbidden);
  let via_service = service::moderation_stats(&s, principal(&admin)).await.unwrap();
  assert_eq!(via_service.total_users, 2);
}

// ─── Reactions ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn reactions_toggle_on_and_off() {
  let s = store().await;
  let alice = user(&s, "alice", Role::User).await;
  let bob = user(&s, "bob", Role::User).await;
  let (_, root) = s.create_debate(debate_input(alice.user_id, "Solar"), None).await.unwrap();
  let arg = root.argument_id;

  let t = s.toggle_reaction(arg, alice.user_id, ReactionKind::Insightful).await.unwrap();
  assert_eq!(t.toggled, Toggled::On);
  s.toggle_reaction(arg, alice.user_id, ReactionKind::Agree).await.unwrap();
  s.toggle_reaction(arg, bob.user_id, ReactionKind::Insightful).await.unwrap();

  let summary = s.reactions(arg, Some(alice.user_id)).await.unwrap();
  assert_eq!(summary.count(ReactionKind::Insightful), 2);
  assert_eq!(summary.count(ReactionKind::Agree), 1);
  assert_eq!(summary.count(ReactionKind::Disagree), 0);
  assert_eq!(summary.mine, vec![ReactionKind::Insightful, ReactionKind::Agree]);

  let t = s.toggle_reaction(arg, alice.user_id, ReactionKind::Insightful).await.unwrap();
  assert_eq!(t.toggled, Toggled::Off);
  let summary = s.reactions(arg, Some(alice.user_id)).await.unwrap();
  assert_eq!(summary.count(ReactionKind::Insightful), 1);
  assert_eq!(summary.mine, vec![ReactionKind::Agree]);

  let anonymous = s.reactions(arg, None).await.unwrap();
  assert!(anonymous.mine.is_empty());
  assert_eq!(anonymous.counts, summary.counts);
}

#[tokio::test]
async fn reactions_on_unknown_argument_are_not_found() {
  let s = store().await;
  let alice = user(&s, "alice", Role::User).await;
  let missing = Uuid::new_v4();

  let err = s.toggle_reaction(missing, alice.user_id, ReactionKind::Agree).await.unwrap_err();
  assert_eq!(err.class(), ErrorClass::NotFound);
  let err = s.reactions(missing, None).await.unwrap_err();
  assert_eq!(err.class(), ErrorClass::NotFound);

  let err = service::react(&s, None, missing, ReactionKind::Agree).await.unwrap_err();
  assert_eq!(err.class(), ErrorClass::Unauthenticated);
}

// ─── Activity ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn writes_are_recorded_in_the_feed() {
  let s = store().await;
  let alice = user(&s, "alice", Role::User).await;
  let bob = user(&s, "bob", Role::User).await;
  let (debate, root) = s.create_debate(debate_input(alice.user_id, "Solar"), None).await.unwrap();
  let pro = s
    .create_argument(argument_input(debate.debate_id, root.argument_id, bob.user_id, ArgumentKind::Pro), None)
    .await
    .unwrap();
  s.add_comment(
    NewComment {
      argument_id:  pro.argument_id,
      author_id:    alice.user_id,
      content:      "Source?".into(),
      is_anonymous: false,
    },
    None,
  )
  .await
  .unwrap();
  let (other, _) = s.create_debate(debate_input(bob.user_id, "Wind"), None).await.unwrap();

  let feed = s.list_activity(&ActivityQuery::default()).await.unwrap();
  let actions: Vec<_> = feed.iter().map(|a| (a.action, a.target_id)).collect();
  assert_eq!(actions, vec![
    (ActivityAction::Created, other.debate_id),
    (ActivityAction::Commented, pro.argument_id),
    (ActivityAction::AddedArgument, pro.argument_id),
    (ActivityAction::Created, debate.debate_id),
  ]);
  assert_eq!(feed[1].actor_name.as_deref(), Some("alice"));
  assert_eq!(feed[1].debate_title, "Solar");

  let query = ActivityQuery { debate_id: Some(debate.debate_id), limit: Some(2) };
  let scoped = s.list_activity(&query).await.unwrap();
  assert_eq!(scoped.len(), 2);
  assert!(scoped.iter().all(|a| a.debate_id == debate.debate_id));
  assert_eq!(scoped[0].action, ActivityAction::Commented);
}

#[tokio::test]
async fn anonymous_activity_hides_the_actor() {
  let s = store().await;
  let alice = user(&s, "alice", Role::User).await;
  let (debate, root) = s.create_debate(debate_input(alice.user_id, "Solar"), None).await.unwrap();
  let mut input = argument_input(debate.debate_id, root.argument_id, alice.user_id, ArgumentKind::Con);
  input.is_anonymous = true;
  s.create_argument(input, None).await.unwrap();

  let feed = s.list_activity(&ActivityQuery::default()).await.unwrap();
  assert_eq!(feed[0].action, ActivityAction::AddedArgument);
  assert_eq!(feed[0].actor_id, None);
  assert_eq!(feed[0].actor_name, None);
  assert_eq!(feed[1].actor_id, Some(alice.user_id));
}

#[tokio::test]
async fn failed_writes_leave_no_activity() {
  let s = store().await;
  let alice = user(&s, "alice", Role::User).await;
  let (debate, root) = s.create_debate(debate_input(alice.user_id, "Old"), None).await.unwrap();
  s.close_debate(debate.debate_id).await.unwrap();
  s.create_argument(argument_input(debate.debate_id, root.argument_id, alice.user_id, ArgumentKind::Pro), None)
    .await
    .unwrap_err();

  let draft = DebateDraft {
    title: "Warning".into(),
    thesis: "I will kill you".into(),
    ..Default::default()
  };
  let submission = service::submit_debate(&s, principal(&alice), draft).await.unwrap();
  assert!(matches!(submission, Submission::Blocked(_)));

  let feed = s.list_activity(&ActivityQuery::default()).await.unwrap();
  assert_eq!(feed.len(), 1);
  assert_eq!(feed[0].action, ActivityAction::Created);
}

// ─── Service over SQLite ─────────────────────────────────────────────────────

#[tokio::test]
async fn blocked_debate_is_not_persisted() {
  let s = store().await;
  let u = user(&s, "alice", Role::User).await;

  let outcome = service::submit_debate(
    &s,
    principal(&u),
    DebateDraft {
      title: "Warning".into(),
      thesis: "I will kill you".into(),
      ..Default::default()
    },
  )
  .await
  .unwrap();
  assert!(matches!(outcome, Submission::Blocked(_)));
  assert!(outcome.moderation().is_blocked());

  assert_eq!(s.list_debates(&DebateQuery::default()).await.unwrap().total, 0);
  assert!(s.list_flagged(None, 50).await.unwrap().is_empty());
}

#[tokio::test]
async fn anonymous_callers_cannot_submit() {
  let s = store().await;
  let err = service::submit_debate(
    &s,
    None,
    DebateDraft {
      title: "T".into(),
      thesis: "X".into(),
      ..Default::default()
    },
  )
  .await
  .unwrap_err();
  assert_eq!(err.class(), ErrorClass::Unauthenticated);
}

async fn reply(
  s: &SqliteStore,
  author: &User,
  parent: Uuid,
  kind: ArgumentKind,
  content: &str,
) -> anekanta_core::argument::Argument {
  let debate_id = s.get_argument(parent).await.unwrap().unwrap().debate_id;
  service::submit_argument(
    s,
    principal(author),
    debate_id,
    ArgumentDraft {
      parent_id: Some(parent),
      content: content.into(),
      kind,
      is_anonymous: false,
    },
  )
  .await
  .unwrap()
  .accepted()
  .unwrap()
}

#[tokio::test]
async fn debate_view_matches_the_worked_example() {
  let s = store().await;
  let author = user(&s, "author", Role::User).await;
  let voters = [
    user(&s, "v1", Role::User).await,
    user(&s, "v2", Role::User).await,
  ];

  let (debate, root) = service::submit_debate(
    &s,
    principal(&author),
    DebateDraft {
      title: "Renewables".into(),
      thesis: "I believe renewable energy is cost effective".into(),
      category: Category::Environment,
      ..Default::default()
    },
  )
  .await
  .unwrap()
  .accepted()
  .unwrap();

  let p2 = reply(&s, &author, root.argument_id, ArgumentKind::Pro, "Panels keep getting cheaper").await;
  let p5 = reply(&s, &author, root.argument_id, ArgumentKind::Pro, "Fuel costs nothing").await;
  let c8 = reply(&s, &author, root.argument_id, ArgumentKind::Con, "Storage is expensive").await;

  // p5: 4 + 1, p2: 2, c8: 4 + 4
  for (arg, votes) in [(&p5, [4, 1]), (&p2, [2, 0]), (&c8, [4, 4])] {
    for (voter, value) in voters.iter().zip(votes) {
      if value > 0 {
        service::cast_vote(&s, principal(voter), arg.argument_id, value).await.unwrap();
      }
    }
  }

  let view = service::view_debate(&s, principal(&voters[0]), debate.debate_id).await.unwrap();
  let tree_root = view.tree.root.unwrap();
  assert_eq!(tree_root.argument_id, root.argument_id);
  let pro: Vec<i64> = tree_root.pro.iter().map(|n| n.vote_score).collect();
  let con: Vec<i64> = tree_root.con.iter().map(|n| n.vote_score).collect();
  assert_eq!(pro, [5, 2]);
  assert_eq!(con, [8]);
  assert_eq!(tree_root.pro[0].user_vote, Some(Impact::Decisive));
  assert_eq!(tree_root.pro[1].user_vote, Some(Impact::Moderate));
  assert!(view.tree.orphans.is_empty());
  assert_eq!(view.debate.argument_count, 4);

  let anonymous = service::view_debate(&s, None, debate.debate_id).await.unwrap();
  assert!(anonymous.tree.root.unwrap().iter().all(|n| n.user_vote.is_none()));
}

#[tokio::test]
async fn view_of_unknown_debate_is_not_found() {
  let s = store().await;
  let err = service::view_debate(&s, None, Uuid::new_v4()).await.unwrap_err();
  assert_eq!(err.class(), ErrorClass::NotFound);
}

#[tokio::test]
async fn argument_drafts_are_validated() {
  let s = store().await;
  let u = user(&s, "alice", Role::User).await;
  let (debate, root) = s.create_debate(debate_input(u.user_id, "Solar"), None).await.unwrap();

  let draft = |parent_id, kind, content: &str| ArgumentDraft {
    parent_id,
    content: content.into(),
    kind,
    is_anonymous: false,
  };

  for bad in [
    draft(Some(root.argument_id), ArgumentKind::Pro, "   "),
    draft(None, ArgumentKind::Pro, "no parent"),
    draft(Some(root.argument_id), ArgumentKind::Thesis, "another thesis"),
  ] {
    let err = service::submit_argument(&s, principal(&u), debate.debate_id, bad)
      .await
      .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Validation);
  }
}

#[tokio::test]
async fn flagged_comment_reaches_the_admin_queue() {
  let s = store().await;
  let u = user(&s, "alice", Role::User).await;
  let admin = user(&s, "root", Role::Admin).await;
  let (_, root) = s.create_debate(debate_input(u.user_id, "Solar"), None).await.unwrap();

  let outcome = service::submit_comment(
    &s,
    principal(&u),
    root.argument_id,
    CommentDraft { content: "what the hell".into(), is_anonymous: false },
  )
  .await
  .unwrap();
  let comment = outcome.accepted().unwrap();

  let err = service::review_queue(&s, principal(&u), None).await.unwrap_err();
  assert_eq!(err.class(), ErrorClass::Forbidden);

  let queue = service::review_queue(&s, principal(&admin), Some(ReviewStatus::Pending))
    .await
    .unwrap();
  assert_eq!(queue.len(), 1);
  assert_eq!(queue[0].content_id, comment.comment_id);

  let err = service::resolve_review(&s, principal(&admin), queue[0].flagged_id, ReviewStatus::Pending)
    .await
    .unwrap_err();
  assert_eq!(err.class(), ErrorClass::Validation);

  let done = service::resolve_review(&s, principal(&admin), queue[0].flagged_id, ReviewStatus::Actioned)
    .await
    .unwrap();
  assert_eq!(done.status, ReviewStatus::Actioned);
}
