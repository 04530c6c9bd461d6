//! Relationship updates: new friend requests and new friends.
//!
//! The two lists are checked independently, so one update can produce both
//! notifications. Either list "grew" when the event carries an explicit
//! append for it or, failing that, when it got longer; the new entry is the
//! explicit append if present, else the last element of the after-snapshot.

use campus_core::{
  document::{FriendEntry, Relationship},
  event::DocumentEvent,
  path::Params,
  store::{DocumentStore, NotificationSender, TokenDirectory},
};

use super::{decode_or_discard, param, update_snapshots};
use crate::{
  Engine, messages,
  report::{NotificationKind, Report, SkipReason},
};

pub(crate) async fn handle<D, T, N>(
  engine: &Engine<D, T, N>,
  params: &Params,
  event: &DocumentEvent,
  report: &mut Report,
) where
  D: DocumentStore,
  T: TokenDirectory,
  N: NotificationSender,
{
  let Some((before, after)) = update_snapshots(event, report) else { return };
  let Some(before) = decode_or_discard::<Relationship>(before, report) else { return };
  let Some(after) = decode_or_discard::<Relationship>(after, report) else { return };
  let Some(school) = param(params, "school", report) else { return };
  let Some(owner) = param(params, "relationshipID", report) else { return };

  let branches = [
    (NotificationKind::FriendRequest, "requests", &before.requests, &after.requests),
    (NotificationKind::NewFriend, "friends", &before.friends, &after.friends),
  ];

  let mut triggered = false;
  for (kind, field, before_list, after_list) in branches {
    let Some(entry) = newest_entry(event, field, before_list, after_list) else {
      continue;
    };
    triggered = true;

    let Some(entry) = entry else {
      report.skip(kind, SkipReason::Malformed);
      continue;
    };

    let notification = match kind {
      NotificationKind::FriendRequest => messages::friend_request(&entry.name),
      _ => messages::new_friend(&entry.name),
    };
    engine
      .notify_user(kind, school, owner, notification, report)
      .await;
  }

  if !triggered {
    report.discard(SkipReason::NotTriggered);
  }
}

/// `None` if the list did not grow; `Some(None)` if it grew but the new
/// entry cannot be read.
fn newest_entry(
  event: &DocumentEvent,
  field: &str,
  before: &[FriendEntry],
  after: &[FriendEntry],
) -> Option<Option<FriendEntry>> {
  if let Some(appended) = event.appended_to(field) {
    return Some(match serde_json::from_value(appended.clone()) {
      Ok(entry) => Some(entry),
      Err(e) => {
        tracing::warn!(field, "unreadable appended entry: {e}");
        after.last().cloned()
      }
    });
  }
  (after.len() > before.len()).then(|| after.last().cloned())
}
