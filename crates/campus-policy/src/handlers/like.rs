//! Post updates: the popular-post broadcast and the per-like notification.
//!
//! Both branches read the canonical post rather than the event's
//! after-snapshot, which may already be stale if a second like landed in
//! between. They are independent; either may fire without the other.

use campus_core::{
  document::Post,
  event::DocumentEvent,
  path::Params,
  store::{DocumentStore, NotificationSender, TokenDirectory},
};
use serde::Deserialize;

use super::{decode_or_discard, param, update_snapshots};
use crate::{
  Engine, POPULAR_THRESHOLD, messages,
  report::{NotificationKind, Report, SkipReason},
};

/// The only field the trigger condition looks at.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LikeCount {
  #[serde(default)]
  num_likes: u32,
}

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
  let Some(LikeCount { num_likes: before }) = decode_or_discard(before, report) else { return };
  let Some(LikeCount { num_likes: after }) = decode_or_discard(after, report) else { return };

  if after <= before {
    report.discard(SkipReason::NotTriggered);
    return;
  }

  let Some(school) = param(params, "school", report) else { return };
  let Some(post_id) = param(params, "postID", report) else { return };

  let crossed = crosses_threshold(before, after);
  let mut branches = vec![NotificationKind::Like];
  if crossed {
    branches.insert(0, NotificationKind::PopularPost);
  }

  let post = match engine.store.get_post(school, post_id).await {
    Ok(Some(post)) => post,
    Ok(None) => {
      for kind in branches {
        report.skip(kind, SkipReason::NotFound { what: "post" });
      }
      return;
    }
    Err(e) => {
      tracing::warn!(post_id, "post lookup failed: {e}");
      for kind in branches {
        report.skip(kind, SkipReason::StoreError { message: e.to_string() });
      }
      return;
    }
  };

  if crossed {
    broadcast_popular(engine, school, post_id, &post, after, report).await;
  }

  let last_liker = event
    .appended_to("usersWhoLiked")
    .and_then(|v| v.as_str())
    .map(str::to_owned)
    .or_else(|| post.users_who_liked.last().cloned());

  let Some(liker) = last_liker else {
    report.skip(NotificationKind::Like, SkipReason::NotFound { what: "liker" });
    return;
  };
  if liker == post.poster_id {
    report.skip(NotificationKind::Like, SkipReason::SelfNotification);
    return;
  }

  let Some(name) = engine
    .display_name(NotificationKind::Like, school, &liker, report)
    .await
  else {
    return;
  };
  engine
    .notify_user(
      NotificationKind::Like,
      school,
      &post.poster_id,
      messages::like(&name),
      report,
    )
    .await;
}

/// True only on the transition edge: below the threshold before, at or
/// above it after.
fn crosses_threshold(before: u32, after: u32) -> bool {
  before < POPULAR_THRESHOLD && after >= POPULAR_THRESHOLD
}

/// Multicast to the whole school, claiming the post's broadcast flag just
/// before the send. A duplicate crossing event loses the claim and sends
/// nothing; a failed or empty token listing leaves the flag unclaimed so a
/// redelivery can still broadcast.
async fn broadcast_popular<D, T, N>(
  engine: &Engine<D, T, N>,
  school: &str,
  post_id: &str,
  post: &Post,
  likes: u32,
  report: &mut Report,
) where
  D: DocumentStore,
  T: TokenDirectory,
  N: NotificationSender,
{
  let kind = NotificationKind::PopularPost;

  let tokens = match engine.tokens.list_tokens(school).await {
    Ok(tokens) if tokens.is_empty() => {
      report.skip(kind, SkipReason::NoRecipients);
      return;
    }
    Ok(tokens) => tokens,
    Err(e) => {
      tracing::warn!(school, "listing tokens failed: {e}");
      report.skip(kind, SkipReason::StoreError { message: e.to_string() });
      return;
    }
  };

  match engine.store.claim_popular_notification(school, post_id).await {
    Ok(true) => {}
    Ok(false) => {
      report.skip(kind, SkipReason::AlreadyNotified);
      return;
    }
    Err(e) => {
      tracing::warn!(post_id, "claiming popular broadcast failed: {e}");
      report.skip(kind, SkipReason::StoreError { message: e.to_string() });
      return;
    }
  }

  engine
    .multicast(kind, tokens, messages::popular_post(&post.poster_name, likes), report)
    .await;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn threshold_fires_only_on_the_edge() {
    assert!(crosses_threshold(9, 10));
    assert!(crosses_threshold(0, 12));
    assert!(!crosses_threshold(10, 11));
    assert!(!crosses_threshold(8, 9));
    assert!(!crosses_threshold(12, 15));
  }
}
