//! New posts fan out to the author's friends.

use campus_core::{
  document::Post,
  event::DocumentEvent,
  path::Params,
  store::{DocumentStore, NotificationSender, TokenDirectory},
};

use super::{created_document, decode_or_discard, param};
use crate::{
  Engine,
  engine::found,
  messages,
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
  let kind = NotificationKind::NewPost;

  let Some(doc) = created_document(event, report) else { return };
  let Some(post) = decode_or_discard::<Post>(doc, report) else { return };
  let Some(school) = param(params, "school", report) else { return };

  let relationship = engine.store.get_relationship(school, &post.poster_id).await;
  let Some(relationship) = found(relationship, kind, "relationship", report) else {
    return;
  };

  // Friends without a registered token are skipped, not fatal.
  let mut tokens = Vec::with_capacity(relationship.friends.len());
  for friend in &relationship.friends {
    match engine.tokens.get_token(school, &friend.id).await {
      Ok(Some(token)) => tokens.push(token),
      Ok(None) => tracing::debug!(friend = %friend.id, "friend has no token"),
      Err(e) => tracing::warn!(friend = %friend.id, "token lookup failed: {e}"),
    }
  }

  if tokens.is_empty() {
    report.skip(kind, SkipReason::NoRecipients);
    return;
  }

  // Older clients wrote posts without a display name.
  let name = if post.poster_name.trim().is_empty() {
    let Some(name) = engine.display_name(kind, school, &post.poster_id, report).await else {
      return;
    };
    name
  } else {
    post.poster_name
  };

  engine.multicast(kind, tokens, messages::new_post(&name), report).await;
}
