//! New comments notify the post's author.

use campus_core::{
  document::Comment,
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
  let kind = NotificationKind::Comment;

  let Some(doc) = created_document(event, report) else { return };
  let Some(comment) = decode_or_discard::<Comment>(doc, report) else { return };
  let Some(school) = param(params, "school", report) else { return };
  let Some(post_id) = param(params, "postID", report) else { return };

  let post = engine.store.get_post(school, post_id).await;
  let Some(post) = found(post, kind, "post", report) else { return };

  if comment.poster_id == post.poster_id {
    report.skip(kind, SkipReason::SelfNotification);
    return;
  }

  let Some(name) = engine
    .display_name(kind, school, &comment.poster_id, report)
    .await
  else {
    return;
  };
  engine
    .notify_user(
      kind,
      school,
      &post.poster_id,
      messages::comment(&name, &comment.text),
      report,
    )
    .await;
}
