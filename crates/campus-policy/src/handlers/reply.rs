//! New replies notify the author of the comment replied to.

use campus_core::{
  document::Reply,
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
  let kind = NotificationKind::Reply;

  let Some(doc) = created_document(event, report) else { return };
  let Some(reply) = decode_or_discard::<Reply>(doc, report) else { return };
  let Some(school) = param(params, "school", report) else { return };
  let Some(post_id) = param(params, "postID", report) else { return };
  let Some(comment_id) = param(params, "commentID", report) else { return };

  let comment = engine.store.get_comment(school, post_id, comment_id).await;
  let Some(comment) = found(comment, kind, "comment", report) else { return };

  if reply.poster_id == comment.poster_id {
    report.skip(kind, SkipReason::SelfNotification);
    return;
  }

  let Some(name) = engine
    .display_name(kind, school, &reply.poster_id, report)
    .await
  else {
    return;
  };
  engine
    .notify_user(
      kind,
      school,
      &comment.poster_id,
      messages::reply(&name, &reply.text),
      report,
    )
    .await;
}
