//! What a single dispatch did: every delivery attempted and every branch
//! skipped, with the reason.

use campus_core::notification::Notification;
use serde::Serialize;
use uuid::Uuid;

use crate::trigger::Handler;

/// The kind of notification a handler branch produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
  FriendRequest,
  NewFriend,
  PopularPost,
  Like,
  NewPost,
  Comment,
  Reply,
}

/// Who a delivery was addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Target {
  /// A single user's token.
  User { user_id: String },
  /// A multicast over this many tokens.
  Multicast { tokens: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
  Sent {
    success_count: usize,
    failure_count: usize,
  },
  /// The sender itself errored. Never retried.
  Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
  pub kind:         NotificationKind,
  pub target:       Target,
  pub notification: Notification,
  pub outcome:      DeliveryOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
  /// An update arrived without a before or after snapshot.
  MissingSnapshot,
  /// A snapshot or document could not be decoded.
  Malformed,
  /// The change does not call for a notification (e.g. likes did not grow).
  NotTriggered,
  /// The actor and the recipient are the same user.
  SelfNotification,
  /// A supporting document does not exist.
  NotFound { what: &'static str },
  /// The recipient has no registered push token.
  NoToken,
  /// A multicast resolved to zero tokens.
  NoRecipients,
  /// The popular-post broadcast was already claimed for this post.
  AlreadyNotified,
  /// A supporting read failed; only this branch is abandoned.
  StoreError { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skip {
  /// The branch skipped, or `None` when the whole event was discarded.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub kind:   Option<NotificationKind>,
  #[serde(flatten)]
  pub reason: SkipReason,
}

/// The outcome of one [`Engine::dispatch`](crate::Engine::dispatch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
  pub invocation: Uuid,
  pub handler:    Handler,
  pub deliveries: Vec<Delivery>,
  pub skipped:    Vec<Skip>,
}

impl Report {
  pub fn new(invocation: Uuid, handler: Handler) -> Self {
    Self {
      invocation,
      handler,
      deliveries: Vec::new(),
      skipped: Vec::new(),
    }
  }

  pub fn deliveries_of(&self, kind: NotificationKind) -> impl Iterator<Item = &Delivery> {
    self.deliveries.iter().filter(move |d| d.kind == kind)
  }

  pub fn skips_of(&self, kind: NotificationKind) -> impl Iterator<Item = &SkipReason> {
    self
      .skipped
      .iter()
      .filter(move |s| s.kind == Some(kind))
      .map(|s| &s.reason)
  }

  pub(crate) fn skip(&mut self, kind: NotificationKind, reason: SkipReason) {
    tracing::debug!(?kind, ?reason, "notification skipped");
    self.skipped.push(Skip { kind: Some(kind), reason });
  }

  pub(crate) fn discard(&mut self, reason: SkipReason) {
    tracing::debug!(?reason, "event discarded");
    self.skipped.push(Skip { kind: None, reason });
  }
}
