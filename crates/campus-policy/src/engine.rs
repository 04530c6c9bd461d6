//! [`Engine`] — routes events to handlers and owns the lookup and delivery
//! helpers they share.

use std::sync::Arc;

use campus_core::{
  event::{DocumentEvent, EventKind},
  notification::Notification,
  path::Params,
  store::{DocumentStore, NotificationSender, TokenDirectory},
};
use thiserror::Error;
use tracing::Instrument as _;
use uuid::Uuid;

use crate::{
  handlers,
  report::{Delivery, DeliveryOutcome, NotificationKind, Report, SkipReason, Target},
  trigger::{Handler, Triggers},
};

#[derive(Debug, Error)]
pub enum DispatchError {
  #[error("no trigger subscribed to {kind:?} events at {path:?}")]
  NoRoute { kind: EventKind, path: String },
}

/// The notification policy engine.
///
/// Holds explicitly constructed collaborators; there is no process-global
/// client. Cloning is cheap — everything inside is reference-counted.
pub struct Engine<D, T, N> {
  pub(crate) store:  Arc<D>,
  pub(crate) tokens: Arc<T>,
  pub(crate) sender: Arc<N>,
  triggers:          Arc<Triggers>,
}

impl<D, T, N> Clone for Engine<D, T, N> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      tokens:   Arc::clone(&self.tokens),
      sender:   Arc::clone(&self.sender),
      triggers: Arc::clone(&self.triggers),
    }
  }
}

impl<D, T, N> Engine<D, T, N>
where
  D: DocumentStore,
  T: TokenDirectory,
  N: NotificationSender,
{
  /// Build an engine subscribed with [`Triggers::standard`].
  pub fn new(store: Arc<D>, tokens: Arc<T>, sender: Arc<N>) -> campus_core::Result<Self> {
    Ok(Self::with_triggers(store, tokens, sender, Triggers::standard()?))
  }

  pub fn with_triggers(
    store: Arc<D>,
    tokens: Arc<T>,
    sender: Arc<N>,
    triggers: Triggers,
  ) -> Self {
    Self { store, tokens, sender, triggers: Arc::new(triggers) }
  }

  /// Run the handler subscribed to `event`.
  ///
  /// Lookups and sends happen one after another; a failure in one branch
  /// is logged and recorded in the report, never returned. The only error
  /// is an event nothing is subscribed to.
  pub async fn dispatch(&self, event: &DocumentEvent) -> Result<Report, DispatchError> {
    let (handler, params) =
      self.triggers.route(event).ok_or_else(|| DispatchError::NoRoute {
        kind: event.kind(),
        path: event.path().to_owned(),
      })?;

    let invocation = Uuid::new_v4();
    let span = tracing::info_span!(
      "dispatch",
      %invocation,
      ?handler,
      path = event.path(),
    );

    let mut report = Report::new(invocation, handler);
    self
      .run(handler, &params, event, &mut report)
      .instrument(span)
      .await;

    tracing::debug!(
      %invocation,
      deliveries = report.deliveries.len(),
      skipped = report.skipped.len(),
      "dispatch finished"
    );
    Ok(report)
  }

  async fn run(
    &self,
    handler: Handler,
    params: &Params,
    event: &DocumentEvent,
    report: &mut Report,
  ) {
    match handler {
      Handler::RelationshipChanged => {
        handlers::relationship::handle(self, params, event, report).await
      }
      Handler::PostLiked => handlers::like::handle(self, params, event, report).await,
      Handler::PostCreated => handlers::post::handle(self, params, event, report).await,
      Handler::CommentCreated => handlers::comment::handle(self, params, event, report).await,
      Handler::ReplyCreated => handlers::reply::handle(self, params, event, report).await,
    }
  }

  // ── Shared helpers ────────────────────────────────────────────────────────

  /// Resolve a user's display name from their profile.
  pub(crate) async fn display_name(
    &self,
    kind: NotificationKind,
    school: &str,
    user_id: &str,
    report: &mut Report,
  ) -> Option<String> {
    let result = self.store.get_profile(school, user_id).await;
    found(result, kind, "profile", report).map(|p| p.name)
  }

  /// Send one notification to `user_id`, if they have a token.
  pub(crate) async fn notify_user(
    &self,
    kind: NotificationKind,
    school: &str,
    user_id: &str,
    notification: Notification,
    report: &mut Report,
  ) {
    let token = match self.tokens.get_token(school, user_id).await {
      Ok(Some(token)) => token,
      Ok(None) => {
        report.skip(kind, SkipReason::NoToken);
        return;
      }
      Err(e) => {
        tracing::warn!(?kind, user_id, "token lookup failed: {e}");
        report.skip(kind, SkipReason::StoreError { message: e.to_string() });
        return;
      }
    };

    let outcome = match self.sender.send_one(&token, &notification).await {
      Ok(outcome) => {
        let ok = outcome.is_success();
        tracing::info!(?kind, user_id, success = ok, "notification sent");
        DeliveryOutcome::Sent {
          success_count: usize::from(ok),
          failure_count: usize::from(!ok),
        }
      }
      Err(e) => {
        tracing::warn!(?kind, user_id, "notification send failed: {e}");
        DeliveryOutcome::Failed { reason: e.to_string() }
      }
    };

    report.deliveries.push(Delivery {
      kind,
      target: Target::User { user_id: user_id.to_owned() },
      notification,
      outcome,
    });
  }

  /// Send one notification to every token in `tokens`.
  pub(crate) async fn multicast(
    &self,
    kind: NotificationKind,
    tokens: Vec<String>,
    notification: Notification,
    report: &mut Report,
  ) {
    if tokens.is_empty() {
      report.skip(kind, SkipReason::NoRecipients);
      return;
    }

    let outcome = match self.sender.send_multicast(&tokens, &notification).await {
      Ok(outcome) => {
        tracing::info!(
          ?kind,
          tokens = tokens.len(),
          success = outcome.success_count,
          failure = outcome.failure_count,
          "multicast sent"
        );
        DeliveryOutcome::Sent {
          success_count: outcome.success_count,
          failure_count: outcome.failure_count,
        }
      }
      Err(e) => {
        tracing::warn!(?kind, tokens = tokens.len(), "multicast failed: {e}");
        DeliveryOutcome::Failed { reason: e.to_string() }
      }
    };

    report.deliveries.push(Delivery {
      kind,
      target: Target::Multicast { tokens: tokens.len() },
      notification,
      outcome,
    });
  }
}

/// Collapse a lookup into "found or skip": absence and read errors both
/// abandon the branch, with the reason recorded.
pub(crate) fn found<V, E: std::error::Error>(
  result: Result<Option<V>, E>,
  kind: NotificationKind,
  what: &'static str,
  report: &mut Report,
) -> Option<V> {
  match result {
    Ok(Some(v)) => Some(v),
    Ok(None) => {
      report.skip(kind, SkipReason::NotFound { what });
      None
    }
    Err(e) => {
      tracing::warn!(?kind, what, "lookup failed: {e}");
      report.skip(kind, SkipReason::StoreError { message: e.to_string() });
      None
    }
  }
}
