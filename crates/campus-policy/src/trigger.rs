//! Subscriptions from document path templates to handlers.
//!
//! Mirrors the event source's `onCreate(template, handler)` /
//! `onUpdate(template, handler)` registration: each entry binds an event
//! kind and a [`PathTemplate`] to one of the engine's [`Handler`]s.

use campus_core::{
  Result,
  event::{DocumentEvent, EventKind},
  path::{Params, PathTemplate, templates},
};
use serde::Serialize;

/// The engine's event handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Handler {
  /// Friend requests and confirmed friends on a relationship record.
  RelationshipChanged,
  /// Like count changes on a post.
  PostLiked,
  /// Fan-out of a new post to the author's friends.
  PostCreated,
  CommentCreated,
  ReplyCreated,
}

#[derive(Debug, Clone)]
struct Trigger {
  kind:     EventKind,
  template: PathTemplate,
  handler:  Handler,
}

/// An ordered set of subscriptions; the first match wins.
#[derive(Debug, Clone, Default)]
pub struct Triggers {
  entries: Vec<Trigger>,
}

impl Triggers {
  pub fn new() -> Self { Self::default() }

  /// The five subscriptions the notification policy is built from.
  pub fn standard() -> Result<Self> {
    Self::new()
      .on_update(templates::RELATIONSHIP, Handler::RelationshipChanged)?
      .on_update(templates::POST, Handler::PostLiked)?
      .on_create(templates::POST, Handler::PostCreated)?
      .on_create(templates::COMMENT, Handler::CommentCreated)?
      .on_create(templates::REPLY, Handler::ReplyCreated)
  }

  pub fn on_create(self, template: &str, handler: Handler) -> Result<Self> {
    self.subscribe(EventKind::Create, template, handler)
  }

  pub fn on_update(self, template: &str, handler: Handler) -> Result<Self> {
    self.subscribe(EventKind::Update, template, handler)
  }

  fn subscribe(mut self, kind: EventKind, template: &str, handler: Handler) -> Result<Self> {
    let template = PathTemplate::parse(template)?;
    self.entries.push(Trigger { kind, template, handler });
    Ok(self)
  }

  /// Find the handler subscribed to this event, with the path parameters
  /// its template bound.
  pub fn route(&self, event: &DocumentEvent) -> Option<(Handler, Params)> {
    let kind = event.kind();
    self
      .entries
      .iter()
      .filter(|t| t.kind == kind)
      .find_map(|t| {
        let params = t.template.matches(event.path())?;
        tracing::debug!(template = %t.template, handler = ?t.handler, "event routed");
        Some((t.handler, params))
      })
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn standard_routes_each_event_shape() {
    let triggers = Triggers::standard().unwrap();
    assert_eq!(triggers.len(), 5);

    let cases = [
      (
        DocumentEvent::updated("users/yale/relationships/u1", None, None),
        Handler::RelationshipChanged,
      ),
      (
        DocumentEvent::updated("users/yale/posts/p1", None, None),
        Handler::PostLiked,
      ),
      (
        DocumentEvent::created("users/yale/posts/p1", json!({})),
        Handler::PostCreated,
      ),
      (
        DocumentEvent::created("users/yale/posts/p1/comments/c1", json!({})),
        Handler::CommentCreated,
      ),
      (
        DocumentEvent::created("users/yale/posts/p1/comments/c1/replies/r1", json!({})),
        Handler::ReplyCreated,
      ),
    ];
    for (event, expected) in cases {
      let (handler, params) = triggers.route(&event).unwrap();
      assert_eq!(handler, expected, "{}", event.path());
      assert_eq!(params.get("school"), Some("yale"));
    }
  }

  #[test]
  fn unsubscribed_events_do_not_route() {
    let triggers = Triggers::standard().unwrap();
    // Comments have no update handler.
    let ev = DocumentEvent::updated("users/yale/posts/p1/comments/c1", None, None);
    assert!(triggers.route(&ev).is_none());
    // Relationship creation is not watched either.
    let ev = DocumentEvent::created("users/yale/relationships/u1", json!({}));
    assert!(triggers.route(&ev).is_none());
    let ev = DocumentEvent::created("users/yale/profiles/u1", json!({}));
    assert!(triggers.route(&ev).is_none());
  }

  #[test]
  fn first_matching_subscription_wins() {
    let triggers = Triggers::new()
      .on_create("users/{school}/posts/{postID}", Handler::CommentCreated)
      .unwrap()
      .on_create("users/{school}/posts/{postID}", Handler::PostCreated)
      .unwrap();
    let ev = DocumentEvent::created("users/rice/posts/p", json!({}));
    assert_eq!(triggers.route(&ev).unwrap().0, Handler::CommentCreated);
  }

  #[test]
  fn malformed_template_is_rejected() {
    assert!(Triggers::new().on_update("users/{school", Handler::PostLiked).is_err());
  }
}
