//! Traits for the policy engine's external collaborators.
//!
//! The document store, token directory and notification sender are owned by
//! other systems; the engine only reads from the first two and pushes
//! through the third. Backends (e.g. `campus-store-sqlite`) implement these,
//! and the engine is constructed with explicit instances of each.
//! [`DocumentWriter`] is not used by the engine at all; it serves the layers
//! in front of it.
//!
//! All methods return `Send` futures so implementations can be driven from a
//! multi-threaded async runtime (e.g. tokio with `axum`).

use std::future::Future;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
  document::{Comment, Post, Profile, Relationship},
  notification::{MulticastOutcome, Notification, SendOutcome},
};

// ─── Documents ───────────────────────────────────────────────────────────────

/// Read access to the documents notifications are built from.
///
/// Every lookup returns `None` when the document does not exist; callers
/// treat absence as "skip", never as an error.
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn get_post<'a>(
    &'a self,
    school: &'a str,
    post_id: &'a str,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + 'a;

  fn get_comment<'a>(
    &'a self,
    school: &'a str,
    post_id: &'a str,
    comment_id: &'a str,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + 'a;

  fn get_relationship<'a>(
    &'a self,
    school: &'a str,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Option<Relationship>, Self::Error>> + Send + 'a;

  fn get_profile<'a>(
    &'a self,
    school: &'a str,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + 'a;

  /// Atomically set the post's `popularNotified` flag.
  ///
  /// Returns `true` only for the caller that flipped it from unset to set;
  /// a missing post or an already-set flag yields `false`.
  fn claim_popular_notification<'a>(
    &'a self,
    school: &'a str,
    post_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// Maps users within a school to their current push token.
pub trait TokenDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The user's token, or `None` if they never registered (or unregistered).
  fn get_token<'a>(
    &'a self,
    school: &'a str,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Every registered token in the school.
  fn list_tokens<'a>(
    &'a self,
    school: &'a str,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'a;
}

// ─── Delivery ────────────────────────────────────────────────────────────────

/// Push delivery. Batching limits, timeouts and retries are the
/// implementation's business.
pub trait NotificationSender: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send_one<'a>(
    &'a self,
    token: &'a str,
    notification: &'a Notification,
  ) -> impl Future<Output = Result<SendOutcome, Self::Error>> + Send + 'a;

  fn send_multicast<'a>(
    &'a self,
    tokens: &'a [String],
    notification: &'a Notification,
  ) -> impl Future<Output = Result<MulticastOutcome, Self::Error>> + Send + 'a;
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// The snapshots on either side of a single document write; exactly what a
/// create or update trigger needs to see.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteResult {
  /// `true` if the document did not exist before the write.
  pub created: bool,
  pub before:  Option<Value>,
  pub after:   Value,
}

/// Raw document access for the surfaces that sit in front of the engine:
/// the HTTP layer that acts as an event source, token registration, and
/// the maintenance sweep.
pub trait DocumentWriter: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn get_document<'a>(
    &'a self,
    path: &'a str,
  ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send + 'a;

  /// Create or replace the document at `path`.
  fn set_document<'a>(
    &'a self,
    path: &'a str,
    data: Value,
  ) -> impl Future<Output = Result<WriteResult, Self::Error>> + Send + 'a;

  /// Append `value` to the list field `field` of an existing document and
  /// optionally increment the numeric field `counter` in the same write.
  /// Returns `None` if the document does not exist.
  fn append_to_list<'a>(
    &'a self,
    path: &'a str,
    field: &'a str,
    value: Value,
    counter: Option<&'a str>,
  ) -> impl Future<Output = Result<Option<WriteResult>, Self::Error>> + Send + 'a;

  /// Delete a document and everything nested below it. Returns `false` if
  /// nothing existed at `path`.
  fn delete_document<'a>(
    &'a self,
    path: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn register_token<'a>(
    &'a self,
    school: &'a str,
    user_id: &'a str,
    token: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Returns `false` if the user had no registration.
  fn unregister_token<'a>(
    &'a self,
    school: &'a str,
    user_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Delete every post in `school` dated before `cutoff`, with its comments
  /// and replies. Returns the number of posts deleted.
  fn delete_posts_before<'a>(
    &'a self,
    school: &'a str,
    cutoff: DateTime<Utc>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;
}
