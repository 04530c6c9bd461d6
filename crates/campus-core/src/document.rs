//! Typed views of the documents the policy engine reads.
//!
//! The document store owns and persists these; this crate only describes
//! their shape. Field names on the wire are camelCase, and every list or
//! counter field tolerates being absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::Result;

// ─── Posts ───────────────────────────────────────────────────────────────────

/// A post at `users/{school}/posts/{postID}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
  pub poster_id:        String,
  #[serde(default)]
  pub poster_name:      String,
  /// Creation time; the maintenance sweep deletes posts by this field.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date:             Option<DateTime<Utc>>,
  #[serde(default)]
  pub num_likes:        u32,
  /// Likers in the order their likes were recorded.
  #[serde(default)]
  pub users_who_liked:  Vec<String>,
  /// Set once the "popular post" broadcast has been claimed for this post.
  #[serde(default)]
  pub popular_notified: bool,
}

/// A comment at `users/{school}/posts/{postID}/comments/{commentID}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
  pub poster_id: String,
  #[serde(default)]
  pub text:      String,
}

/// A reply one level below a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
  pub poster_id: String,
  #[serde(default)]
  pub text:      String,
}

// ─── Relationships ───────────────────────────────────────────────────────────

/// One entry in a relationship list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendEntry {
  pub name: String,
  pub id:   String,
}

/// The per-user record at `users/{school}/relationships/{userID}`.
///
/// Both lists only ever grow by appending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
  /// Pending friend requests addressed to the owning user.
  #[serde(default)]
  pub requests: Vec<FriendEntry>,
  #[serde(default)]
  pub friends:  Vec<FriendEntry>,
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub name: String,
}

/// A push registration at `users/{school}/tokens/{userID}`.
///
/// A record without a token is equivalent to no record at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRegistration {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub fcm_token: Option<String>,
}

impl TokenRegistration {
  /// The usable token, if any; blank strings count as absent.
  pub fn token(&self) -> Option<&str> {
    self.fcm_token.as_deref().filter(|t| !t.trim().is_empty())
  }
}

// ─── Decoding ────────────────────────────────────────────────────────────────

/// Decode a raw JSON document into one of the typed views above.
pub fn decode<T: DeserializeOwned>(value: &serde_json::Value) -> Result<T> {
  Ok(T::deserialize(value)?)
}
