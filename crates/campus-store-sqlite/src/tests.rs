//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use serde_json::json;

use campus_core::{
  document::FriendEntry,
  path::{comment_path, post_path, profile_path, relationship_path},
  store::{DocumentStore, DocumentWriter, TokenDirectory},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

// ─── Documents ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn set_document_reports_create_then_update() {
  let s = store().await;
  let path = post_path("yale", "p1");

  let first = s
    .set_document(&path, json!({ "posterId": "a", "numLikes": 0 }))
    .await
    .unwrap();
  assert!(first.created);
  assert!(first.before.is_none());

  let second = s
    .set_document(&path, json!({ "posterId": "a", "numLikes": 1 }))
    .await
    .unwrap();
  assert!(!second.created);
  assert_eq!(second.before, Some(json!({ "posterId": "a", "numLikes": 0 })));
  assert_eq!(second.after["numLikes"], 1);

  let fetched = s.get_document(&path).await.unwrap().unwrap();
  assert_eq!(fetched["numLikes"], 1);
}

#[tokio::test]
async fn set_document_rejects_bad_input() {
  let s = store().await;
  assert!(matches!(
    s.set_document("users", json!({})).await,
    Err(Error::InvalidPath(_))
  ));
  assert!(matches!(
    s.set_document(&post_path("yale", "p1"), json!([1, 2])).await,
    Err(Error::NotAnObject(_))
  ));
}

#[tokio::test]
async fn get_document_missing_returns_none() {
  let s = store().await;
  assert!(s.get_document("users/yale/posts/nope").await.unwrap().is_none());
}

#[tokio::test]
async fn typed_reads_decode_documents() {
  let s = store().await;
  s.set_document(
    &post_path("rice", "p1"),
    json!({ "posterId": "a", "posterName": "Ann", "numLikes": 3,
            "usersWhoLiked": ["b", "c", "d"] }),
  )
  .await
  .unwrap();
  s.set_document(
    &comment_path("rice", "p1", "c1"),
    json!({ "posterId": "b", "text": "nice" }),
  )
  .await
  .unwrap();
  s.set_document(&profile_path("rice", "b"), json!({ "name": "Bo" }))
    .await
    .unwrap();
  s.set_document(
    &relationship_path("rice", "a"),
    json!({ "friends": [{ "name": "Bo", "id": "b" }] }),
  )
  .await
  .unwrap();

  let post = s.get_post("rice", "p1").await.unwrap().unwrap();
  assert_eq!(post.poster_name, "Ann");
  assert_eq!(post.users_who_liked.last().map(String::as_str), Some("d"));

  let comment = s.get_comment("rice", "p1", "c1").await.unwrap().unwrap();
  assert_eq!(comment.text, "nice");

  let profile = s.get_profile("rice", "b").await.unwrap().unwrap();
  assert_eq!(profile.name, "Bo");

  let rel = s.get_relationship("rice", "a").await.unwrap().unwrap();
  assert_eq!(rel.friends, vec![FriendEntry { name: "Bo".into(), id: "b".into() }]);
  assert!(rel.requests.is_empty());

  assert!(s.get_post("yale", "p1").await.unwrap().is_none());
}

// ─── Appends ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn append_to_list_appends_and_increments() {
  let s = store().await;
  let path = post_path("yale", "p1");
  s.set_document(&path, json!({ "posterId": "a", "numLikes": 1, "usersWhoLiked": ["x"] }))
    .await
    .unwrap();

  let write = s
    .append_to_list(&path, "usersWhoLiked", json!("y"), Some("numLikes"))
    .await
    .unwrap()
    .unwrap();
  assert!(!write.created);
  assert_eq!(write.before.as_ref().unwrap()["numLikes"], 1);
  assert_eq!(write.after["numLikes"], 2);
  assert_eq!(write.after["usersWhoLiked"], json!(["x", "y"]));
}

#[tokio::test]
async fn append_to_list_creates_missing_field() {
  let s = store().await;
  let path = relationship_path("yale", "u");
  s.set_document(&path, json!({})).await.unwrap();

  let write = s
    .append_to_list(&path, "friends", json!({ "name": "Sam", "id": "s" }), None)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(write.after["friends"], json!([{ "name": "Sam", "id": "s" }]));
}

#[tokio::test]
async fn append_to_missing_document_returns_none() {
  let s = store().await;
  let result = s
    .append_to_list(&post_path("yale", "nope"), "usersWhoLiked", json!("a"), None)
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn append_rejects_non_identifier_field() {
  let s = store().await;
  let result = s
    .append_to_list(&post_path("yale", "p1"), "a.b", json!("a"), None)
    .await;
  assert!(matches!(result, Err(Error::InvalidField(_))));
}

// ─── Popular flag ────────────────────────────────────────────────────────────

#[tokio::test]
async fn popular_claim_succeeds_once() {
  let s = store().await;
  s.set_document(&post_path("yale", "p1"), json!({ "posterId": "a" }))
    .await
    .unwrap();

  assert!(s.claim_popular_notification("yale", "p1").await.unwrap());
  assert!(!s.claim_popular_notification("yale", "p1").await.unwrap());

  let post = s.get_post("yale", "p1").await.unwrap().unwrap();
  assert!(post.popular_notified);
}

#[tokio::test]
async fn popular_claim_on_missing_post_fails() {
  let s = store().await;
  assert!(!s.claim_popular_notification("yale", "ghost").await.unwrap());
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn token_registration_lifecycle() {
  let s = store().await;
  assert!(s.get_token("yale", "u1").await.unwrap().is_none());

  s.register_token("yale", "u1", "tok-1").await.unwrap();
  s.register_token("yale", "u2", "tok-2").await.unwrap();
  s.register_token("rice", "u3", "tok-3").await.unwrap();

  assert_eq!(s.get_token("yale", "u1").await.unwrap().as_deref(), Some("tok-1"));
  assert_eq!(s.list_tokens("yale").await.unwrap(), vec!["tok-1", "tok-2"]);

  assert!(s.unregister_token("yale", "u1").await.unwrap());
  assert!(!s.unregister_token("yale", "u1").await.unwrap());
  assert!(s.get_token("yale", "u1").await.unwrap().is_none());
  assert_eq!(s.list_tokens("yale").await.unwrap(), vec!["tok-2"]);
}

#[tokio::test]
async fn token_record_without_field_is_absent() {
  let s = store().await;
  s.set_document("users/yale/tokens/u1", json!({ "platform": "ios" }))
    .await
    .unwrap();
  assert!(s.get_token("yale", "u1").await.unwrap().is_none());
  assert!(s.list_tokens("yale").await.unwrap().is_empty());
}

// ─── Deletion and maintenance ────────────────────────────────────────────────

#[tokio::test]
async fn delete_document_removes_descendants_only() {
  let s = store().await;
  s.set_document(&post_path("yale", "p1"), json!({ "posterId": "a" })).await.unwrap();
  s.set_document(&post_path("yale", "p10"), json!({ "posterId": "a" })).await.unwrap();
  s.set_document(&comment_path("yale", "p1", "c1"), json!({ "posterId": "b" }))
    .await
    .unwrap();

  assert!(s.delete_document(&post_path("yale", "p1")).await.unwrap());
  assert!(s.get_document(&comment_path("yale", "p1", "c1")).await.unwrap().is_none());
  assert!(s.get_document(&post_path("yale", "p10")).await.unwrap().is_some());
  assert!(!s.delete_document(&post_path("yale", "p1")).await.unwrap());
}

#[tokio::test]
async fn delete_posts_before_sweeps_only_old_posts() {
  let s = store().await;
  let now = Utc::now();
  let old = (now - Duration::days(8)).to_rfc3339();
  let fresh = (now - Duration::days(1)).to_rfc3339();

  s.set_document(&post_path("yale", "old"), json!({ "posterId": "a", "date": old }))
    .await
    .unwrap();
  s.set_document(&comment_path("yale", "old", "c"), json!({ "posterId": "b" }))
    .await
    .unwrap();
  s.set_document(&post_path("yale", "new"), json!({ "posterId": "a", "date": fresh }))
    .await
    .unwrap();
  s.set_document(&post_path("yale", "undated"), json!({ "posterId": "a" }))
    .await
    .unwrap();
  s.set_document(&post_path("rice", "old"), json!({ "posterId": "a", "date": old }))
    .await
    .unwrap();

  let deleted = s
    .delete_posts_before("yale", now - Duration::days(7))
    .await
    .unwrap();
  assert_eq!(deleted, 1);

  assert!(s.get_post("yale", "old").await.unwrap().is_none());
  assert!(s.get_comment("yale", "old", "c").await.unwrap().is_none());
  assert!(s.get_post("yale", "new").await.unwrap().is_some());
  assert!(s.get_post("yale", "undated").await.unwrap().is_some());
  assert!(s.get_post("rice", "old").await.unwrap().is_some());
}
