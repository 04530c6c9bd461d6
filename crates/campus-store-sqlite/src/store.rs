//! [`SqliteStore`] — the SQLite implementation of [`DocumentStore`],
//! [`TokenDirectory`] and [`DocumentWriter`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use campus_core::{
  document::{self, Comment, Post, Profile, Relationship, TokenRegistration},
  path::{
    comment_path, post_path, posts_collection, profile_path, relationship_path,
    split_parent, token_path, tokens_collection,
  },
  store::{DocumentStore, DocumentWriter, TokenDirectory, WriteResult},
};

use crate::{
  Error, Result,
  encode::{decode_dt, decode_json, encode_dt, validate_field},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A document store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_typed<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
    match self.get_document(path).await? {
      Some(value) => Ok(Some(document::decode(&value)?)),
      None => Ok(None),
    }
  }
}

// ─── DocumentWriter impl ─────────────────────────────────────────────────────

impl DocumentWriter for SqliteStore {
  type Error = Error;

  // ── Documents ─────────────────────────────────────────────────────────────

  /// Fetch the raw JSON body of the document at `path`.
  async fn get_document(&self, path: &str) -> Result<Option<Value>> {
    let path = path.trim_matches('/').to_owned();

    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT data FROM documents WHERE path = ?1",
            rusqlite::params![path],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    raw.as_deref().map(decode_json).transpose()
  }

  /// Create or replace the document at `path`.
  async fn set_document(&self, path: &str, data: Value) -> Result<WriteResult> {
    let path = path.trim_matches('/').to_owned();
    let (parent, doc_id) = split_parent(&path)
      .map(|(p, id)| (p.to_owned(), id.to_owned()))
      .ok_or_else(|| Error::InvalidPath(path.clone()))?;
    if !data.is_object() {
      return Err(Error::NotAnObject(path));
    }

    let data_str = data.to_string();
    let now_str  = encode_dt(Utc::now());

    let before_raw: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let before: Option<String> = tx
          .query_row(
            "SELECT data FROM documents WHERE path = ?1",
            rusqlite::params![path],
            |row| row.get(0),
          )
          .optional()?;
        tx.execute(
          "INSERT INTO documents (path, parent, doc_id, data, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)
           ON CONFLICT(path) DO UPDATE
             SET data = excluded.data, updated_at = excluded.updated_at",
          rusqlite::params![path, parent, doc_id, data_str, now_str],
        )?;
        tx.commit()?;
        Ok(before)
      })
      .await?;

    let before = before_raw.as_deref().map(decode_json).transpose()?;
    Ok(WriteResult { created: before.is_none(), before, after: data })
  }

  /// Append `value` to the list field `field` of an existing document, and
  /// optionally increment the numeric field `counter` in the same write.
  ///
  /// Returns `None` if the document does not exist.
  async fn append_to_list(
    &self,
    path:    &str,
    field:   &str,
    value:   Value,
    counter: Option<&str>,
  ) -> Result<Option<WriteResult>> {
    validate_field(field)?;
    if let Some(c) = counter {
      validate_field(c)?;
    }

    let path         = path.trim_matches('/').to_owned();
    let list_path    = format!("$.{field}");
    let counter_path = counter.map(|c| format!("$.{c}"));
    let value_str    = value.to_string();
    let now_str      = encode_dt(Utc::now());

    let raw: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let before: Option<String> = tx
          .query_row(
            "SELECT data FROM documents WHERE path = ?1",
            rusqlite::params![path],
            |row| row.get(0),
          )
          .optional()?;
        let Some(before) = before else {
          return Ok(None);
        };

        let appended = "json_insert(
             coalesce(json_extract(data, ?2), json('[]')), '$[#]', json(?3))";
        match counter_path {
          Some(cp) => tx.execute(
            &format!(
              "UPDATE documents
                 SET data = json_set(data, ?2, {appended},
                                     ?5, coalesce(json_extract(data, ?5), 0) + 1),
                     updated_at = ?4
               WHERE path = ?1"
            ),
            rusqlite::params![path, list_path, value_str, now_str, cp],
          )?,
          None => tx.execute(
            &format!(
              "UPDATE documents
                 SET data = json_set(data, ?2, {appended}), updated_at = ?4
               WHERE path = ?1"
            ),
            rusqlite::params![path, list_path, value_str, now_str],
          )?,
        };

        let after: String = tx.query_row(
          "SELECT data FROM documents WHERE path = ?1",
          rusqlite::params![path],
          |row| row.get(0),
        )?;
        tx.commit()?;
        Ok(Some((before, after)))
      })
      .await?;

    raw
      .map(|(before, after)| -> Result<WriteResult> {
        Ok(WriteResult {
          created: false,
          before:  Some(decode_json(&before)?),
          after:   decode_json(&after)?,
        })
      })
      .transpose()
  }

  /// Delete the document at `path` together with everything nested below
  /// it. Returns `false` if no document existed at `path`.
  async fn delete_document(&self, path: &str) -> Result<bool> {
    let path = path.trim_matches('/').to_owned();

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = delete_subtree(&tx, &path)?;
        tx.commit()?;
        Ok(n)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── Tokens ────────────────────────────────────────────────────────────────

  async fn register_token(
    &self,
    school:  &str,
    user_id: &str,
    token:   &str,
  ) -> Result<()> {
    self
      .set_document(&token_path(school, user_id), json!({ "fcmToken": token }))
      .await?;
    Ok(())
  }

  /// Remove a user's registration. Returns `false` if there was none.
  async fn unregister_token(&self, school: &str, user_id: &str) -> Result<bool> {
    self.delete_document(&token_path(school, user_id)).await
  }

  // ── Maintenance ───────────────────────────────────────────────────────────

  /// Delete every post in `school` dated strictly before `cutoff`, along
  /// with its comments and replies. Posts without a readable `date` are
  /// kept. Returns the number of posts deleted.
  async fn delete_posts_before(
    &self,
    school: &str,
    cutoff: DateTime<Utc>,
  ) -> Result<usize> {
    let parent = posts_collection(school);

    let dated: Vec<(String, Option<String>)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT path, json_extract(data, '$.date')
             FROM documents
            WHERE parent = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![parent], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let expired: Vec<String> = dated
      .into_iter()
      .filter_map(|(path, date)| {
        let date = decode_dt(date.as_deref()?).ok()?;
        (date < cutoff).then_some(path)
      })
      .collect();

    if expired.is_empty() {
      return Ok(0);
    }

    let count = expired.len();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for path in &expired {
          delete_subtree(&tx, path)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(count)
  }
}

/// Delete `path` and every document whose path starts with `path/`.
fn delete_subtree(tx: &rusqlite::Transaction<'_>, path: &str) -> rusqlite::Result<usize> {
  let own = tx.execute(
    "DELETE FROM documents WHERE path = ?1",
    rusqlite::params![path],
  )?;
  tx.execute(
    "DELETE FROM documents
      WHERE substr(path, 1, length(?1) + 1) = ?1 || '/'",
    rusqlite::params![path],
  )?;
  Ok(own)
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  async fn get_post(&self, school: &str, post_id: &str) -> Result<Option<Post>> {
    self.get_typed(&post_path(school, post_id)).await
  }

  async fn get_comment(
    &self,
    school:     &str,
    post_id:    &str,
    comment_id: &str,
  ) -> Result<Option<Comment>> {
    self.get_typed(&comment_path(school, post_id, comment_id)).await
  }

  async fn get_relationship(
    &self,
    school:  &str,
    user_id: &str,
  ) -> Result<Option<Relationship>> {
    self.get_typed(&relationship_path(school, user_id)).await
  }

  async fn get_profile(&self, school: &str, user_id: &str) -> Result<Option<Profile>> {
    self.get_typed(&profile_path(school, user_id)).await
  }

  async fn claim_popular_notification(&self, school: &str, post_id: &str) -> Result<bool> {
    let path    = post_path(school, post_id);
    let now_str = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE documents
              SET data = json_set(data, '$.popularNotified', json('true')),
                  updated_at = ?2
            WHERE path = ?1
              AND coalesce(json_extract(data, '$.popularNotified'), 0) = 0",
          rusqlite::params![path, now_str],
        )?)
      })
      .await?;

    Ok(changed == 1)
  }
}

// ─── TokenDirectory impl ─────────────────────────────────────────────────────

impl TokenDirectory for SqliteStore {
  type Error = Error;

  async fn get_token(&self, school: &str, user_id: &str) -> Result<Option<String>> {
    let reg: Option<TokenRegistration> = self.get_typed(&token_path(school, user_id)).await?;
    Ok(reg.and_then(|r| r.token().map(str::to_owned)))
  }

  async fn list_tokens(&self, school: &str) -> Result<Vec<String>> {
    let parent = tokens_collection(school);

    let tokens: Vec<Option<String>> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT json_extract(data, '$.fcmToken')
             FROM documents
            WHERE parent = ?1
            ORDER BY doc_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![parent], |row| row.get::<_, Option<String>>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      tokens
        .into_iter()
        .flatten()
        .filter(|t| !t.trim().is_empty())
        .collect(),
    )
  }
}
