//! Document paths and the templates that match them.
//!
//! Paths are slash-separated, Firestore style: collection and document ids
//! alternate (`users/yale/posts/abc123`). A [`PathTemplate`] replaces some of
//! those segments with named placeholders (`users/{school}/posts/{postID}`);
//! matching a concrete path binds each placeholder into [`Params`].

use std::{collections::BTreeMap, fmt};

use serde::Serialize;

use crate::{Error, Result};

// ─── Well-known templates ────────────────────────────────────────────────────

/// The document templates the standard triggers subscribe to.
pub mod templates {
  pub const POST: &str = "users/{school}/posts/{postID}";
  pub const COMMENT: &str = "users/{school}/posts/{postID}/comments/{commentID}";
  pub const REPLY: &str =
    "users/{school}/posts/{postID}/comments/{commentID}/replies/{replyID}";
  pub const RELATIONSHIP: &str = "users/{school}/relationships/{relationshipID}";
}

// ─── Concrete path builders ──────────────────────────────────────────────────

pub fn posts_collection(school: &str) -> String { format!("users/{school}/posts") }

pub fn post_path(school: &str, post_id: &str) -> String {
  format!("users/{school}/posts/{post_id}")
}

pub fn comment_path(school: &str, post_id: &str, comment_id: &str) -> String {
  format!("users/{school}/posts/{post_id}/comments/{comment_id}")
}

pub fn relationship_path(school: &str, user_id: &str) -> String {
  format!("users/{school}/relationships/{user_id}")
}

pub fn profile_path(school: &str, user_id: &str) -> String {
  format!("users/{school}/profiles/{user_id}")
}

pub fn tokens_collection(school: &str) -> String { format!("users/{school}/tokens") }

pub fn token_path(school: &str, user_id: &str) -> String {
  format!("users/{school}/tokens/{user_id}")
}

/// Split a path into its parent collection and the final document id.
///
/// Returns `None` for paths with fewer than two segments.
pub fn split_parent(path: &str) -> Option<(&str, &str)> {
  let path = path.trim_matches('/');
  let (parent, id) = path.rsplit_once('/')?;
  if parent.is_empty() || id.is_empty() {
    return None;
  }
  Some((parent, id))
}

// ─── Params ──────────────────────────────────────────────────────────────────

/// Placeholder values bound by [`PathTemplate::matches`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Params(BTreeMap<String, String>);

impl Params {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.0.insert(name.into(), value.into());
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.0.get(name).map(String::as_str)
  }

  /// Like [`Params::get`], but a missing placeholder is an error.
  pub fn require(&self, name: &str) -> Result<&str> {
    self.get(name).ok_or_else(|| Error::MissingParam(name.to_owned()))
  }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

// ─── PathTemplate ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
  Literal(String),
  Param(String),
}

/// A parsed path template such as `users/{school}/posts/{postID}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
  raw:      String,
  segments: Vec<Segment>,
}

impl PathTemplate {
  pub fn parse(template: &str) -> Result<Self> {
    let invalid = |reason| Error::InvalidTemplate {
      template: template.to_owned(),
      reason,
    };

    let trimmed = template.trim_matches('/');
    if trimmed.is_empty() {
      return Err(invalid("template is empty"));
    }

    let mut segments = Vec::new();
    for part in trimmed.split('/') {
      if part.is_empty() {
        return Err(invalid("empty segment"));
      }
      let segment = match part.strip_prefix('{') {
        Some(rest) => {
          let name = rest
            .strip_suffix('}')
            .ok_or_else(|| invalid("unbalanced braces"))?;
          if name.is_empty() {
            return Err(invalid("empty placeholder name"));
          }
          if name.contains(['{', '}']) {
            return Err(invalid("unbalanced braces"));
          }
          if segments
            .iter()
            .any(|s| matches!(s, Segment::Param(n) if n == name))
          {
            return Err(invalid("duplicate placeholder name"));
          }
          Segment::Param(name.to_owned())
        }
        None if part.contains(['{', '}']) => {
          return Err(invalid("unbalanced braces"));
        }
        None => Segment::Literal(part.to_owned()),
      };
      segments.push(segment);
    }

    Ok(Self { raw: trimmed.to_owned(), segments })
  }

  /// Match a concrete path, binding every placeholder.
  ///
  /// The segment counts must agree exactly; a template never matches a
  /// descendant of the documents it names.
  pub fn matches(&self, path: &str) -> Option<Params> {
    let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
    if parts.len() != self.segments.len() {
      return None;
    }

    let mut params = Params::new();
    for (segment, part) in self.segments.iter().zip(parts) {
      if part.is_empty() {
        return None;
      }
      match segment {
        Segment::Literal(lit) if lit == part => {}
        Segment::Literal(_) => return None,
        Segment::Param(name) => params.insert(name.as_str(), part),
      }
    }
    Some(params)
  }
}

impl fmt::Display for PathTemplate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.raw)
  }
}
