//! Document change events as delivered by the event source.
//!
//! Delivery is at-least-once: the same logical change may arrive more than
//! once, and events for different documents arrive in no particular order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which subscription kind an event is routed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
  Create,
  Update,
}

/// An explicit change-log entry: the write that produced an update appended
/// `value` to the list field `field`.
///
/// When an update carries one of these, consumers use it instead of
/// inferring the new element from the tail of the after-snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListAppend {
  pub field: String,
  pub value: Value,
}

/// A document-created or document-updated event.
///
/// Snapshots are raw JSON; a JSON `null` is the same as an absent snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DocumentEvent {
  #[serde(rename = "create")]
  Created {
    path:     String,
    #[serde(default)]
    document: Option<Value>,
  },
  #[serde(rename = "update")]
  Updated {
    path:     String,
    #[serde(default)]
    before:   Option<Value>,
    #[serde(default)]
    after:    Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    appended: Vec<ListAppend>,
  },
}

impl DocumentEvent {
  pub fn created(path: impl Into<String>, document: Value) -> Self {
    Self::Created { path: path.into(), document: Some(document) }
  }

  pub fn updated(
    path: impl Into<String>,
    before: Option<Value>,
    after: Option<Value>,
  ) -> Self {
    Self::Updated {
      path: path.into(),
      before,
      after,
      appended: Vec::new(),
    }
  }

  /// Attach an explicit list append to an update event. No-op on creates.
  pub fn with_append(mut self, field: impl Into<String>, value: Value) -> Self {
    if let Self::Updated { appended, .. } = &mut self {
      appended.push(ListAppend { field: field.into(), value });
    }
    self
  }

  pub fn kind(&self) -> EventKind {
    match self {
      Self::Created { .. } => EventKind::Create,
      Self::Updated { .. } => EventKind::Update,
    }
  }

  pub fn path(&self) -> &str {
    match self {
      Self::Created { path, .. } | Self::Updated { path, .. } => path,
    }
  }

  /// The most recent explicit append to `field`, if the event carries one.
  pub fn appended_to(&self, field: &str) -> Option<&Value> {
    match self {
      Self::Updated { appended, .. } => appended
        .iter()
        .rev()
        .find(|a| a.field == field)
        .map(|a| &a.value),
      Self::Created { .. } => None,
    }
  }
}

/// Treat a JSON `null` snapshot the same as a missing one.
pub fn present(snapshot: &Option<Value>) -> Option<&Value> {
  snapshot.as_ref().filter(|v| !v.is_null())
}
