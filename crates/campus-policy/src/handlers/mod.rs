//! One module per subscribed handler, plus the snapshot plumbing they share.

pub(crate) mod comment;
pub(crate) mod like;
pub(crate) mod post;
pub(crate) mod relationship;
pub(crate) mod reply;

use campus_core::{
  document,
  event::{DocumentEvent, present},
  path::Params,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::report::{Report, SkipReason};

/// Both sides of an update, or `None` (recorded) if either is missing.
fn update_snapshots<'e>(
  event: &'e DocumentEvent,
  report: &mut Report,
) -> Option<(&'e Value, &'e Value)> {
  let DocumentEvent::Updated { before, after, .. } = event else {
    report.discard(SkipReason::MissingSnapshot);
    return None;
  };
  match (present(before), present(after)) {
    (Some(b), Some(a)) => Some((b, a)),
    _ => {
      report.discard(SkipReason::MissingSnapshot);
      None
    }
  }
}

/// The created document, or `None` (recorded) if the event carries none.
fn created_document<'e>(event: &'e DocumentEvent, report: &mut Report) -> Option<&'e Value> {
  let doc = match event {
    DocumentEvent::Created { document, .. } => present(document),
    DocumentEvent::Updated { .. } => None,
  };
  if doc.is_none() {
    report.discard(SkipReason::MissingSnapshot);
  }
  doc
}

/// Decode a snapshot, discarding the event if it has the wrong shape.
fn decode_or_discard<V: DeserializeOwned>(value: &Value, report: &mut Report) -> Option<V> {
  match document::decode(value) {
    Ok(v) => Some(v),
    Err(e) => {
      tracing::warn!("malformed snapshot: {e}");
      report.discard(SkipReason::Malformed);
      None
    }
  }
}

/// A bound path parameter. The standard templates always bind the names
/// the handlers ask for; a custom subscription might not.
fn param<'p>(params: &'p Params, name: &str, report: &mut Report) -> Option<&'p str> {
  match params.require(name) {
    Ok(v) => Some(v),
    Err(e) => {
      tracing::warn!("{e}");
      report.discard(SkipReason::Malformed);
      None
    }
  }
}
