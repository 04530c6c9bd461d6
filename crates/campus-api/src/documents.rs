//! Handlers for `/documents/{*path}` endpoints.
//!
//! Each write is applied to the store and then replayed through the engine
//! as the event the document database would have emitted.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `PUT`    | `/documents/{*path}` | Body: JSON object; fires create or update |
//! | `POST`   | `/documents/{*path}/append` | Body: [`AppendBody`]; fires update with the append |
//! | `DELETE` | `/documents/{*path}` | Removes the document and everything below it |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use campus_core::{
  event::DocumentEvent,
  store::{DocumentWriter, NotificationSender},
};
use campus_policy::Report;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ApiError, AppState, Backend};

/// Response to a document write.
#[derive(Debug, Serialize)]
pub struct WriteResponse {
  /// `true` if the write created the document.
  pub created: bool,
  /// What the engine did with the resulting event; `null` when no trigger
  /// watches the path.
  pub report:  Option<Report>,
}

/// Reject anything that is not `collection/id[/collection/id...]`.
fn document_path(raw: &str) -> Result<&str, ApiError> {
  let path = raw.trim_matches('/');
  let segments = path.split('/').count();
  if segments % 2 != 0 || path.split('/').any(str::is_empty) {
    return Err(ApiError::BadRequest(format!("{raw:?} is not a document path")));
  }
  Ok(path)
}

fn is_field_name(name: &str) -> bool {
  !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ─── Put ─────────────────────────────────────────────────────────────────────

/// `PUT /documents/{*path}` — create or replace a document.
pub async fn put_one<S, N>(
  State(state): State<AppState<S, N>>,
  Path(raw): Path<String>,
  Json(data): Json<Value>,
) -> Result<Json<WriteResponse>, ApiError>
where
  S: Backend,
  N: NotificationSender + 'static,
{
  let path = document_path(&raw)?;
  if !data.is_object() {
    return Err(ApiError::BadRequest("document body must be a JSON object".to_owned()));
  }

  let write = state.store.set_document(path, data).await.map_err(ApiError::store)?;
  let event = if write.created {
    DocumentEvent::created(path, write.after)
  } else {
    DocumentEvent::updated(path, write.before, Some(write.after))
  };

  let report = state.fire(&event).await;
  Ok(Json(WriteResponse { created: write.created, report }))
}

// ─── Append ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /documents/{*path}/append`.
#[derive(Debug, Deserialize)]
pub struct AppendBody {
  /// The list field to append to.
  pub field:     String,
  pub value:     Value,
  /// A numeric field to increment in the same write (e.g. `numLikes`).
  pub increment: Option<String>,
}

/// `POST /documents/{*path}/append` — append one element to a list field.
///
/// The update event carries the appended element explicitly, so handlers
/// never have to guess it from the tail of the list.
pub async fn append<S, N>(
  State(state): State<AppState<S, N>>,
  Path(raw): Path<String>,
  Json(body): Json<AppendBody>,
) -> Result<Json<WriteResponse>, ApiError>
where
  S: Backend,
  N: NotificationSender + 'static,
{
  let Some(raw) = raw.trim_end_matches('/').strip_suffix("/append") else {
    return Err(ApiError::NotFound(format!("no action at {raw:?}")));
  };
  let path = document_path(raw)?;

  for name in std::iter::once(&body.field).chain(body.increment.as_ref()) {
    if !is_field_name(name) {
      return Err(ApiError::BadRequest(format!("invalid field name {name:?}")));
    }
  }

  let write = state
    .store
    .append_to_list(path, &body.field, body.value.clone(), body.increment.as_deref())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("document {path} not found")))?;

  let event = DocumentEvent::updated(path, write.before, Some(write.after))
    .with_append(body.field, body.value);

  let report = state.fire(&event).await;
  Ok(Json(WriteResponse { created: false, report }))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /documents/{*path}` — no trigger watches deletes.
pub async fn delete_one<S, N>(
  State(state): State<AppState<S, N>>,
  Path(raw): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: Backend,
  N: NotificationSender + 'static,
{
  let path = document_path(&raw)?;
  if state.store.delete_document(path).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("document {path} not found")))
  }
}
