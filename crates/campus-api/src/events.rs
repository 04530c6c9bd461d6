//! `POST /events` — hand a raw document event to the engine.

use axum::{Json, extract::State};
use campus_core::{event::DocumentEvent, store::NotificationSender};
use campus_policy::Report;

use crate::{ApiError, AppState, Backend};

/// Dispatch `event` and return what the engine did. An event no trigger is
/// subscribed to is a 404.
pub async fn dispatch<S, N>(
  State(state): State<AppState<S, N>>,
  Json(event): Json<DocumentEvent>,
) -> Result<Json<Report>, ApiError>
where
  S: Backend,
  N: NotificationSender + 'static,
{
  let report = state.engine.dispatch(&event).await?;
  Ok(Json(report))
}
