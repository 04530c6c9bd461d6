//! Handlers for `/tokens/{school}/{user_id}`: push-token registration.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use campus_core::store::{DocumentWriter, NotificationSender};
use serde::Deserialize;

use crate::{ApiError, AppState, Backend};

/// JSON body accepted by `PUT /tokens/{school}/{user_id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBody {
  pub fcm_token: String,
}

/// `PUT /tokens/{school}/{user_id}` — register or replace the user's token.
pub async fn register<S, N>(
  State(state): State<AppState<S, N>>,
  Path((school, user_id)): Path<(String, String)>,
  Json(body): Json<TokenBody>,
) -> Result<StatusCode, ApiError>
where
  S: Backend,
  N: NotificationSender + 'static,
{
  let token = body.fcm_token.trim();
  if token.is_empty() {
    return Err(ApiError::BadRequest("fcmToken must not be empty".to_owned()));
  }
  state
    .store
    .register_token(&school, &user_id, token)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(school, user_id, "push token registered");
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /tokens/{school}/{user_id}` — idempotent.
pub async fn unregister<S, N>(
  State(state): State<AppState<S, N>>,
  Path((school, user_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError>
where
  S: Backend,
  N: NotificationSender + 'static,
{
  let removed = state
    .store
    .unregister_token(&school, &user_id)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(school, user_id, removed, "push token unregistered");
  Ok(StatusCode::NO_CONTENT)
}
