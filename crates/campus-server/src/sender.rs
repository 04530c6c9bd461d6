//! Push delivery: the FCM HTTP sender and a dry-run logger.

use std::time::Duration;

use campus_core::{
  notification::{MulticastOutcome, Notification, SendOutcome},
  store::NotificationSender,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PushConfig;

/// FCM rejects multicast requests with more registration ids than this.
pub const MAX_MULTICAST_TOKENS: usize = 1000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("push endpoint returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("push.server_key is required unless push.dry_run is set")]
  MissingServerKey,
}

// ─── FCM ─────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct FcmRequest<'a> {
  #[serde(skip_serializing_if = "Option::is_none")]
  to:               Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  registration_ids: Option<&'a [String]>,
  notification:     &'a Notification,
}

#[derive(Debug, Deserialize, Default)]
struct FcmResponse {
  #[serde(default)]
  success: usize,
  #[serde(default)]
  failure: usize,
}

/// Sends through the FCM HTTP endpoint, authenticating with a server key.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct FcmSender {
  client:     reqwest::Client,
  endpoint:   String,
  server_key: String,
}

impl FcmSender {
  pub fn new(endpoint: impl Into<String>, server_key: impl Into<String>) -> Result<Self, Error> {
    let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    Ok(Self {
      client,
      endpoint: endpoint.into(),
      server_key: server_key.into(),
    })
  }

  async fn post(&self, request: &FcmRequest<'_>) -> Result<FcmResponse, Error> {
    let response = self
      .client
      .post(&self.endpoint)
      .header(reqwest::header::AUTHORIZATION, format!("key={}", self.server_key))
      .json(request)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(Error::Status { status: status.as_u16(), body });
    }
    Ok(response.json().await?)
  }
}

impl NotificationSender for FcmSender {
  type Error = Error;

  async fn send_one(&self, token: &str, notification: &Notification) -> Result<SendOutcome, Error> {
    let response = self
      .post(&FcmRequest { to: Some(token), registration_ids: None, notification })
      .await?;
    Ok(if response.success > 0 { SendOutcome::Success } else { SendOutcome::Failure })
  }

  async fn send_multicast(
    &self,
    tokens: &[String],
    notification: &Notification,
  ) -> Result<MulticastOutcome, Error> {
    let mut outcome = MulticastOutcome::default();
    for batch in tokens.chunks(MAX_MULTICAST_TOKENS) {
      let response = self
        .post(&FcmRequest { to: None, registration_ids: Some(batch), notification })
        .await?;
      outcome.success_count += response.success;
      outcome.failure_count += response.failure;
    }
    Ok(outcome)
  }
}

// ─── Dry run ─────────────────────────────────────────────────────────────────

/// Logs every notification and reports it delivered.
#[derive(Debug, Clone, Default)]
pub struct LogSender;

impl NotificationSender for LogSender {
  type Error = Error;

  async fn send_one(&self, token: &str, notification: &Notification) -> Result<SendOutcome, Error> {
    tracing::info!(token, title = %notification.title, body = %notification.body, "dry-run send");
    Ok(SendOutcome::Success)
  }

  async fn send_multicast(
    &self,
    tokens: &[String],
    notification: &Notification,
  ) -> Result<MulticastOutcome, Error> {
    tracing::info!(
      tokens = tokens.len(),
      title = %notification.title,
      body = %notification.body,
      "dry-run multicast"
    );
    Ok(MulticastOutcome { success_count: tokens.len(), failure_count: 0 })
  }
}

// ─── Selection ───────────────────────────────────────────────────────────────

/// The sender chosen at startup from [`PushConfig`].
#[derive(Debug, Clone)]
pub enum PushSender {
  Fcm(FcmSender),
  Log(LogSender),
}

impl PushSender {
  pub fn from_config(config: &PushConfig) -> Result<Self, Error> {
    if config.dry_run {
      return Ok(Self::Log(LogSender));
    }
    match config.server_key.as_deref().map(str::trim) {
      Some(key) if !key.is_empty() => Ok(Self::Fcm(FcmSender::new(&config.endpoint, key)?)),
      _ => Err(Error::MissingServerKey),
    }
  }
}

impl NotificationSender for PushSender {
  type Error = Error;

  async fn send_one(&self, token: &str, notification: &Notification) -> Result<SendOutcome, Error> {
    match self {
      Self::Fcm(s) => s.send_one(token, notification).await,
      Self::Log(s) => s.send_one(token, notification).await,
    }
  }

  async fn send_multicast(
    &self,
    tokens: &[String],
    notification: &Notification,
  ) -> Result<MulticastOutcome, Error> {
    match self {
      Self::Fcm(s) => s.send_multicast(tokens, notification).await,
      Self::Log(s) => s.send_multicast(tokens, notification).await,
    }
  }
}
