//! Push notification payloads and send outcomes.

use serde::{Deserialize, Serialize};

/// The user-visible part of a push notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  pub title: String,
  pub body:  String,
}

impl Notification {
  pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
    Self { title: title.into(), body: body.into() }
  }
}

/// Result of a single-recipient send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendOutcome {
  Success,
  Failure,
}

impl SendOutcome {
  pub fn is_success(self) -> bool { matches!(self, Self::Success) }
}

/// Aggregate result of a multicast send. Per-token status is not reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MulticastOutcome {
  pub success_count: usize,
  pub failure_count: usize,
}
