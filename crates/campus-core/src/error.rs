//! Error types for `campus-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid path template {template:?}: {reason}")]
  InvalidTemplate { template: String, reason: &'static str },

  #[error("missing path parameter: {0}")]
  MissingParam(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
