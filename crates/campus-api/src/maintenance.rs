//! The post TTL sweep, shared by `POST /maintenance/sweep` and the server's
//! periodic task.

use std::collections::BTreeMap;

use axum::{Json, extract::State};
use campus_core::store::{DocumentWriter, NotificationSender};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::{ApiError, AppState, Backend};

/// What one sweep removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
  /// Posts dated before this instant were deleted.
  pub cutoff:  DateTime<Utc>,
  /// Posts deleted per school.
  pub deleted: BTreeMap<String, usize>,
}

impl SweepSummary {
  pub fn total(&self) -> usize { self.deleted.values().sum() }
}

/// Delete every post older than `ttl` in each of `schools`.
///
/// Stops at the first store error; schools already swept stay swept.
pub async fn sweep<W>(
  store: &W,
  schools: &[String],
  ttl: Duration,
) -> Result<SweepSummary, W::Error>
where
  W: DocumentWriter,
{
  let cutoff = Utc::now() - ttl;
  let mut deleted = BTreeMap::new();
  for school in schools {
    let n = store.delete_posts_before(school, cutoff).await?;
    if n > 0 {
      tracing::info!(school, deleted = n, %cutoff, "expired posts removed");
    }
    deleted.insert(school.clone(), n);
  }
  Ok(SweepSummary { cutoff, deleted })
}

/// `POST /maintenance/sweep` — run the sweep now.
pub async fn run<S, N>(
  State(state): State<AppState<S, N>>,
) -> Result<Json<SweepSummary>, ApiError>
where
  S: Backend,
  N: NotificationSender + 'static,
{
  let summary = sweep(state.store.as_ref(), &state.schools, state.post_ttl)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(summary))
}
