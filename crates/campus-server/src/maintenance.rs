//! The periodic post TTL sweep.

use std::{sync::Arc, time::Duration};

use campus_core::store::DocumentWriter;
use tokio::{
  task::JoinHandle,
  time::{self, MissedTickBehavior},
};

/// Run [`campus_api::maintenance::sweep`] over `schools` now and then every
/// `every`. Failures are logged and the next tick tries again.
pub fn spawn_sweeper<W>(
  store: Arc<W>,
  schools: Arc<Vec<String>>,
  ttl: chrono::Duration,
  every: Duration,
) -> JoinHandle<()>
where
  W: DocumentWriter + 'static,
{
  tokio::spawn(async move {
    let mut ticks = time::interval(every);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
      ticks.tick().await;
      match campus_api::maintenance::sweep(store.as_ref(), &schools, ttl).await {
        Ok(summary) => tracing::info!(
          deleted = summary.total(),
          cutoff = %summary.cutoff,
          "maintenance sweep finished"
        ),
        Err(e) => tracing::error!("maintenance sweep failed: {e}"),
      }
    }
  })
}
