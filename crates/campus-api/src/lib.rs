//! JSON HTTP surface for the notification engine.
//!
//! Exposes an axum [`Router`] that acts as the event source: document
//! writes go to the store and then fire the matching create or update
//! trigger, and raw events can be posted directly. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let state = AppState::new(store, sender, schools, post_ttl)?;
//! let app = Router::new().nest("/v1", campus_api::api_router(state));
//! ```

pub mod documents;
pub mod error;
pub mod events;
pub mod maintenance;
pub mod tokens;

use std::sync::Arc;

use axum::{
  Router,
  routing::{post, put},
};
use campus_core::store::{DocumentStore, DocumentWriter, NotificationSender, TokenDirectory};
use campus_policy::{DispatchError, Engine, Report};
use chrono::Duration;

pub use error::ApiError;

// ─── Backend ─────────────────────────────────────────────────────────────────

/// A single store that serves reads to the engine and writes to the API.
pub trait Backend: DocumentStore + TokenDirectory + DocumentWriter + 'static {}

impl<S> Backend for S where S: DocumentStore + TokenDirectory + DocumentWriter + 'static {}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, N> {
  pub store:    Arc<S>,
  pub engine:   Engine<S, S, N>,
  /// Schools the maintenance sweep visits.
  pub schools:  Arc<Vec<String>>,
  /// Posts older than this are removed by the sweep.
  pub post_ttl: Duration,
}

impl<S, N> Clone for AppState<S, N> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      engine:   self.engine.clone(),
      schools:  Arc::clone(&self.schools),
      post_ttl: self.post_ttl,
    }
  }
}

impl<S, N> AppState<S, N>
where
  S: Backend,
  N: NotificationSender + 'static,
{
  /// Wire an engine with the standard triggers to `store` and `sender`.
  pub fn new(
    store: Arc<S>,
    sender: Arc<N>,
    schools: Vec<String>,
    post_ttl: Duration,
  ) -> campus_core::Result<Self> {
    let engine = Engine::new(Arc::clone(&store), Arc::clone(&store), sender)?;
    Ok(Self { store, engine, schools: Arc::new(schools), post_ttl })
  }

  /// Dispatch an event produced by a write. Writes to paths nothing is
  /// subscribed to are ordinary and yield no report.
  pub(crate) async fn fire(&self, event: &campus_core::event::DocumentEvent) -> Option<Report> {
    match self.engine.dispatch(event).await {
      Ok(report) => Some(report),
      Err(DispatchError::NoRoute { kind, path }) => {
        tracing::debug!(?kind, path, "write has no subscribed trigger");
        None
      }
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, N>(state: AppState<S, N>) -> Router<()>
where
  S: Backend,
  N: NotificationSender + 'static,
{
  Router::new()
    // Events
    .route("/events", post(events::dispatch::<S, N>))
    // Documents
    .route(
      "/documents/{*path}",
      put(documents::put_one::<S, N>)
        .post(documents::append::<S, N>)
        .delete(documents::delete_one::<S, N>),
    )
    // Tokens
    .route(
      "/tokens/{school}/{user_id}",
      put(tokens::register::<S, N>).delete(tokens::unregister::<S, N>),
    )
    // Maintenance
    .route("/maintenance/sweep", post(maintenance::run::<S, N>))
    .with_state(state)
}
