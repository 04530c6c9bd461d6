//! The notification policy engine.
//!
//! Given a document event, decides who gets a push notification and with
//! what content, then hands the result to a
//! [`NotificationSender`](campus_core::store::NotificationSender). The engine
//! holds no state between invocations; everything it needs is read from the
//! injected [`DocumentStore`](campus_core::store::DocumentStore) and
//! [`TokenDirectory`](campus_core::store::TokenDirectory).
//!
//! ```rust,ignore
//! let engine = Engine::new(store.clone(), store, sender)?;
//! let report = engine.dispatch(&event).await?;
//! ```

pub mod engine;
pub mod messages;
pub mod report;
pub mod trigger;

mod handlers;

pub use engine::{DispatchError, Engine};
pub use report::{Delivery, DeliveryOutcome, NotificationKind, Report, Skip, SkipReason, Target};
pub use trigger::{Handler, Triggers};

/// Likes at which a post becomes "popular" and is broadcast school-wide.
pub const POPULAR_THRESHOLD: u32 = 10;
