//! SQLite document store for campus notifications.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Implements both
//! [`campus_core::store::DocumentStore`] and
//! [`campus_core::store::TokenDirectory`] for the policy engine, and
//! [`campus_core::store::DocumentWriter`] for the HTTP layer and the
//! maintenance sweep.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
