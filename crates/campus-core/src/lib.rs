//! Core types and trait definitions for campus notifications.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Documents, path templates, events and the collaborator traits
//! ([`store::DocumentStore`], [`store::TokenDirectory`],
//! [`store::NotificationSender`], [`store::DocumentWriter`]) live here;
//! every other crate depends on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod document;
pub mod error;
pub mod event;
pub mod notification;
pub mod path;
pub mod store;

pub use error::{Error, Result};
