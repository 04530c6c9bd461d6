//! Process-level pieces of the notification server: configuration, the
//! push sender, and the periodic maintenance task. The binary in `main.rs`
//! wires them to a [`campus_store_sqlite::SqliteStore`] and the
//! [`campus_api`] router.

pub mod config;
pub mod maintenance;
pub mod sender;

pub use config::{PushConfig, ServerConfig};
pub use sender::PushSender;
