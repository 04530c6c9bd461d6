//! Runtime configuration, layered from `config.toml` and `CAMPUS_*`
//! environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// The legacy FCM HTTP endpoint.
pub const DEFAULT_FCM_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  /// Tenants the maintenance sweep visits.
  #[serde(default = "default_schools")]
  pub schools:             Vec<String>,
  #[serde(default = "default_sweep_interval_secs")]
  pub sweep_interval_secs: u64,
  #[serde(default = "default_post_ttl_days")]
  pub post_ttl_days:       i64,
  #[serde(default)]
  pub push:                PushConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PushConfig {
  #[serde(default = "default_endpoint")]
  pub endpoint:   String,
  /// Required unless `dry_run` is set.
  pub server_key: Option<String>,
  /// Log notifications instead of sending them.
  #[serde(default)]
  pub dry_run:    bool,
}

impl Default for PushConfig {
  fn default() -> Self {
    Self { endpoint: default_endpoint(), server_key: None, dry_run: false }
  }
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/campus-notify/campus.db") }
fn default_schools() -> Vec<String> {
  ["notreDame", "yale", "rice"].map(str::to_owned).to_vec()
}
fn default_sweep_interval_secs() -> u64 { 4 * 60 * 60 }
fn default_post_ttl_days() -> i64 { 7 }
fn default_endpoint() -> String { DEFAULT_FCM_ENDPOINT.to_owned() }

impl ServerConfig {
  /// Read `path` (optional) and overlay `CAMPUS_*` environment variables.
  ///
  /// Nested keys use a double underscore (`CAMPUS_PUSH__SERVER_KEY`);
  /// `CAMPUS_SCHOOLS` is a comma-separated list.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("CAMPUS")
          .prefix_separator("_")
          .separator("__")
          .list_separator(",")
          .with_list_parse_key("schools")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn sweep_interval(&self) -> std::time::Duration {
    std::time::Duration::from_secs(self.sweep_interval_secs)
  }

  pub fn post_ttl(&self) -> chrono::Duration { chrono::Duration::days(self.post_ttl_days) }
}
