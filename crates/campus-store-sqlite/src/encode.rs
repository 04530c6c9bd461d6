//! Conversions between domain values and the text stored in SQLite columns.
//!
//! Timestamps are RFC 3339 in UTC with a `Z` suffix. Document bodies are
//! compact JSON objects.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::{Error, Result};

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_json(s: &str) -> Result<Value> { Ok(serde_json::from_str(s)?) }

/// Field names are spliced into JSON paths, so only identifiers are allowed.
pub fn validate_field(field: &str) -> Result<()> {
  let ok = !field.is_empty()
    && field
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '_');
  if ok { Ok(()) } else { Err(Error::InvalidField(field.to_owned())) }
}
