//! SQL schema for the campus document store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per document. `parent` is the collection path, so
-- `users/yale/posts/p1` has parent `users/yale/posts` and doc_id `p1`.
CREATE TABLE IF NOT EXISTS documents (
    path        TEXT PRIMARY KEY,
    parent      TEXT NOT NULL,
    doc_id      TEXT NOT NULL,
    data        TEXT NOT NULL,   -- JSON object
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS documents_parent_idx ON documents(parent);

PRAGMA user_version = 1;
";
