//! SQL schema for the response cache.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per cached response, keyed by the SHA-256 of the request key.
CREATE TABLE IF NOT EXISTS responses (
    key         TEXT PRIMARY KEY,   -- lowercase hex digest
    value       TEXT NOT NULL,
    stored_at   TEXT NOT NULL,      -- ISO 8601 UTC
    expires_at  INTEGER NOT NULL    -- unix epoch milliseconds
);

CREATE INDEX IF NOT EXISTS responses_expiry_idx ON responses(expires_at);

PRAGMA user_version = 1;
";
