//! SQL schema for the Spark SQLite store.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per profile document. The body is the document's fields as a JSON
-- object, without the id.
CREATE TABLE IF NOT EXISTS profiles (
    profile_id  TEXT PRIMARY KEY,
    data_json   TEXT NOT NULL,
    updated_at  TEXT NOT NULL     -- ISO 8601 UTC
);

-- Local display hints that must survive an unreachable backend.
CREATE TABLE IF NOT EXISTS cache (
    key         TEXT PRIMARY KEY,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

PRAGMA user_version = 1;
";
