//! DDL for the dataset blobs and the chunk index.
//!
//! Applied on every open; each statement is a no-op on an existing file.

/// Value written to `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One CSV document per dataset path. A write replaces the whole body.
CREATE TABLE IF NOT EXISTS blobs (
    path        TEXT PRIMARY KEY,   -- datasets/{club}/{season}/{club}_{season}_{kind}.csv
    body        TEXT NOT NULL,      -- UTF-8 CSV with BOM
    updated_at  TEXT NOT NULL       -- RFC 3339 UTC
);

-- Embedded chunks. Ids are {club}_{season}_{kind}_{row}.
CREATE TABLE IF NOT EXISTS chunks (
    id          TEXT PRIMARY KEY,
    text        TEXT NOT NULL,
    metadata    TEXT NOT NULL,      -- JSON object of string values
    embedding   BLOB NOT NULL       -- little-endian f32
);

PRAGMA user_version = 1;
";
