//! SQL schema for the Vitrine SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;

-- One row per section type, created on first write.
-- Timestamps are fixed-width RFC 3339 UTC strings, so text comparison is
-- chronological comparison.
CREATE TABLE IF NOT EXISTS content_sections (
    id                TEXT PRIMARY KEY,
    section_type      TEXT NOT NULL UNIQUE,
    title             TEXT,
    status            TEXT NOT NULL DEFAULT 'draft',  -- 'draft' | 'published'
    content_json      TEXT NOT NULL,
    created_by        TEXT NOT NULL,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL,
    published_at      TEXT,
    published_version INTEGER,
    version           INTEGER NOT NULL DEFAULT 0,
    locked_by         TEXT,
    locked_until      TEXT,
    CHECK ((locked_by IS NULL) = (locked_until IS NULL))
);

-- History is strictly append-only.
-- Rows disappear only when their section is deleted.
CREATE TABLE IF NOT EXISTS content_versions (
    id             TEXT PRIMARY KEY,
    section_id     TEXT NOT NULL REFERENCES content_sections(id) ON DELETE CASCADE,
    version_number INTEGER NOT NULL,
    content_json   TEXT NOT NULL,
    created_by     TEXT NOT NULL,
    created_at     TEXT NOT NULL,
    change_summary TEXT NOT NULL DEFAULT '',
    UNIQUE (section_id, version_number),
    CHECK  (version_number >= 1)
);

CREATE INDEX IF NOT EXISTS content_sections_status_idx ON content_sections(status);

PRAGMA user_version = 1;
";
