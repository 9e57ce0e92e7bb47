//! SQL schema for the Cherry SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS entities (
    id            TEXT PRIMARY KEY,
    entity_type   TEXT NOT NULL,   -- 'PERSON' | 'CUSTOMER' | ...
    name          TEXT,
    description   TEXT,
    reference     TEXT,
    status_type   TEXT NOT NULL DEFAULT 'ACTIVE',
    status_since  TEXT,            -- ISO 8601 UTC; set while INACTIVE
    created_date  TEXT,
    modified_date TEXT,
    created_by    TEXT,
    modified_by   TEXT
);

-- Document metadata only. Payloads are addressed by content_id and live in
-- the content store.
CREATE TABLE IF NOT EXISTS documents (
    id             TEXT PRIMARY KEY,
    name           TEXT,
    description    TEXT,
    reference      TEXT,
    status_type    TEXT NOT NULL DEFAULT 'ACTIVE',
    status_since   TEXT,
    created_date   TEXT,
    modified_date  TEXT,
    created_by     TEXT,
    modified_by    TEXT,
    document_type  TEXT NOT NULL DEFAULT 'UNSPECIFIED',
    file_name      TEXT,
    extension      TEXT,
    tags           TEXT,
    mime_type      TEXT NOT NULL DEFAULT 'text/plain',
    content_length INTEGER NOT NULL DEFAULT 0,
    content_path   TEXT,
    content_id     TEXT UNIQUE,
    owner_id       TEXT NOT NULL REFERENCES entities(id),
    owner_type     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS entities_type_idx   ON entities(entity_type);
CREATE INDEX IF NOT EXISTS documents_owner_idx ON documents(owner_id);

PRAGMA user_version = 1;
";

pub const ENTITY_COLUMNS: &str = "id, entity_type, name, description, reference, \
   status_type, status_since, created_date, modified_date, created_by, modified_by";

pub const DOCUMENT_COLUMNS: &str = "id, name, description, reference, \
   status_type, status_since, created_date, modified_date, created_by, modified_by, \
   document_type, file_name, extension, tags, mime_type, content_length, content_path, \
   content_id, owner_id, owner_type";
