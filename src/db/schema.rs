//! SQL DDL for initializing draft storage.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema:
/// - uuids stored as TEXT primary keys
/// - timestamps stored as RFC3339 TEXT
/// - `client_id` indexed for history queries
/// - booleans stored as INTEGER 0/1
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS thread_drafts (
    id TEXT PRIMARY KEY,
    client_id TEXT NOT NULL,
    prompt_json TEXT NOT NULL,
    output_json TEXT NOT NULL,
    provider TEXT NOT NULL,
    model TEXT NOT NULL,
    created_at TEXT NOT NULL,
    rating INTEGER NULL,
    regeneration_count INTEGER NOT NULL DEFAULT 0,
    was_final_version INTEGER NOT NULL DEFAULT 0,
    feedback_tags TEXT NULL,
    parent_thread_id TEXT NULL
);

CREATE INDEX IF NOT EXISTS idx_thread_drafts_client_id ON thread_drafts(client_id);
CREATE INDEX IF NOT EXISTS idx_thread_drafts_created_at ON thread_drafts(created_at);

CREATE TABLE IF NOT EXISTS brand_guidelines (
    id TEXT PRIMARY KEY,
    text TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;
