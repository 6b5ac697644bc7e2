//! Database schema definitions

/// SQL to create all tables
/// NOTE: document bodies are stored verbatim as serialized JSON text
pub const CREATE_TABLES: &str = r#"
-- Whole-document storage, one row per named document
CREATE TABLE IF NOT EXISTS documents (
    name TEXT PRIMARY KEY,
    body TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
)
"#;
