//! Database migrations and schema management.

use crate::error::DbResult;
use rusqlite::Connection;
use tracing::info;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema.
pub fn initialize_schema(conn: &Connection) -> DbResult<()> {
    let current_version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if current_version == 0 {
        info!("Creating initial database schema...");
        create_initial_schema(conn)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }

    Ok(())
}

fn create_initial_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS parse_results (
            id TEXT PRIMARY KEY,
            database_id TEXT NOT NULL,
            collection_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            document_id TEXT NOT NULL,
            markdown_output TEXT NOT NULL DEFAULT '',
            xlsx_output TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_results_user ON parse_results(user_id);
        CREATE INDEX IF NOT EXISTS idx_results_created ON parse_results(created_at);
        "#,
    )?;
    Ok(())
}
