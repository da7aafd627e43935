//! Parse result storage.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use chrono::{DateTime, Utc};
use docparse_core::{ParseResult, StoredRecord};
use rusqlite::{params, ErrorCode, Row};

const SELECT_COLUMNS: &str = "id, database_id, collection_id, user_id, document_id, markdown_output, xlsx_output, created_at";

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<StoredRecord> {
    let created_at_str: String = row.get(7)?;

    Ok(StoredRecord {
        id: row.get(0)?,
        database_id: row.get(1)?,
        collection_id: row.get(2)?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        result: ParseResult {
            user_id: row.get(3)?,
            document_id: row.get(4)?,
            markdown_output: row.get(5)?,
            xlsx_output: row.get(6)?,
        },
    })
}

impl Database {
    /// Insert a new record. Record ids are never reused.
    pub fn create_record(&self, record: &StoredRecord) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO parse_results (id, database_id, collection_id, user_id, document_id, markdown_output, xlsx_output, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                record.id,
                record.database_id,
                record.collection_id,
                record.result.user_id,
                record.result.document_id,
                record.result.markdown_output,
                record.result.xlsx_output,
                record.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(ref err, _) if err.code == ErrorCode::ConstraintViolation => {
                DbError::Duplicate(record.id.clone())
            }
            _ => DbError::from(e),
        })?;
        Ok(())
    }

    /// Get a record by ID.
    pub fn get_record(&self, id: &str) -> DbResult<StoredRecord> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM parse_results WHERE id = ?1", SELECT_COLUMNS),
            params![id],
            row_to_record,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("Record not found: {}", id)),
            _ => DbError::from(e),
        })
    }

    /// Find a record by ID prefix, as printed by `records list`.
    pub fn find_record_by_prefix(&self, prefix: &str) -> DbResult<StoredRecord> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM parse_results WHERE substr(id, 1, length(?1)) = ?1 LIMIT 2",
            SELECT_COLUMNS
        ))?;
        let mut matches = stmt
            .query_map(params![prefix], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        match matches.len() {
            0 => Err(DbError::NotFound(format!("Record not found: {}", prefix))),
            1 => Ok(matches.remove(0)),
            _ => Err(DbError::Other(format!("Record prefix '{}' is ambiguous", prefix))),
        }
    }

    /// List records, newest first, optionally for one user.
    pub fn list_records(&self, user_id: Option<&str>, limit: Option<i64>) -> DbResult<Vec<StoredRecord>> {
        let conn = self.conn()?;
        let limit = limit.unwrap_or(50);

        let records = match user_id {
            Some(user) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM parse_results WHERE user_id = ?1 ORDER BY created_at DESC LIMIT ?2",
                    SELECT_COLUMNS
                ))?;
                let rows = stmt.query_map(params![user, limit], row_to_record)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM parse_results ORDER BY created_at DESC LIMIT ?1",
                    SELECT_COLUMNS
                ))?;
                let rows = stmt.query_map(params![limit], row_to_record)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(records)
    }

    /// Count stored records.
    pub fn count_records(&self) -> DbResult<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM parse_results", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docparse_core::ParseRequest;

    fn record(id: &str, user: &str) -> StoredRecord {
        let request = ParseRequest::new("file-1", user);
        StoredRecord::new(id, "db", "results", ParseResult::markdown(&request, "<p>x</p>\n"))
    }

    #[test]
    fn test_create_and_get() {
        let db = Database::open_in_memory().unwrap();
        let request = ParseRequest::new("f1", "u1");
        let stored = StoredRecord::new("r1", "db", "results", ParseResult::workbook(&request, "UEsDBA=="));

        db.create_record(&stored).unwrap();

        let loaded = db.get_record("r1").unwrap();
        assert_eq!(loaded.result, stored.result);
        assert_eq!(loaded.database_id, "db");
        assert_eq!(loaded.collection_id, "results");
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.create_record(&record("r1", "u1")).unwrap();

        let err = db.create_record(&record("r1", "u1")).unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
    }

    #[test]
    fn test_get_missing() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(db.get_record("nope"), Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_list_and_count() {
        let db = Database::open_in_memory().unwrap();
        db.create_record(&record("a1", "u1")).unwrap();
        db.create_record(&record("b2", "u2")).unwrap();
        db.create_record(&record("c3", "u1")).unwrap();

        assert_eq!(db.count_records().unwrap(), 3);
        assert_eq!(db.list_records(None, None).unwrap().len(), 3);
        assert_eq!(db.list_records(Some("u1"), None).unwrap().len(), 2);
        assert_eq!(db.list_records(None, Some(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_find_by_prefix() {
        let db = Database::open_in_memory().unwrap();
        db.create_record(&record("abc-1", "u1")).unwrap();
        db.create_record(&record("abd-2", "u1")).unwrap();

        assert_eq!(db.find_record_by_prefix("abc").unwrap().id, "abc-1");
        assert!(matches!(db.find_record_by_prefix("ab"), Err(DbError::Other(_))));
        assert!(matches!(db.find_record_by_prefix("zz"), Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_prefix_wildcards_are_literal() {
        let db = Database::open_in_memory().unwrap();
        db.create_record(&record("abc-1", "u1")).unwrap();
        db.create_record(&record("abd-2", "u1")).unwrap();

        assert!(matches!(db.find_record_by_prefix("%"), Err(DbError::NotFound(_))));
        assert!(matches!(db.find_record_by_prefix("ab_"), Err(DbError::NotFound(_))));
        assert!(matches!(db.find_record_by_prefix("\\"), Err(DbError::NotFound(_))));
    }
}
