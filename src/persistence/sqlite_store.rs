//! SQLite implementation of the ReportStore trait

use super::{NewReport, PersistenceError, ReportQuery, ReportStore, StoredReport};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite-based report storage
///
/// Tags are kept as a JSON array in a text column.
pub struct SqliteReportStore {
    conn: Mutex<Connection>,
}

/// Row as read from the database, before tags are decoded
struct ReportRow {
    id: i64,
    title: String,
    content: String,
    tags: String,
    date: String,
}

impl ReportRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ReportRow {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            tags: row.get(3)?,
            date: row.get(4)?,
        })
    }

    fn into_report(self) -> Result<StoredReport, PersistenceError> {
        let tags: Vec<String> = serde_json::from_str(&self.tags).map_err(|_| {
            PersistenceError::InvalidData(format!("Invalid tags for report {}: {}", self.id, self.tags))
        })?;
        Ok(StoredReport {
            id: self.id,
            title: self.title,
            content: self.content,
            tags,
            date: self.date,
        })
    }
}

impl SqliteReportStore {
    /// Open (or create) a report database at the specified path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, PersistenceError> {
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory database (useful for testing)
    pub fn in_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, PersistenceError> {
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(SqliteReportStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, PersistenceError> {
        self.conn.lock().map_err(|_| PersistenceError::LockPoisoned)
    }
}

impl ReportStore for SqliteReportStore {
    fn create(&self, report: NewReport) -> Result<StoredReport, PersistenceError> {
        report.validate()?;
        let tags = serde_json::to_string(&report.tags)?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO reports (title, content, tags, date) VALUES (?, ?, ?, ?)",
            params![report.title, report.content, tags, report.date],
        )?;
        let id = conn.last_insert_rowid();
        log::debug!("Stored report {} ({})", id, report.title);

        Ok(StoredReport {
            id,
            title: report.title,
            content: report.content,
            tags: report.tags,
            date: report.date,
        })
    }

    fn get(&self, id: i64) -> Result<Option<StoredReport>, PersistenceError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT id, title, content, tags, date FROM reports WHERE id = ?",
                params![id],
                ReportRow::from_row,
            )
            .optional()?;

        row.map(ReportRow::into_report).transpose()
    }

    fn list(&self, query: &ReportQuery) -> Result<Vec<StoredReport>, PersistenceError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, content, tags, date FROM reports ORDER BY id DESC"
        )?;

        let rows = stmt
            .query_map([], ReportRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut reports = Vec::new();
        for row in rows {
            let report = row.into_report()?;
            if query.matches(&report) {
                reports.push(report);
            }
        }
        Ok(reports)
    }

    fn delete(&self, id: i64) -> Result<bool, PersistenceError> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM reports WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}
