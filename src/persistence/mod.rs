//! Persistence module for report storage
//!
//! Stores titled report records (usually one per analysis run) so they can
//! be served back through the report API.

pub mod sqlite_store;

pub use sqlite_store::SqliteReportStore;

use crate::models::{Anomaly, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors that can occur during persistence operations
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid data in database: {0}")]
    InvalidData(String),

    #[error("Invalid report: {0}")]
    Validation(String),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

/// A report as submitted, before it has an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReport {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub date: String,
}

impl NewReport {
    /// Title, content and date must be non-empty
    pub fn validate(&self) -> Result<(), PersistenceError> {
        for (field, value) in [
            ("title", &self.title),
            ("content", &self.content),
            ("date", &self.date),
        ] {
            if value.is_empty() {
                return Err(PersistenceError::Validation(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }
        Ok(())
    }

    /// Summarize an analysis run: the content is the JSON anomaly document,
    /// tags are the distinct kinds and severities found.
    pub fn from_anomalies(anomalies: &[Anomaly], date: impl Into<String>) -> Result<Self, PersistenceError> {
        let mut tags = BTreeSet::new();
        for anomaly in anomalies {
            tags.insert(anomaly.kind.as_str().to_string());
            tags.insert(anomaly.severity.as_str().to_string());
        }

        let high = anomalies
            .iter()
            .filter(|a| a.severity == Severity::High)
            .count();

        Ok(NewReport {
            title: format!("Anomaly report: {} findings ({} high)", anomalies.len(), high),
            content: serde_json::to_string_pretty(anomalies)?,
            tags: tags.into_iter().collect(),
            date: date.into(),
        })
    }
}

/// A stored report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub date: String,
}

/// Filters for listing reports
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    /// Keep reports carrying exactly this tag; empty means no filter
    pub tag: Option<String>,
    /// Case-insensitive substring over title and content; empty means no filter
    pub q: Option<String>,
}

impl ReportQuery {
    pub fn matches(&self, report: &StoredReport) -> bool {
        if let Some(tag) = self.tag.as_deref().filter(|t| !t.is_empty()) {
            if !report.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(q) = self.q.as_deref().filter(|q| !q.is_empty()) {
            let needle = q.to_lowercase();
            if !report.title.to_lowercase().contains(&needle)
                && !report.content.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// Trait for report storage backends
pub trait ReportStore: Send + Sync {
    /// Insert a report and return it with its assigned id
    fn create(&self, report: NewReport) -> Result<StoredReport, PersistenceError>;

    fn get(&self, id: i64) -> Result<Option<StoredReport>, PersistenceError>;

    /// Matching reports, newest first
    fn list(&self, query: &ReportQuery) -> Result<Vec<StoredReport>, PersistenceError>;

    /// Returns false when no report had this id
    fn delete(&self, id: i64) -> Result<bool, PersistenceError>;
}
