pub mod api;
pub mod config;
pub mod detection;
pub mod enrichment;
pub mod input;
pub mod models;
pub mod output;
pub mod persistence;
pub mod pipeline;

// Re-export commonly used types
pub use config::Config;
pub use detection::{is_internal, Detector};
pub use enrichment::{enrich, Playbook};
pub use models::{Action, Aggregate, Anomaly, AnomalyKind, AuthEvent, Severity};
pub use persistence::{ReportStore, SqliteReportStore};
pub use pipeline::{analyze, run, RunSummary};
