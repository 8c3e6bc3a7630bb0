//! One batch run: load, detect, enrich, report.

use crate::config::{Config, ConfigError, DetectionConfig};
use crate::detection::build_detectors;
use crate::enrichment::enrich;
use crate::input::{load_events, LoadError};
use crate::models::{Anomaly, AuthEvent};
use crate::output::{severity_breakdown, OutputError, OutputFormat, ReportWriter};
use crate::persistence::{NewReport, PersistenceError, ReportStore, SqliteReportStore};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to load events: {0}")]
    Load(#[from] LoadError),

    #[error("Failed to write report: {0}")]
    Output(#[from] OutputError),

    #[error("Failed to store report: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Result of a completed run
#[derive(Debug)]
pub struct RunSummary {
    pub events_loaded: usize,
    pub anomalies: Vec<Anomaly>,
    /// Operator-facing summary lines
    pub message: String,
    /// Id of the report record, when the run was stored
    pub stored_report_id: Option<i64>,
}

/// Run every enabled detector over `events` and enrich the results.
/// Output order follows the detector order; nothing is deduplicated.
pub fn analyze(events: &[AuthEvent], config: &DetectionConfig) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    for detector in build_detectors(config) {
        let found = detector.detect(events);
        log::info!("{}: {} anomalies", detector.name(), found.len());
        anomalies.extend(found);
    }

    anomalies.iter_mut().for_each(enrich);
    anomalies
}

/// Load the configured input, analyze it and write the report
pub fn run(config: &Config) -> Result<RunSummary, PipelineError> {
    config.validate()?;
    let events = load_events(&config.input.file_path)?;
    let anomalies = analyze(&events, &config.detection);

    for (severity, count) in severity_breakdown(&anomalies) {
        log::info!("{} severity: {}", severity, count);
    }

    let format: OutputFormat = config.output.format.parse()?;
    let writer = ReportWriter::new(format, Some(config.output.file_path.clone()));
    writer.write_report(&anomalies)?;

    let stored_report_id = if config.output.store_report {
        let store = SqliteReportStore::new(&config.store.db_path)?;
        let date = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let report = store.create(NewReport::from_anomalies(&anomalies, date)?)?;
        log::info!(
            "Stored report {} in {}",
            report.id,
            config.store.db_path.display()
        );
        Some(report.id)
    } else {
        None
    };

    Ok(RunSummary {
        events_loaded: events.len(),
        message: writer.summary(&anomalies),
        anomalies,
        stored_report_id,
    })
}
