use crate::models::{Anomaly, Severity};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown output format: {0}")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON array
    Json,
    /// One JSON object per line
    Jsonl,
    /// Human-readable lines on stdout
    Console,
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" => Ok(OutputFormat::Jsonl),
            "console" => Ok(OutputFormat::Console),
            other => Err(OutputError::UnknownFormat(other.to_string())),
        }
    }
}

/// Writes the anomaly report for one run
pub struct ReportWriter {
    format: OutputFormat,
    file_path: Option<PathBuf>,
}

impl ReportWriter {
    /// `file_path` is ignored for console output
    pub fn new(format: OutputFormat, file_path: Option<PathBuf>) -> Self {
        let file_path = match format {
            OutputFormat::Console => None,
            _ => file_path,
        };
        ReportWriter { format, file_path }
    }

    /// Where the report ends up; `None` means stdout
    pub fn destination(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Write the full report, replacing any previous file
    pub fn write_report(&self, anomalies: &[Anomaly]) -> Result<(), OutputError> {
        match &self.file_path {
            Some(path) => {
                let mut writer = BufWriter::new(File::create(path)?);
                self.render(anomalies, &mut writer)?;
                writer.flush()?;
            }
            None => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                self.render(anomalies, &mut handle)?;
                handle.flush()?;
            }
        }
        Ok(())
    }

    /// Serialize `anomalies` in the configured format
    pub fn render<W: Write>(&self, anomalies: &[Anomaly], out: &mut W) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, anomalies)?;
                writeln!(out)?;
            }
            OutputFormat::Jsonl => {
                for anomaly in anomalies {
                    serde_json::to_writer(&mut *out, anomaly)?;
                    writeln!(out)?;
                }
            }
            OutputFormat::Console => {
                for anomaly in anomalies {
                    writeln!(
                        out,
                        "[{}] {} {} - User: {}, IP: {} - {}",
                        anomaly.severity.as_str().to_uppercase(),
                        anomaly.timestamp,
                        anomaly.kind,
                        anomaly.user_id,
                        anomaly.ip_address,
                        anomaly.reason
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Operator summary printed after the report is written
    pub fn summary(&self, anomalies: &[Anomaly]) -> String {
        let destination = match self.destination() {
            Some(path) => path.display().to_string(),
            None => "stdout".to_string(),
        };
        format!(
            "Detected {} anomalies.\nReport saved to {}.",
            anomalies.len(),
            destination
        )
    }
}

/// Anomaly counts per severity tier, highest first
pub fn severity_breakdown(anomalies: &[Anomaly]) -> [(Severity, usize); 3] {
    let count = |s: Severity| anomalies.iter().filter(|a| a.severity == s).count();
    [
        (Severity::High, count(Severity::High)),
        (Severity::Medium, count(Severity::Medium)),
        (Severity::Low, count(Severity::Low)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::enrich;
    use crate::models::{Aggregate, AnomalyKind};
    use chrono::NaiveDate;

    fn sample() -> Vec<Anomaly> {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut anomalies = vec![
            Anomaly::new(
                AnomalyKind::BruteForce,
                ts,
                "alice",
                "5.5.5.5",
                "Brute force suspected (5 failed logins in 5 minutes)",
            ),
            Anomaly::grouped(
                AnomalyKind::ExternalAccess,
                "8.8.8.8",
                "Access from external/public IP (3 events, 2 users)",
                Aggregate {
                    first_seen: ts,
                    last_seen: ts,
                    total_events: 3,
                    unique_users: vec!["alice".to_string(), "bob".to_string()],
                },
            ),
        ];
        anomalies.iter_mut().for_each(enrich);
        anomalies
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("jsonl".parse::<OutputFormat>().unwrap(), OutputFormat::Jsonl);
        assert_eq!("console".parse::<OutputFormat>().unwrap(), OutputFormat::Console);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let anomalies = sample();

        let writer = ReportWriter::new(OutputFormat::Json, Some(path.clone()));
        writer.write_report(&anomalies).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<Anomaly> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.len(), anomalies.len());
        assert_eq!(parsed, anomalies);

        let raw: Vec<serde_json::Value> = serde_json::from_str(&contents).unwrap();
        for obj in &raw {
            for key in ["timestamp", "user_id", "ip_address", "reason", "severity", "mitigation"] {
                assert!(obj.get(key).is_some(), "missing {}", key);
            }
        }
        assert_eq!(raw[1]["total_events"], 3);
    }

    #[test]
    fn test_rewrite_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let writer = ReportWriter::new(OutputFormat::Json, Some(path.clone()));

        writer.write_report(&sample()).unwrap();
        writer.write_report(&[]).unwrap();

        let parsed: Vec<Anomaly> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_jsonl_one_line_per_anomaly() {
        let writer = ReportWriter::new(OutputFormat::Jsonl, None);
        let mut buf = Vec::new();
        writer.render(&sample(), &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Anomaly = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.kind, AnomalyKind::BruteForce);
    }

    #[test]
    fn test_console_lines() {
        let writer = ReportWriter::new(OutputFormat::Console, Some(PathBuf::from("ignored.json")));
        assert!(writer.destination().is_none());

        let mut buf = Vec::new();
        writer.render(&sample(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("[HIGH]"));
        assert!(text.contains("User: multiple, IP: 8.8.8.8"));
    }

    #[test]
    fn test_summary_and_breakdown() {
        let anomalies = sample();
        let writer = ReportWriter::new(OutputFormat::Json, Some(PathBuf::from("out.json")));
        assert_eq!(
            writer.summary(&anomalies),
            "Detected 2 anomalies.\nReport saved to out.json."
        );

        let breakdown = severity_breakdown(&anomalies);
        assert_eq!(breakdown[0], (Severity::High, 1));
        assert_eq!(breakdown[1], (Severity::Medium, 1));
        assert_eq!(breakdown[2], (Severity::Low, 0));
    }
}
