use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Subject marker used when an anomaly covers several users
pub const MULTIPLE_USERS: &str = "multiple";

/// Which detector produced an anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    BruteForce,
    GeoHop,
    ExternalAccess,
    StatisticalOutlier,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::BruteForce => "brute_force",
            AnomalyKind::GeoHop => "geo_hop",
            AnomalyKind::ExternalAccess => "external_access",
            AnomalyKind::StatisticalOutlier => "statistical_outlier",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of all activity from one source, attached to grouped anomalies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub first_seen: NaiveDateTime,
    pub last_seen: NaiveDateTime,
    pub total_events: usize,
    /// Sorted, distinct
    pub unique_users: Vec<String>,
}

impl Aggregate {
    /// The user to attribute the anomaly to: the only user, or the
    /// `"multiple"` marker.
    pub fn subject(&self) -> String {
        match self.unique_users.as_slice() {
            [single] => single.clone(),
            _ => MULTIPLE_USERS.to_string(),
        }
    }
}

/// A detection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub timestamp: NaiveDateTime,
    pub user_id: String,
    pub ip_address: String,
    /// Human-readable description; not used for classification
    pub reason: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub mitigation: Vec<String>,
    #[serde(flatten)]
    pub aggregate: Option<Aggregate>,
}

impl Anomaly {
    /// Create an unenriched anomaly for a single triggering event
    pub fn new(
        kind: AnomalyKind,
        timestamp: NaiveDateTime,
        user_id: impl Into<String>,
        ip_address: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Anomaly {
            kind,
            timestamp,
            user_id: user_id.into(),
            ip_address: ip_address.into(),
            reason: reason.into(),
            severity: Severity::default(),
            mitigation: Vec::new(),
            aggregate: None,
        }
    }

    /// Create an unenriched anomaly summarizing all activity of one IP.
    /// Timestamp and subject are taken from the aggregate.
    pub fn grouped(
        kind: AnomalyKind,
        ip_address: impl Into<String>,
        reason: impl Into<String>,
        aggregate: Aggregate,
    ) -> Self {
        let mut anomaly = Anomaly::new(
            kind,
            aggregate.first_seen,
            aggregate.subject(),
            ip_address,
            reason,
        );
        anomaly.aggregate = Some(aggregate);
        anomaly
    }
}
