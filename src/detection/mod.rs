//! Anomaly detectors
//!
//! Every detector is an independent pass over the full, time-sorted event
//! list. None of them keeps state between runs or reads another's output.

pub mod brute_force;
pub mod external_access;
pub mod geo_hop;
pub mod ip_classifier;
pub mod statistical;

pub use brute_force::BruteForceDetector;
pub use external_access::ExternalAccessDetector;
pub use geo_hop::GeoHopDetector;
pub use ip_classifier::is_internal;
pub use statistical::StatisticalOutlierDetector;

use crate::config::DetectionConfig;
use crate::models::{Aggregate, Anomaly, AuthEvent};
use std::collections::{BTreeSet, HashMap};

/// A single detection pass
pub trait Detector {
    /// Short rule name used in logs
    fn name(&self) -> &'static str;

    /// Scan `events` (sorted ascending by timestamp) and return unenriched
    /// anomalies
    fn detect(&self, events: &[AuthEvent]) -> Vec<Anomaly>;
}

/// Build the enabled detectors in reporting order
pub fn build_detectors(config: &DetectionConfig) -> Vec<Box<dyn Detector>> {
    let mut detectors: Vec<Box<dyn Detector>> = Vec::new();

    if config.enable_brute_force {
        detectors.push(Box::new(BruteForceDetector::with_config(&config.brute_force)));
    }
    if config.enable_external_access {
        detectors.push(Box::new(ExternalAccessDetector::new()));
    }
    if config.enable_geo_hop {
        detectors.push(Box::new(GeoHopDetector::with_config(&config.geo_hop)));
    }
    if config.enable_statistical {
        detectors.push(Box::new(StatisticalOutlierDetector::with_config(
            &config.statistical,
        )));
    }

    detectors
}

/// Group events by key, preserving both the order in which keys first
/// appear and the order of events inside each group.
pub(crate) fn partition_by<'a, I, F>(events: I, key: F) -> Vec<(&'a str, Vec<&'a AuthEvent>)>
where
    I: IntoIterator<Item = &'a AuthEvent>,
    F: Fn(&'a AuthEvent) -> &'a str,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&AuthEvent>)> = Vec::new();

    for event in events {
        let k = key(event);
        match index.get(k) {
            Some(&i) => groups[i].1.push(event),
            None => {
                index.insert(k, groups.len());
                groups.push((k, vec![event]));
            }
        }
    }

    groups
}

/// Summarize a non-empty, time-sorted group of events
pub(crate) fn aggregate(events: &[&AuthEvent]) -> Option<Aggregate> {
    let first = events.first()?;
    let last = events.last()?;
    let unique_users: BTreeSet<&str> = events.iter().map(|e| e.user_id.as_str()).collect();

    Some(Aggregate {
        first_seen: first.timestamp,
        last_seen: last.timestamp,
        total_events: events.len(),
        unique_users: unique_users.into_iter().map(String::from).collect(),
    })
}

/// Render a window length for reason strings: "5 minutes", "90 seconds"
pub(crate) fn describe_window(seconds: i64) -> String {
    if seconds % 60 == 0 {
        let minutes = seconds / 60;
        if minutes == 1 {
            "1 minute".to_string()
        } else {
            format!("{} minutes", minutes)
        }
    } else {
        format!("{} seconds", seconds)
    }
}
