//! External access detection
//!
//! Reports activity from addresses outside the private ranges. All events
//! from one external IP collapse into a single grouped anomaly.

use super::{aggregate, is_internal, partition_by, Detector};
use crate::models::{Anomaly, AnomalyKind, AuthEvent};

#[derive(Debug, Default)]
pub struct ExternalAccessDetector;

impl ExternalAccessDetector {
    pub fn new() -> Self {
        ExternalAccessDetector
    }
}

impl Detector for ExternalAccessDetector {
    fn name(&self) -> &'static str {
        "external_access"
    }

    fn detect(&self, events: &[AuthEvent]) -> Vec<Anomaly> {
        let external = events.iter().filter(|e| !is_internal(&e.ip_address));

        partition_by(external, |e| e.ip_address.as_str())
            .into_iter()
            .filter_map(|(ip, group)| {
                let summary = aggregate(&group)?;
                let reason = format!(
                    "Access from external/public IP ({} events, {} users)",
                    summary.total_events,
                    summary.unique_users.len()
                );
                Some(Anomaly::grouped(AnomalyKind::ExternalAccess, ip, reason, summary))
            })
            .collect()
    }
}
