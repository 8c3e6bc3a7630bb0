//! Brute force detection
//!
//! Looks for bursts of failed logins from a single source IP within a
//! short window.

use super::{describe_window, partition_by, Detector};
use crate::config::BruteForceConfig;
use crate::models::{Anomaly, AnomalyKind, AuthEvent};
use chrono::Duration;

/// Flags IPs with too many failed logins inside the window
pub struct BruteForceDetector {
    /// Time window in seconds (default: 300 = 5 minutes)
    window_seconds: i64,
    /// Failures within the window that trigger a report
    threshold: usize,
}

impl BruteForceDetector {
    /// Create a detector with default thresholds
    pub fn new() -> Self {
        Self::with_config(&BruteForceConfig::default())
    }

    /// Create with custom thresholds
    pub fn with_config(config: &BruteForceConfig) -> Self {
        BruteForceDetector {
            window_seconds: config.window_seconds,
            threshold: config.threshold,
        }
    }

    /// Scan one IP's failures. Stops at the first window that reaches the
    /// threshold, so an IP yields at most one anomaly per run.
    fn scan_ip(&self, ip: &str, failures: &[&AuthEvent]) -> Option<Anomaly> {
        let window = Duration::try_seconds(self.window_seconds).unwrap_or(Duration::MAX);

        for (i, start) in failures.iter().enumerate() {
            // None: the window reaches past the representable range
            let window_end = start.timestamp.checked_add_signed(window);
            let count = failures[i..]
                .iter()
                .take_while(|e| window_end.map_or(true, |end| e.timestamp <= end))
                .count();

            if count >= self.threshold {
                log::debug!(
                    "Brute force from {}: {} failures starting at {}",
                    ip,
                    count,
                    start.timestamp
                );
                return Some(Anomaly::new(
                    AnomalyKind::BruteForce,
                    start.timestamp,
                    start.user_id.clone(),
                    ip,
                    format!(
                        "Brute force suspected ({} failed logins in {})",
                        count,
                        describe_window(self.window_seconds)
                    ),
                ));
            }
        }

        None
    }
}

impl Default for BruteForceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for BruteForceDetector {
    fn name(&self) -> &'static str {
        "brute_force"
    }

    fn detect(&self, events: &[AuthEvent]) -> Vec<Anomaly> {
        let failures = events.iter().filter(|e| e.is_failed_login());

        partition_by(failures, |e| e.ip_address.as_str())
            .into_iter()
            .filter_map(|(ip, group)| self.scan_ip(ip, &group))
            .collect()
    }
}
