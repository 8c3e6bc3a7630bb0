//! Statistical outlier detection
//!
//! Flags IPs whose total event count sits above mean + k·σ of the per-IP
//! count distribution (population standard deviation).

use super::{aggregate, partition_by, Detector};
use crate::config::StatisticalConfig;
use crate::models::{Anomaly, AnomalyKind, AuthEvent};

/// Mean and population standard deviation of a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distribution {
    pub mean: f64,
    pub std_dev: f64,
}

impl Distribution {
    /// `None` for an empty sample
    pub fn from_counts(counts: &[usize]) -> Option<Self> {
        if counts.is_empty() {
            return None;
        }

        let n = counts.len() as f64;
        let mean = counts.iter().sum::<usize>() as f64 / n;
        let variance = counts
            .iter()
            .map(|&c| {
                let d = c as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;

        Some(Distribution {
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

pub struct StatisticalOutlierDetector {
    sigma_multiplier: f64,
}

impl StatisticalOutlierDetector {
    pub fn new() -> Self {
        Self::with_config(&StatisticalConfig::default())
    }

    pub fn with_config(config: &StatisticalConfig) -> Self {
        StatisticalOutlierDetector {
            sigma_multiplier: config.sigma_multiplier,
        }
    }
}

impl Default for StatisticalOutlierDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for StatisticalOutlierDetector {
    fn name(&self) -> &'static str {
        "statistical_outlier"
    }

    fn detect(&self, events: &[AuthEvent]) -> Vec<Anomaly> {
        let groups = partition_by(events, |e| e.ip_address.as_str());
        let counts: Vec<usize> = groups.iter().map(|(_, g)| g.len()).collect();

        let dist = match Distribution::from_counts(&counts) {
            Some(d) => d,
            None => return Vec::new(),
        };
        // all IPs equally active: nothing stands out
        if dist.std_dev == 0.0 {
            return Vec::new();
        }

        let threshold = dist.mean + self.sigma_multiplier * dist.std_dev;
        log::debug!(
            "Per-IP activity: mean {:.2}, std dev {:.2}, threshold {:.2}",
            dist.mean,
            dist.std_dev,
            threshold
        );

        groups
            .into_iter()
            .filter(|(_, group)| group.len() as f64 > threshold)
            .filter_map(|(ip, group)| {
                let summary = aggregate(&group)?;
                let reason = format!(
                    "Statistical anomaly: {} events from this IP (mean {:.2}, threshold {:.2})",
                    summary.total_events, dist.mean, threshold
                );
                Some(Anomaly::grouped(
                    AnomalyKind::StatisticalOutlier,
                    ip,
                    reason,
                    summary,
                ))
            })
            .collect()
    }
}
