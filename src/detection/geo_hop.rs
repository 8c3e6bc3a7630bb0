//! Geo-hop detection
//!
//! Flags a user whose consecutive successful logins come from different
//! IP addresses within an implausibly short interval.

use super::{partition_by, Detector};
use crate::config::GeoHopConfig;
use crate::models::{Anomaly, AnomalyKind, AuthEvent};
use chrono::Duration;

pub struct GeoHopDetector {
    /// Maximum gap between the two logins, in seconds (default: 300)
    window_seconds: i64,
}

impl GeoHopDetector {
    pub fn new() -> Self {
        Self::with_config(&GeoHopConfig::default())
    }

    pub fn with_config(config: &GeoHopConfig) -> Self {
        GeoHopDetector {
            window_seconds: config.window_seconds,
        }
    }

    /// Compare every adjacent pair of one user's logins. Each qualifying
    /// pair produces its own anomaly.
    fn scan_user(&self, user: &str, logins: &[&AuthEvent]) -> Vec<Anomaly> {
        let window = Duration::try_seconds(self.window_seconds).unwrap_or(Duration::MAX);

        logins
            .windows(2)
            .filter_map(|pair| {
                let (previous, current) = (pair[0], pair[1]);
                let gap = current.timestamp - previous.timestamp;

                if gap <= window && previous.ip_address != current.ip_address {
                    Some(Anomaly::new(
                        AnomalyKind::GeoHop,
                        current.timestamp,
                        user,
                        current.ip_address.clone(),
                        format!(
                            "Geo-hop suspected (login from {} {}s after login from {})",
                            current.ip_address,
                            gap.num_seconds(),
                            previous.ip_address
                        ),
                    ))
                } else {
                    None
                }
            })
            .collect()
    }
}

impl Default for GeoHopDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for GeoHopDetector {
    fn name(&self) -> &'static str {
        "geo_hop"
    }

    fn detect(&self, events: &[AuthEvent]) -> Vec<Anomaly> {
        let logins = events.iter().filter(|e| e.is_successful_login());

        partition_by(logins, |e| e.user_id.as_str())
            .into_iter()
            .flat_map(|(user, group)| self.scan_user(user, &group))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::test_support::event;

    #[test]
    fn test_quick_ip_change() {
        let events = vec![
            event(0, "alice", "1.1.1.1", "login_success"),
            event(120, "alice", "2.2.2.2", "login_success"),
        ];

        let anomalies = GeoHopDetector::new().detect(&events);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::GeoHop);
        assert_eq!(anomalies[0].timestamp, events[1].timestamp);
        assert_eq!(anomalies[0].user_id, "alice");
        assert_eq!(anomalies[0].ip_address, "2.2.2.2");
        assert!(anomalies[0].reason.contains("Geo-hop"));
        assert!(anomalies[0].reason.contains("1.1.1.1"));
    }

    #[test]
    fn test_slow_ip_change() {
        let events = vec![
            event(0, "alice", "1.1.1.1", "login_success"),
            event(360, "alice", "2.2.2.2", "login_success"),
        ];
        assert!(GeoHopDetector::new().detect(&events).is_empty());
    }

    #[test]
    fn test_gap_equal_to_window_is_flagged() {
        let events = vec![
            event(0, "alice", "1.1.1.1", "login_success"),
            event(300, "alice", "2.2.2.2", "login_success"),
        ];
        assert_eq!(GeoHopDetector::new().detect(&events).len(), 1);
    }

    #[test]
    fn test_same_ip_not_flagged() {
        let events = vec![
            event(0, "alice", "1.1.1.1", "login_success"),
            event(10, "alice", "1.1.1.1", "login_success"),
        ];
        assert!(GeoHopDetector::new().detect(&events).is_empty());
    }

    #[test]
    fn test_every_hop_is_reported() {
        let events = vec![
            event(0, "alice", "1.1.1.1", "login_success"),
            event(30, "alice", "2.2.2.2", "login_success"),
            event(60, "alice", "3.3.3.3", "login_success"),
            event(90, "alice", "1.1.1.1", "login_success"),
        ];
        assert_eq!(GeoHopDetector::new().detect(&events).len(), 3);
    }

    #[test]
    fn test_only_adjacent_logins_compared() {
        // failures between the two successes are not logins for this rule
        let events = vec![
            event(0, "alice", "1.1.1.1", "login_success"),
            event(30, "alice", "2.2.2.2", "login_failed"),
            event(60, "alice", "1.1.1.1", "login_success"),
        ];
        assert!(GeoHopDetector::new().detect(&events).is_empty());
    }

    #[test]
    fn test_users_are_independent() {
        let events = vec![
            event(0, "alice", "1.1.1.1", "login_success"),
            event(10, "bob", "2.2.2.2", "login_success"),
            event(20, "alice", "1.1.1.1", "login_success"),
            event(30, "bob", "2.2.2.2", "login_success"),
        ];
        assert!(GeoHopDetector::new().detect(&events).is_empty());
    }

    #[test]
    fn test_custom_window() {
        let detector = GeoHopDetector::with_config(&GeoHopConfig { window_seconds: 60 });
        let events = vec![
            event(0, "alice", "1.1.1.1", "login_success"),
            event(120, "alice", "2.2.2.2", "login_success"),
        ];
        assert!(detector.detect(&events).is_empty());
    }

    #[test]
    fn test_huge_window_does_not_overflow() {
        let detector = GeoHopDetector::with_config(&GeoHopConfig {
            window_seconds: i64::MAX,
        });
        let events = vec![
            event(0, "alice", "1.1.1.1", "login_success"),
            event(86_400, "alice", "2.2.2.2", "login_success"),
        ];
        assert_eq!(detector.detect(&events).len(), 1);
    }
}
