//! Severity and mitigation enrichment
//!
//! Each anomaly kind maps to a fixed playbook. Free-text findings that do
//! not carry a kind can still be triaged by keyword through
//! [`Playbook::from_reason`].

use crate::models::{Anomaly, AnomalyKind, Severity};

/// Severity tier plus the ordered steps an operator should take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playbook {
    pub severity: Severity,
    pub steps: &'static [&'static str],
}

const BRUTE_FORCE: Playbook = Playbook {
    severity: Severity::High,
    steps: &[
        "Temporarily lock the targeted account and block the source IP",
        "Enforce MFA for the affected accounts",
        "Check whether any login from this IP succeeded after the failures",
        "Rate-limit authentication attempts from the source",
    ],
};

const GEO_HOP: Playbook = Playbook {
    severity: Severity::High,
    steps: &[
        "Invalidate all active sessions for the user",
        "Force a password reset and require MFA on next login",
        "Confirm with the user whether both logins were theirs",
        "Review account activity between the two logins",
    ],
};

const STATISTICAL_OUTLIER: Playbook = Playbook {
    severity: Severity::Medium,
    steps: &[
        "Investigate the activity spike from this IP",
        "Check whether the traffic comes from automation or a scanner",
        "Throttle or block the IP if the activity is not legitimate",
    ],
};

const EXTERNAL_ACCESS: Playbook = Playbook {
    severity: Severity::Medium,
    steps: &[
        "Verify the access was expected (VPN, remote work, travel)",
        "Confirm the listed users recognize the activity",
        "Restrict access to the VPN if external logins are not allowed",
    ],
};

const DEFAULT: Playbook = Playbook {
    severity: Severity::Low,
    steps: &["Log and monitor"],
};

/// Keyword table for free-text triage; first match wins
const REASON_KEYWORDS: &[(&[&str], Playbook)] = &[
    (&["brute"], BRUTE_FORCE),
    (&["geo", "hop", "impossible"], GEO_HOP),
    (&["statistical anomaly", "outlier"], STATISTICAL_OUTLIER),
    (&["external", "public ip"], EXTERNAL_ACCESS),
];

impl Playbook {
    pub fn for_kind(kind: AnomalyKind) -> Playbook {
        match kind {
            AnomalyKind::BruteForce => BRUTE_FORCE,
            AnomalyKind::GeoHop => GEO_HOP,
            AnomalyKind::StatisticalOutlier => STATISTICAL_OUTLIER,
            AnomalyKind::ExternalAccess => EXTERNAL_ACCESS,
        }
    }

    /// Case-insensitive keyword match against a free-text reason, falling
    /// back to low severity with "Log and monitor".
    pub fn from_reason(reason: &str) -> Playbook {
        let reason = reason.to_lowercase();
        REASON_KEYWORDS
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| reason.contains(k)))
            .map(|(_, playbook)| *playbook)
            .unwrap_or(DEFAULT)
    }

    pub fn mitigation(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.to_string()).collect()
    }
}

/// Attach severity and mitigation steps to an anomaly
pub fn enrich(anomaly: &mut Anomaly) {
    let playbook = Playbook::for_kind(anomaly.kind);
    anomaly.severity = playbook.severity;
    anomaly.mitigation = playbook.mitigation();
}
