use rsecurity::config::Config;
use rsecurity::persistence::{ReportQuery, ReportStore, SqliteReportStore};
use rsecurity::{Anomaly, AnomalyKind, Severity};
use std::fmt::Write as _;
use std::path::Path;

/// A small day of traffic: one brute force burst from a public IP, one
/// geo-hop, one noisy internal host and a quiet background.
fn write_sample_log(path: &Path) {
    let mut csv = String::from("timestamp,user_id,ip_address,action,user_agent\n");

    for i in 0..6 {
        writeln!(csv, "2024-01-15T09:00:{:02},admin,203.0.113.50,login_failed,curl", i * 5).unwrap();
    }
    writeln!(csv, "2024-01-15T10:00:00,alice,10.0.0.5,login_success,firefox").unwrap();
    writeln!(csv, "2024-01-15T10:02:00,alice,10.0.0.77,login_success,firefox").unwrap();
    for i in 0..19 {
        writeln!(csv, "2024-01-15T11:{:02}:00,user{},192.168.1.{},login_success,edge", i, i, i + 1).unwrap();
    }
    for i in 0..100 {
        writeln!(csv, "2024-01-15T12:{:02}:{:02},svc,172.16.5.5,file_access,agent", i / 60, i % 60).unwrap();
    }

    std::fs::write(path, csv).unwrap();
}

#[test]
fn test_full_run_writes_parseable_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("auth_logs.csv");
    let output = dir.path().join("anomaly_report.json");
    write_sample_log(&input);

    let mut config = Config::default();
    config.input.file_path = input;
    config.output.file_path = output.clone();

    let summary = rsecurity::run(&config).unwrap();
    assert_eq!(summary.events_loaded, 6 + 2 + 19 + 100);
    assert!(summary.message.starts_with(&format!("Detected {} anomalies.", summary.anomalies.len())));
    assert!(summary.stored_report_id.is_none());

    let kinds: Vec<_> = summary.anomalies.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![
            AnomalyKind::BruteForce,
            AnomalyKind::ExternalAccess,
            AnomalyKind::GeoHop,
            AnomalyKind::StatisticalOutlier,
        ]
    );

    let brute = &summary.anomalies[0];
    assert_eq!(brute.ip_address, "203.0.113.50");
    assert_eq!(brute.severity, Severity::High);
    assert!(brute.mitigation.iter().any(|m| m.contains("MFA")));

    let external = summary.anomalies[1].aggregate.as_ref().unwrap();
    assert_eq!(external.total_events, 6);
    assert_eq!(external.unique_users, vec!["admin"]);

    let outlier = &summary.anomalies[3];
    assert_eq!(outlier.ip_address, "172.16.5.5");
    assert_eq!(outlier.user_id, "svc");

    let parsed: Vec<Anomaly> =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(parsed.len(), summary.anomalies.len());
    assert_eq!(parsed, summary.anomalies);
}

#[test]
fn test_run_stores_report_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("auth_logs.csv");
    write_sample_log(&input);

    let mut config = Config::default();
    config.input.file_path = input;
    config.output.file_path = dir.path().join("report.jsonl");
    config.output.format = "jsonl".to_string();
    config.output.store_report = true;
    config.store.db_path = dir.path().join("reports.db");

    let summary = rsecurity::run(&config).unwrap();
    let id = summary.stored_report_id.unwrap();

    let store = SqliteReportStore::new(&config.store.db_path).unwrap();
    let report = store.get(id).unwrap().unwrap();
    assert!(report.title.starts_with("Anomaly report: 4 findings"));
    assert!(report.tags.contains(&"brute_force".to_string()));

    let high = store
        .list(&ReportQuery { tag: Some("high".to_string()), q: None })
        .unwrap();
    assert_eq!(high.len(), 1);

    let jsonl = std::fs::read_to_string(&config.output.file_path).unwrap();
    assert_eq!(jsonl.lines().count(), 4);
}

#[test]
fn test_bad_timestamp_aborts_without_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("auth_logs.csv");
    let output = dir.path().join("anomaly_report.json");
    std::fs::write(
        &input,
        "timestamp,user_id,ip_address,action\n2024-01-15T09:00:00,a,8.8.8.8,login_failed\n15/01/2024,b,8.8.8.8,login_failed\n",
    )
    .unwrap();

    let mut config = Config::default();
    config.input.file_path = input;
    config.output.file_path = output.clone();

    assert!(rsecurity::run(&config).is_err());
    assert!(!output.exists());
}
