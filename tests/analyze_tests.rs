//! End-to-end analysis tests
//!
//! Drives `workflow::analyze` with in-memory RDS/CloudWatch collaborators and
//! a `FileCatalog` loaded from disk, then checks the CSV report.

mod common;

use chrono::{TimeZone, Utc};
use common::{entry, profile, usage, FakeDirectory, FakeMetrics};
use rds_rightsizer::catalog::FileCatalog;
use rds_rightsizer::config::{AnalysisContext, Config};
use rds_rightsizer::metrics::{AnalysisWindow, MetricValue, UtilizationSnapshot};
use rds_rightsizer::recommend::Suggestion;
use rds_rightsizer::report;
use rds_rightsizer::validation::Target;
use rds_rightsizer::workflow::analyze;
use rds_rightsizer::RightsizerError;
use serde_json::Value;
use tempfile::TempDir;

fn window() -> AnalysisWindow {
    AnalysisWindow::ending_at(Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap(), 14)
}

fn ctx() -> AnalysisContext {
    AnalysisContext::new("us-east-1", &Config::default())
}

fn catalog_file(dir: &TempDir, entries: Vec<Value>) -> FileCatalog {
    let path = dir.path().join("us-east-1-pricing.json");
    std::fs::write(&path, serde_json::to_string_pretty(&entries).unwrap()).unwrap();
    FileCatalog::load(&path).unwrap()
}

fn fleet_catalog(dir: &TempDir) -> FileCatalog {
    catalog_file(
        dir,
        vec![
            entry("db.r5.xlarge", 4, "32 GiB", 0.50).build(),
            entry("db.r6g.xlarge", 4, "32 GiB", 0.45).graviton().build(),
            entry("db.r5.large", 2, "8 GiB", 0.25).build(),
            entry("db.m5.large", 2, "8 GiB", 0.20).build(),
            entry("db.r5.xlarge", 4, "32 GiB", 0.01)
                .family("Provisioned IOPS")
                .build(),
        ],
    )
}

#[tokio::test]
async fn test_low_cpu_instance_scales_down_within_family() {
    let dir = TempDir::new().unwrap();
    let catalog = fleet_catalog(&dir);
    let directory = FakeDirectory {
        profiles: vec![profile("orders", "db.r5.xlarge", "mysql")],
    };
    let metrics = FakeMetrics::default().with("orders", usage(15.0, 40.0, 300.0, 200.0));

    let analyzed = analyze(
        &directory,
        &metrics,
        &catalog,
        &ctx(),
        &Target::Instance("orders".to_string()),
        &window(),
        false,
    )
    .await
    .unwrap();

    assert_eq!(analyzed.len(), 1);
    let rec = &analyzed[0].recommendation;
    let current = rec.current.unwrap();
    assert_eq!(current.vcpu, 4);
    assert_eq!(current.memory_gib, 32.0);
    assert!((current.monthly_cost - 0.50 * 730.0).abs() < 1e-9);

    assert_eq!(rec.scale_down.instance_type(), Some("db.r5.large"));
    let savings = rec.scale_down.monthly_savings().unwrap();
    assert!((savings - (0.50 * 730.0 - 0.25 * 730.0)).abs() < 1e-9);

    assert_eq!(rec.graviton.instance_type(), Some("db.r6g.xlarge"));
    assert!((rec.graviton.monthly_savings().unwrap() - 0.05 * 730.0).abs() < 1e-6);
    assert_eq!(rec.io_savings, None);
    assert_eq!(rec.idle_instance, None);
}

#[tokio::test]
async fn test_half_scale_uses_half_memory() {
    let dir = TempDir::new().unwrap();
    let catalog = catalog_file(
        &dir,
        vec![
            entry("db.r5.xlarge", 4, "32 GiB", 0.50).build(),
            entry("db.r5.large", 2, "16 GiB", 0.25).build(),
        ],
    );
    let directory = FakeDirectory {
        profiles: vec![profile("orders", "db.r5.xlarge", "mysql")],
    };
    let metrics = FakeMetrics::default().with("orders", usage(30.0, 40.0, 300.0, 200.0));

    let analyzed = analyze(&directory, &metrics, &catalog, &ctx(), &Target::All, &window(), false)
        .await
        .unwrap();

    let rec = &analyzed[0].recommendation;
    assert_eq!(rec.scale_down.instance_type(), Some("db.r5.large"));
    assert_eq!(rec.graviton, Suggestion::NotApplicable);
}

#[tokio::test]
async fn test_busy_instance_is_not_downsized() {
    let dir = TempDir::new().unwrap();
    let catalog = fleet_catalog(&dir);
    let directory = FakeDirectory {
        profiles: vec![profile("orders", "db.r5.xlarge", "mysql")],
    };
    let metrics = FakeMetrics::default().with("orders", usage(85.0, 40.0, 300.0, 200.0));

    let analyzed = analyze(&directory, &metrics, &catalog, &ctx(), &Target::All, &window(), false)
        .await
        .unwrap();
    assert_eq!(analyzed[0].recommendation.scale_down, Suggestion::NotApplicable);
}

#[tokio::test]
async fn test_fleet_report() {
    let dir = TempDir::new().unwrap();
    let catalog = fleet_catalog(&dir);

    let mut ledger = profile("ledger", "db.r5.xlarge", "mysql");
    ledger.storage_type = "io1".to_string();
    ledger.provisioned_iops = Some(2000);

    let directory = FakeDirectory {
        profiles: vec![
            profile("orders", "db.r5.xlarge", "mysql"),
            profile("catalog-docs", "db.r5.large", "docdb"),
            profile("analytics", "db.serverless", "aurora-postgresql"),
            profile("legacy", "db.m1.small", "mysql"),
            ledger,
        ],
    };
    let metrics = FakeMetrics::default()
        .with("orders", usage(15.0, 0.0, 300.0, 200.0))
        .with("ledger", usage(75.0, 12.0, 800.0, 600.0))
        .with("analytics", UtilizationSnapshot::default());

    let analyzed = analyze(&directory, &metrics, &catalog, &ctx(), &Target::All, &window(), false)
        .await
        .unwrap();

    // docdb is excluded and db.m1.small has no price
    let ids: Vec<_> = analyzed.iter().map(|a| a.profile.id.as_str()).collect();
    assert_eq!(ids, ["orders", "analytics", "ledger"]);

    let orders = &analyzed[0].recommendation;
    assert_eq!(orders.idle_instance.as_deref(), Some("orders"));

    let analytics = &analyzed[1].recommendation;
    assert_eq!(analytics.current, None);
    assert_eq!(analytics.graviton, Suggestion::Unavailable);
    assert_eq!(analytics.scale_down, Suggestion::Unavailable);

    let ledger = &analyzed[2].recommendation;
    assert_eq!(ledger.io_savings, Some(400.0));
    assert_eq!(ledger.scale_down, Suggestion::NotApplicable);

    let report_path = dir.path().join("costOptimizer.csv");
    report::write_csv_file(&report_path, &analyzed).unwrap();

    let mut reader = csv::Reader::from_path(&report_path).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(header, report::header());

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);

    let column = |name: &str| header.iter().position(|h| h == name).unwrap();
    assert_eq!(&rows[0][column("ScaleDownInstanceType")], "db.r5.large");
    assert_eq!(&rows[0][column("ScaleDownCostSavings")], "182.50");
    assert_eq!(&rows[0][column("MonthlyCost")], "365.00");
    assert_eq!(&rows[0][column("NoConnectionsInstances")], "orders");
    assert_eq!(&rows[1][column("MaxCPUUtilization")], "No Data");
    assert_eq!(&rows[1][column("GravitonInstanceType")], "");
    assert_eq!(&rows[2][column("CostSavings-io1-to-gp3")], "400.00");
    assert_eq!(&rows[2][column("ScaleDownInstanceType")], "NA");
}

#[tokio::test]
async fn test_unknown_instance_aborts() {
    let catalog = FileCatalog::from_entries(vec![]);
    let directory = FakeDirectory { profiles: vec![] };
    let metrics = FakeMetrics::default();

    let err = analyze(
        &directory,
        &metrics,
        &catalog,
        &ctx(),
        &Target::Instance("missing".to_string()),
        &window(),
        false,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, RightsizerError::ResourceNotFound { .. }));
}

#[tokio::test]
async fn test_malformed_catalog_entry_aborts() {
    let mut broken = entry("db.r5.xlarge", 4, "32 GiB", 0.50).build();
    broken["terms"] = serde_json::json!({});
    let catalog = FileCatalog::from_entries(vec![broken]);
    let directory = FakeDirectory {
        profiles: vec![profile("orders", "db.r5.xlarge", "mysql")],
    };
    let metrics = FakeMetrics::default();

    let err = analyze(&directory, &metrics, &catalog, &ctx(), &Target::All, &window(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, RightsizerError::Catalog { .. }));
}

#[test]
fn test_no_data_metric_renders_sentinel() {
    assert_eq!(MetricValue::NoData.to_string(), "No Data");
}
