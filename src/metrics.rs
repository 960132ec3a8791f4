//! Utilization metrics from CloudWatch
//!
//! Each tracked metric is reduced to its maximum over the analysis window. A
//! metric without datapoints is `MetricValue::NoData`, never zero.

use crate::error::{Result, RightsizerError};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cloudwatch::error::DisplayErrorContext;
use aws_sdk_cloudwatch::primitives::DateTime as AwsDateTime;
use aws_sdk_cloudwatch::types::{Dimension, Metric, MetricDataQuery, MetricStat};
use aws_sdk_cloudwatch::Client as CloudWatchClient;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::debug;

const NAMESPACE: &str = "AWS/RDS";
const DIMENSION: &str = "DBInstanceIdentifier";
const NO_DATA: &str = "No Data";

/// Extra days added to the query period so the whole window is one datapoint
const PERIOD_SLACK_DAYS: i64 = 10;

/// Window maximum of one metric
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MetricValue {
    Value(f64),
    #[default]
    NoData,
}

impl MetricValue {
    pub fn value(&self) -> Option<f64> {
        match self {
            MetricValue::Value(v) => Some(*v),
            MetricValue::NoData => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Value(v) => write!(f, "{}", v),
            MetricValue::NoData => f.write_str(NO_DATA),
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            MetricValue::Value(v) => serializer.serialize_f64(*v),
            MetricValue::NoData => serializer.serialize_str(NO_DATA),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedMetric {
    CpuUtilization,
    DatabaseConnections,
    WriteIops,
    ReadIops,
}

impl TrackedMetric {
    pub const ALL: [TrackedMetric; 4] = [
        TrackedMetric::CpuUtilization,
        TrackedMetric::DatabaseConnections,
        TrackedMetric::WriteIops,
        TrackedMetric::ReadIops,
    ];

    /// CloudWatch metric name
    pub fn name(&self) -> &'static str {
        match self {
            TrackedMetric::CpuUtilization => "CPUUtilization",
            TrackedMetric::DatabaseConnections => "DatabaseConnections",
            TrackedMetric::WriteIops => "WriteIOPS",
            TrackedMetric::ReadIops => "ReadIOPS",
        }
    }
}

/// Peak utilization of one instance over the analysis window
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct UtilizationSnapshot {
    pub cpu_utilization: MetricValue,
    pub database_connections: MetricValue,
    pub write_iops: MetricValue,
    pub read_iops: MetricValue,
}

impl UtilizationSnapshot {
    pub fn get(&self, metric: TrackedMetric) -> MetricValue {
        match metric {
            TrackedMetric::CpuUtilization => self.cpu_utilization,
            TrackedMetric::DatabaseConnections => self.database_connections,
            TrackedMetric::WriteIops => self.write_iops,
            TrackedMetric::ReadIops => self.read_iops,
        }
    }

    fn set(&mut self, metric: TrackedMetric, value: MetricValue) {
        match metric {
            TrackedMetric::CpuUtilization => self.cpu_utilization = value,
            TrackedMetric::DatabaseConnections => self.database_connections = value,
            TrackedMetric::WriteIops => self.write_iops = value,
            TrackedMetric::ReadIops => self.read_iops = value,
        }
    }
}

/// Whole-day analysis window ending today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Query period in seconds, longer than the window
    pub period_secs: i32,
}

impl AnalysisWindow {
    /// From midnight `days` days ago to 23:59:59 today (UTC)
    pub fn ending_at(now: DateTime<Utc>, days: u32) -> Self {
        let days = i64::from(days);
        let start_day = (now - Duration::days(days)).date_naive();
        let start = Utc.from_utc_datetime(&start_day.and_time(NaiveTime::MIN));
        let end = Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN))
            + Duration::seconds(86_399);
        let period_secs = ((days + PERIOD_SLACK_DAYS) * 86_400).min(i64::from(i32::MAX)) as i32;
        Self {
            start,
            end,
            period_secs,
        }
    }
}

/// Source of utilization snapshots
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn utilization(
        &self,
        instance_id: &str,
        window: &AnalysisWindow,
    ) -> Result<UtilizationSnapshot>;
}

/// CloudWatch `GetMetricData` client
pub struct CloudWatchMetrics {
    client: CloudWatchClient,
}

impl CloudWatchMetrics {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: CloudWatchClient::new(sdk_config),
        }
    }

    fn query(
        instance_id: &str,
        index: usize,
        metric: TrackedMetric,
        period: i32,
    ) -> MetricDataQuery {
        let dimension = Dimension::builder()
            .name(DIMENSION)
            .value(instance_id)
            .build();
        let stat = MetricStat::builder()
            .metric(
                Metric::builder()
                    .namespace(NAMESPACE)
                    .metric_name(metric.name())
                    .dimensions(dimension)
                    .build(),
            )
            .period(period)
            .stat("Maximum")
            .build();
        MetricDataQuery::builder()
            .id(format!("m{}", index))
            .metric_stat(stat)
            .return_data(true)
            .build()
    }
}

/// Round to two decimals
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[async_trait]
impl MetricsSource for CloudWatchMetrics {
    async fn utilization(
        &self,
        instance_id: &str,
        window: &AnalysisWindow,
    ) -> Result<UtilizationSnapshot> {
        let queries: Vec<MetricDataQuery> = TrackedMetric::ALL
            .iter()
            .enumerate()
            .map(|(i, metric)| Self::query(instance_id, i, *metric, window.period_secs))
            .collect();

        let mut peaks: [Option<f64>; 4] = [None; 4];
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .client
                .get_metric_data()
                .set_metric_data_queries(Some(queries.clone()))
                .start_time(AwsDateTime::from_secs(window.start.timestamp()))
                .end_time(AwsDateTime::from_secs(window.end.timestamp()))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| {
                    RightsizerError::CloudWatch(format!(
                        "Failed to get metrics for {}: {}",
                        instance_id,
                        DisplayErrorContext(&e)
                    ))
                })?;

            for result in response.metric_data_results() {
                let Some(index) = result
                    .id()
                    .and_then(|id| id.strip_prefix('m'))
                    .and_then(|n| n.parse::<usize>().ok())
                    .filter(|i| *i < peaks.len())
                else {
                    continue;
                };
                for value in result.values() {
                    peaks[index] = Some(peaks[index].map_or(*value, |p| p.max(*value)));
                }
            }

            match response.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        let mut snapshot = UtilizationSnapshot::default();
        for (metric, peak) in TrackedMetric::ALL.iter().zip(peaks) {
            let value = peak.map_or(MetricValue::NoData, |v| MetricValue::Value(round2(v)));
            snapshot.set(*metric, value);
        }
        debug!("Utilization for {}: {:?}", instance_id, snapshot);
        Ok(snapshot)
    }
}
