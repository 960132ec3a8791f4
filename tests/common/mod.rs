//! Shared fixtures for integration tests
//!
//! In-memory collaborators and a price-list document builder.

#![allow(dead_code)]

use async_trait::async_trait;
use rds_rightsizer::error::{Result, RightsizerError};
use rds_rightsizer::metrics::{AnalysisWindow, MetricValue, MetricsSource, UtilizationSnapshot};
use rds_rightsizer::rds::{InstanceDirectory, InstanceProfile};
use serde_json::{json, Value};
use std::collections::HashMap;

pub fn profile(id: &str, instance_class: &str, engine: &str) -> InstanceProfile {
    InstanceProfile {
        id: id.to_string(),
        instance_class: instance_class.to_string(),
        engine: engine.to_string(),
        engine_version: "8.0.35".to_string(),
        multi_az: false,
        storage_type: "gp3".to_string(),
        provisioned_iops: None,
        allocated_storage_gib: Some(200),
    }
}

pub fn usage(cpu: f64, connections: f64, read_iops: f64, write_iops: f64) -> UtilizationSnapshot {
    UtilizationSnapshot {
        cpu_utilization: MetricValue::Value(cpu),
        database_connections: MetricValue::Value(connections),
        write_iops: MetricValue::Value(write_iops),
        read_iops: MetricValue::Value(read_iops),
    }
}

/// Directory over a fixed list of profiles
pub struct FakeDirectory {
    pub profiles: Vec<InstanceProfile>,
}

#[async_trait]
impl InstanceDirectory for FakeDirectory {
    async fn describe(&self, instance_id: &str) -> Result<InstanceProfile> {
        self.profiles
            .iter()
            .find(|p| p.id == instance_id)
            .cloned()
            .ok_or_else(|| RightsizerError::ResourceNotFound {
                resource_type: "db-instance".to_string(),
                resource_id: instance_id.to_string(),
            })
    }

    async fn list_all(&self) -> Result<Vec<InstanceProfile>> {
        Ok(self.profiles.clone())
    }
}

/// Metrics keyed by instance id; unknown instances have no data
#[derive(Default)]
pub struct FakeMetrics {
    pub snapshots: HashMap<String, UtilizationSnapshot>,
}

impl FakeMetrics {
    pub fn with(mut self, instance_id: &str, snapshot: UtilizationSnapshot) -> Self {
        self.snapshots.insert(instance_id.to_string(), snapshot);
        self
    }
}

#[async_trait]
impl MetricsSource for FakeMetrics {
    async fn utilization(
        &self,
        instance_id: &str,
        _window: &AnalysisWindow,
    ) -> Result<UtilizationSnapshot> {
        Ok(self.snapshots.get(instance_id).copied().unwrap_or_default())
    }
}

/// Price-list entry for a MySQL Single-AZ DB instance in us-east-1
pub struct Entry {
    attributes: serde_json::Map<String, Value>,
    family: String,
    price: f64,
}

pub fn entry(instance_type: &str, vcpu: u32, memory: &str, price: f64) -> Entry {
    let attributes = json!({
        "instanceType": instance_type,
        "vcpu": vcpu.to_string(),
        "memory": memory,
        "databaseEngine": "MySQL",
        "deploymentOption": "Single-AZ",
        "regionCode": "us-east-1",
        "physicalProcessor": "Intel Xeon Platinum 8175",
        "storage": "EBS Only",
        "currentGeneration": "Yes",
    });
    Entry {
        attributes: attributes.as_object().cloned().unwrap_or_default(),
        family: "Database Instance".to_string(),
        price,
    }
}

impl Entry {
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), Value::String(value.to_string()));
        self
    }

    pub fn graviton(self) -> Self {
        self.attr("physicalProcessor", "AWS Graviton2")
    }

    pub fn family(mut self, family: &str) -> Self {
        self.family = family.to_string();
        self
    }

    pub fn build(self) -> Value {
        json!({
            "serviceCode": "AmazonRDS",
            "product": {
                "productFamily": self.family,
                "attributes": self.attributes,
            },
            "terms": {
                "OnDemand": {
                    "ABC123.JRTCKXETXF": {
                        "priceDimensions": {
                            "ABC123.JRTCKXETXF.6YS6EN2CT7": {
                                "unit": "Hrs",
                                "pricePerUnit": { "USD": format!("{:.4}", self.price) }
                            }
                        }
                    }
                }
            }
        })
    }
}
