//! RDS instance metadata

use crate::error::{Result, RightsizerError};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_rds::error::DisplayErrorContext;
use aws_sdk_rds::types::DbInstance;
use aws_sdk_rds::Client as RdsClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Attributes of one DB instance relevant to cost analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceProfile {
    pub id: String,
    pub instance_class: String,
    pub engine: String,
    pub engine_version: String,
    pub multi_az: bool,
    pub storage_type: String,
    pub provisioned_iops: Option<i32>,
    pub allocated_storage_gib: Option<i32>,
}

impl InstanceProfile {
    pub fn from_db_instance(instance: &DbInstance) -> Result<Self> {
        let id = instance
            .db_instance_identifier()
            .ok_or_else(|| RightsizerError::Rds("DB instance without identifier".to_string()))?;
        let instance_class = instance
            .db_instance_class()
            .ok_or_else(|| RightsizerError::Rds(format!("{}: missing instance class", id)))?;
        let engine = instance
            .engine()
            .ok_or_else(|| RightsizerError::Rds(format!("{}: missing engine", id)))?;

        Ok(Self {
            id: id.to_string(),
            instance_class: instance_class.to_string(),
            engine: engine.to_string(),
            engine_version: instance.engine_version().unwrap_or_default().to_string(),
            multi_az: instance.multi_az().unwrap_or(false),
            storage_type: instance.storage_type().unwrap_or_default().to_string(),
            provisioned_iops: instance.iops(),
            allocated_storage_gib: instance.allocated_storage(),
        })
    }
}

/// Source of instance profiles
#[async_trait]
pub trait InstanceDirectory: Send + Sync {
    /// Look up one instance; fails with `ResourceNotFound` when it does not exist
    async fn describe(&self, instance_id: &str) -> Result<InstanceProfile>;

    /// Every instance in the region
    async fn list_all(&self) -> Result<Vec<InstanceProfile>>;
}

/// `rds:DescribeDBInstances` client
pub struct RdsInstanceDirectory {
    client: RdsClient,
}

impl RdsInstanceDirectory {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: RdsClient::new(sdk_config),
        }
    }
}

#[async_trait]
impl InstanceDirectory for RdsInstanceDirectory {
    async fn describe(&self, instance_id: &str) -> Result<InstanceProfile> {
        let response = self
            .client
            .describe_db_instances()
            .db_instance_identifier(instance_id)
            .send()
            .await
            .map_err(|e| {
                let not_found = e
                    .as_service_error()
                    .is_some_and(|se| se.is_db_instance_not_found_fault());
                if not_found {
                    RightsizerError::ResourceNotFound {
                        resource_type: "db-instance".to_string(),
                        resource_id: instance_id.to_string(),
                    }
                } else {
                    RightsizerError::Rds(format!(
                        "Failed to describe {}: {}",
                        instance_id,
                        DisplayErrorContext(&e)
                    ))
                }
            })?;

        let instance = response.db_instances().first().ok_or_else(|| {
            RightsizerError::ResourceNotFound {
                resource_type: "db-instance".to_string(),
                resource_id: instance_id.to_string(),
            }
        })?;
        InstanceProfile::from_db_instance(instance)
    }

    async fn list_all(&self) -> Result<Vec<InstanceProfile>> {
        let mut profiles = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let response = self
                .client
                .describe_db_instances()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| {
                    RightsizerError::Rds(format!(
                        "Failed to list DB instances: {}",
                        DisplayErrorContext(&e)
                    ))
                })?;

            for instance in response.db_instances() {
                profiles.push(InstanceProfile::from_db_instance(instance)?);
            }

            match response.marker() {
                Some(m) if !m.is_empty() => marker = Some(m.to_string()),
                _ => break,
            }
        }

        debug!("Found {} DB instances", profiles.len());
        Ok(profiles)
    }
}

#[cfg(test)]
pub(crate) fn test_profile(id: &str, instance_class: &str, engine: &str) -> InstanceProfile {
    InstanceProfile {
        id: id.to_string(),
        instance_class: instance_class.to_string(),
        engine: engine.to_string(),
        engine_version: "15.4".to_string(),
        multi_az: false,
        storage_type: "gp3".to_string(),
        provisioned_iops: None,
        allocated_storage_gib: Some(100),
    }
}
