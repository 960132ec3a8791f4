//! RDS engine, deployment and storage vocabulary
//!
//! Translates the identifiers returned by the RDS API into the attribute
//! values the Price List catalog uses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage type of Aurora clusters billed in I/O-Optimized mode
pub const AURORA_IO_OPTIMIZED_STORAGE: &str = "aurora-iopt1";

/// Catalog `storage` attribute of I/O-Optimized SKUs
pub const AURORA_IO_OPTIMIZED_ATTRIBUTE: &str = "Aurora IO Optimization Mode";

/// Engines that are not relational and never analysed
const EXCLUDED_ENGINES: &[&str] = &["docdb"];

/// Normalize legacy engine identifiers
///
/// Old Aurora MySQL 5.6 clusters report plain `aurora`.
pub fn normalize_engine(engine: &str) -> &str {
    match engine {
        "aurora" => "aurora-mysql",
        other => other,
    }
}

/// Catalog `databaseEngine` value for an RDS engine identifier
pub fn engine_display_name(engine: &str) -> Option<&'static str> {
    let name = match normalize_engine(engine) {
        "aurora-mysql" => "Aurora MySQL",
        "aurora-postgresql" => "Aurora PostgreSQL",
        "mariadb" => "MariaDB",
        "mysql" => "MySQL",
        "postgres" => "PostgreSQL",
        "oracle-se2" | "oracle-se2-cdb" | "oracle-ee" | "oracle-ee-cdb" => "Oracle",
        "sqlserver-se" | "sqlserver-ee" | "sqlserver-ex" | "sqlserver-web" => "SQL Server",
        "db2-se" | "db2-ae" => "Db2",
        _ => return None,
    };
    Some(name)
}

/// Catalog `databaseEdition` value for engines priced per edition
pub fn engine_edition(engine: &str) -> Option<&'static str> {
    let edition = match engine {
        "sqlserver-se" => "Standard",
        "sqlserver-ee" => "Enterprise",
        "sqlserver-ex" => "Express",
        "sqlserver-web" => "Web",
        "oracle-se2" | "oracle-se2-cdb" => "Standard Two",
        "oracle-ee" | "oracle-ee-cdb" => "Enterprise",
        _ => return None,
    };
    Some(edition)
}

pub fn is_excluded_engine(engine: &str) -> bool {
    EXCLUDED_ENGINES.contains(&engine)
}

/// Serverless (Aurora Serverless v2) instances have no fixed class to price
pub fn is_serverless_class(instance_class: &str) -> bool {
    matches!(instance_class, "db.serverless" | "serverless")
}

/// Single-node vs. standby-replicated deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentMode {
    SingleAz,
    MultiAz,
}

impl DeploymentMode {
    pub fn from_multi_az(multi_az: bool) -> Self {
        if multi_az {
            DeploymentMode::MultiAz
        } else {
            DeploymentMode::SingleAz
        }
    }

    /// Catalog `deploymentOption` value
    pub fn as_catalog_value(&self) -> &'static str {
        match self {
            DeploymentMode::SingleAz => "Single-AZ",
            DeploymentMode::MultiAz => "Multi-AZ",
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_catalog_value())
    }
}

/// Whether the instance is billed in Aurora I/O-Optimized mode
pub fn is_io_optimized(storage_type: &str) -> bool {
    storage_type == AURORA_IO_OPTIMIZED_STORAGE
}

/// Provisioned-IOPS SSD storage, billed per provisioned IOPS unit
pub fn is_provisioned_iops(storage_type: &str) -> bool {
    matches!(storage_type, "io1" | "io2")
}

/// Instance family and generation prefix, e.g. `db.r5` for `db.r5.xlarge`
pub fn family_prefix(instance_type: &str) -> String {
    instance_type.split('.').take(2).collect::<Vec<_>>().join(".")
}
