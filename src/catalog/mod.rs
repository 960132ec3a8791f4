//! Price catalog access
//!
//! `PriceCatalog` is the seam between the recommendation engine and the AWS
//! Price List service. Implementations return raw price-list documents in
//! catalog order; interpretation happens in `sku`.
//!
//! - `aws`: live Price List API (`GetProducts`)
//! - `file`: offline snapshot loaded from a JSON file
//! - `sku`: normalizes one price-list document into a `SkuRecord`

mod aws;
mod file;
pub mod sku;

pub use aws::AwsPricingCatalog;
pub use file::FileCatalog;
pub use sku::{Architecture, SkuRecord, StorageMode};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Catalog attribute names used in TERM_MATCH filters
pub mod fields {
    pub const REGION_CODE: &str = "regionCode";
    pub const DATABASE_ENGINE: &str = "databaseEngine";
    pub const DATABASE_EDITION: &str = "databaseEdition";
    pub const DEPLOYMENT_OPTION: &str = "deploymentOption";
    pub const INSTANCE_TYPE: &str = "instanceType";
    pub const VCPU: &str = "vcpu";
    pub const MEMORY: &str = "memory";
    pub const CURRENT_GENERATION: &str = "currentGeneration";
}

/// Equality (TERM_MATCH) filter on a catalog attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    pub field: String,
    pub value: String,
}

impl CatalogFilter {
    pub fn term(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Source of raw price-list entries
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceCatalog: Send + Sync {
    /// Return every entry of `service_code` matching all `filters`, in catalog order
    async fn get_products(
        &self,
        service_code: &str,
        filters: &[CatalogFilter],
    ) -> Result<Vec<String>>;
}

/// Memory filter value in the catalog's notation (`16 GiB`, `0.5 GiB`)
pub fn memory_filter_value(memory_gib: f64) -> String {
    if memory_gib.fract() == 0.0 {
        format!("{:.0} GiB", memory_gib)
    } else {
        format!("{} GiB", memory_gib)
    }
}
