//! SKU extraction from price-list documents
//!
//! A price-list document looks like:
//!
//! ```json
//! {
//!   "product": {
//!     "productFamily": "Database Instance",
//!     "attributes": { "instanceType": "db.r5.large", "vcpu": "2", "memory": "16 GiB", ... }
//!   },
//!   "terms": {
//!     "OnDemand": {
//!       "<offer>": {
//!         "priceDimensions": { "<rate>": { "pricePerUnit": { "USD": "0.2500000000" } } }
//!       }
//!     }
//!   }
//! }
//! ```

use crate::engine::AURORA_IO_OPTIMIZED_ATTRIBUTE;
use crate::error::{Result, RightsizerError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Product family of priced DB instance classes
pub const DATABASE_INSTANCE_FAMILY: &str = "Database Instance";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Architecture {
    X86,
    Arm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageMode {
    Standard,
    AuroraIoOptimized,
}

/// One priced instance configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkuRecord {
    pub instance_type: String,
    pub vcpu: u32,
    pub memory_gib: f64,
    /// On-demand price per hour
    pub hourly_price: f64,
    pub architecture: Architecture,
    pub storage_mode: StorageMode,
}

#[derive(Debug, Deserialize)]
struct PriceListEntry {
    product: Product,
    #[serde(default)]
    terms: Terms,
}

#[derive(Debug, Deserialize)]
struct Product {
    #[serde(rename = "productFamily", default)]
    product_family: Option<String>,
    #[serde(default)]
    attributes: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct Terms {
    #[serde(rename = "OnDemand", default)]
    on_demand: BTreeMap<String, OfferTerm>,
}

#[derive(Debug, Deserialize)]
struct OfferTerm {
    #[serde(rename = "priceDimensions", default)]
    price_dimensions: BTreeMap<String, PriceDimension>,
}

#[derive(Debug, Deserialize)]
struct PriceDimension {
    #[serde(rename = "pricePerUnit", default)]
    price_per_unit: BTreeMap<String, String>,
}

/// Parse one raw price-list document
///
/// Returns `Ok(None)` for entries that are not DB instance classes (storage,
/// I/O, backup ...). `arm_marker` is matched against `physicalProcessor`.
pub fn extract(raw: &str, arm_marker: &str) -> Result<Option<SkuRecord>> {
    let entry: PriceListEntry = serde_json::from_str(raw)
        .map_err(|e| RightsizerError::catalog(format!("invalid JSON: {}", e)))?;

    if entry.product.product_family.as_deref() != Some(DATABASE_INSTANCE_FAMILY) {
        return Ok(None);
    }

    let attributes = &entry.product.attributes;
    let instance_type = attribute(attributes, "instanceType")?.to_string();

    let vcpu: u32 = attribute(attributes, "vcpu")?
        .trim()
        .parse()
        .map_err(|_| RightsizerError::catalog(format!("{}: unparsable vcpu", instance_type)))?;

    // "16 GiB"
    let memory_gib: f64 = attribute(attributes, "memory")?
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .replace(',', "")
        .parse()
        .map_err(|_| RightsizerError::catalog(format!("{}: unparsable memory", instance_type)))?;

    if vcpu == 0 || !(memory_gib > 0.0) {
        return Err(RightsizerError::catalog(format!(
            "{}: vcpu and memory must be positive",
            instance_type
        )));
    }

    let hourly_price = on_demand_price(&entry.terms)
        .ok_or_else(|| RightsizerError::catalog(format!("{}: no on-demand price", instance_type)))?;
    if !(hourly_price >= 0.0) {
        return Err(RightsizerError::catalog(format!(
            "{}: negative price {}",
            instance_type, hourly_price
        )));
    }

    let architecture = match attributes.get("physicalProcessor") {
        Some(processor) if processor.contains(arm_marker) => Architecture::Arm,
        _ => Architecture::X86,
    };

    let storage_mode = match attributes.get("storage").map(String::as_str) {
        Some(AURORA_IO_OPTIMIZED_ATTRIBUTE) => StorageMode::AuroraIoOptimized,
        _ => StorageMode::Standard,
    };

    Ok(Some(SkuRecord {
        instance_type,
        vcpu,
        memory_gib,
        hourly_price,
        architecture,
        storage_mode,
    }))
}

fn attribute<'a>(attributes: &'a HashMap<String, String>, name: &str) -> Result<&'a str> {
    attributes
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| RightsizerError::catalog(format!("missing attribute '{}'", name)))
}

/// First price of the first on-demand offer term
fn on_demand_price(terms: &Terms) -> Option<f64> {
    terms
        .on_demand
        .values()
        .next()?
        .price_dimensions
        .values()
        .next()?
        .price_per_unit
        .values()
        .next()?
        .parse()
        .ok()
}
