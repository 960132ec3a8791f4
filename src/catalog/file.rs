//! Offline price catalog
//!
//! Reads a snapshot of price-list documents (a JSON array of the objects
//! `GetProducts` returns) so analyses can run without Price List API access.

use super::{CatalogFilter, PriceCatalog};
use crate::error::{Result, RightsizerError};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tracing::info;

pub struct FileCatalog {
    entries: Vec<Value>,
}

impl FileCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        info!(
            "Loaded {} price list entries from {}",
            catalog.entries.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        match serde_json::from_str(content)? {
            Value::Array(entries) => Ok(Self::from_entries(entries)),
            _ => Err(RightsizerError::catalog(
                "pricing file must contain a JSON array of price list entries",
            )),
        }
    }

    pub fn from_entries(entries: Vec<Value>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn matches(entry: &Value, service_code: &str, filters: &[CatalogFilter]) -> bool {
        if let Some(code) = entry.get("serviceCode").and_then(Value::as_str) {
            if code != service_code {
                return false;
            }
        }
        let attributes = entry.pointer("/product/attributes");
        filters.iter().all(|filter| {
            attributes
                .and_then(|attrs| attrs.get(&filter.field))
                .and_then(Value::as_str)
                .is_some_and(|value| value.eq_ignore_ascii_case(&filter.value))
        })
    }
}

#[async_trait]
impl PriceCatalog for FileCatalog {
    async fn get_products(
        &self,
        service_code: &str,
        filters: &[CatalogFilter],
    ) -> Result<Vec<String>> {
        self.entries
            .iter()
            .filter(|entry| Self::matches(entry, service_code, filters))
            .map(|entry| serde_json::to_string(entry).map_err(RightsizerError::from))
            .collect()
    }
}
