//! AWS Price List API catalog

use super::{CatalogFilter, PriceCatalog};
use crate::error::{Result, RightsizerError};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_pricing::error::DisplayErrorContext;
use aws_sdk_pricing::types::{Filter, FilterType};
use aws_sdk_pricing::Client as PricingClient;
use tracing::debug;

/// Catalog backed by `pricing:GetProducts`
pub struct AwsPricingCatalog {
    client: PricingClient,
}

impl AwsPricingCatalog {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: PricingClient::new(sdk_config),
        }
    }
}

#[async_trait]
impl PriceCatalog for AwsPricingCatalog {
    async fn get_products(
        &self,
        service_code: &str,
        filters: &[CatalogFilter],
    ) -> Result<Vec<String>> {
        let filters = filters
            .iter()
            .map(|f| {
                Filter::builder()
                    .r#type(FilterType::TermMatch)
                    .field(&f.field)
                    .value(&f.value)
                    .build()
                    .map_err(|e| {
                        RightsizerError::Pricing(format!("Invalid filter {}: {}", f.field, e))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut price_list = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .client
                .get_products()
                .service_code(service_code)
                .set_filters(Some(filters.clone()))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| {
                    RightsizerError::Pricing(format!(
                        "Failed to query price list: {}",
                        DisplayErrorContext(&e)
                    ))
                })?;

            price_list.extend(response.price_list().iter().cloned());

            match response.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(
            "Price list query with {} filters returned {} entries",
            filters.len(),
            price_list.len()
        );
        Ok(price_list)
    }
}
