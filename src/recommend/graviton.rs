//! Graviton (ARM) equivalent lookup

use super::{base_filters, last_matching_sku, PricingQuery};
use crate::catalog::{fields, memory_filter_value, Architecture, CatalogFilter, PriceCatalog};
use crate::config::AnalysisContext;
use crate::error::Result;
use crate::recommend::types::{InstancePricing, SkuChoice};
use tracing::{debug, info};

/// Find an ARM class with the same vCPU and memory as the current one
///
/// Falls back to the current class when the catalog offers no ARM SKU of
/// that shape.
pub async fn resolve_arm_equivalent(
    catalog: &dyn PriceCatalog,
    ctx: &AnalysisContext,
    query: &PricingQuery<'_>,
    current: &InstancePricing,
) -> Result<SkuChoice> {
    debug!(
        "Getting the Graviton details for {} ({} vCPU, {} GiB)",
        query.instance_type, current.vcpu, current.memory_gib
    );

    let unchanged = SkuChoice::unchanged(query.instance_type, current);
    let Some(mut filters) = base_filters(ctx, query) else {
        return Ok(unchanged);
    };
    filters.push(CatalogFilter::term(fields::VCPU, current.vcpu.to_string()));
    filters.push(CatalogFilter::term(
        fields::MEMORY,
        memory_filter_value(current.memory_gib),
    ));

    let sku = last_matching_sku(catalog, ctx, &filters, query.io_optimized, |sku| {
        sku.architecture == Architecture::Arm
    })
    .await?;

    match sku {
        Some(sku) => {
            info!(
                "Graviton equivalent of {} is {} at ${}/hr",
                query.instance_type, sku.instance_type, sku.hourly_price
            );
            Ok(SkuChoice {
                instance_type: sku.instance_type,
                vcpu: sku.vcpu,
                memory_gib: sku.memory_gib,
                hourly_price: sku.hourly_price,
            })
        }
        None => {
            info!("No Graviton equivalent for {}", query.instance_type);
            Ok(unchanged)
        }
    }
}
