//! Downsizing within the same instance family
//!
//! Low peak CPU selects a downscale factor; the target shape is the current
//! vCPU and memory divided by that factor, never below the smallest
//! current-generation vCPU count. Candidates must share the current class's
//! family prefix (`db.r5` for `db.r5.xlarge`), so a downsize never changes
//! architecture or tier.

use super::{base_filters, last_matching_sku, PricingQuery};
use crate::catalog::{fields, memory_filter_value, CatalogFilter, PriceCatalog};
use crate::config::{AnalysisContext, AnalysisSettings};
use crate::engine::{engine_edition, family_prefix};
use crate::error::Result;
use crate::metrics::MetricValue;
use crate::recommend::types::{InstancePricing, SkuChoice};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DownscaleFactor {
    Half,
    Quarter,
}

impl DownscaleFactor {
    pub fn divisor(&self) -> u32 {
        match self {
            DownscaleFactor::Half => 2,
            DownscaleFactor::Quarter => 4,
        }
    }
}

/// Pick a downscale factor from peak CPU utilization
///
/// No attempt is made without CPU data.
pub fn downscale_factor(
    max_cpu: MetricValue,
    settings: &AnalysisSettings,
) -> Option<DownscaleFactor> {
    let cpu = max_cpu.value()?;
    if cpu <= settings.quarter_scale_cpu_threshold {
        Some(DownscaleFactor::Quarter)
    } else if cpu <= settings.half_scale_cpu_threshold {
        Some(DownscaleFactor::Half)
    } else {
        None
    }
}

/// Target vCPU and memory (GiB) for a downscale
pub fn downscale_targets(
    vcpu: u32,
    memory_gib: f64,
    factor: DownscaleFactor,
    min_vcpu: u32,
) -> (u32, u64) {
    let divisor = factor.divisor();
    let target_vcpu = (vcpu / divisor).max(min_vcpu);
    let target_memory = (memory_gib / f64::from(divisor)).floor().max(0.0) as u64;
    (target_vcpu, target_memory)
}

/// Find a smaller class in the same family
///
/// Falls back to the current class when no candidate matches.
pub async fn resolve_downsize(
    catalog: &dyn PriceCatalog,
    ctx: &AnalysisContext,
    query: &PricingQuery<'_>,
    current: &InstancePricing,
    factor: DownscaleFactor,
) -> Result<SkuChoice> {
    let unchanged = SkuChoice::unchanged(query.instance_type, current);
    let (target_vcpu, target_memory) =
        downscale_targets(current.vcpu, current.memory_gib, factor, ctx.settings.min_vcpu);

    debug!(
        "Getting the downsize details for {}: {} vCPU / {} GiB -> {} vCPU / {} GiB ({:?})",
        query.instance_type, current.vcpu, current.memory_gib, target_vcpu, target_memory, factor
    );

    if target_memory == 0 {
        return Ok(unchanged);
    }
    let Some(mut filters) = base_filters(ctx, query) else {
        return Ok(unchanged);
    };
    filters.push(CatalogFilter::term(fields::VCPU, target_vcpu.to_string()));
    filters.push(CatalogFilter::term(
        fields::MEMORY,
        memory_filter_value(target_memory as f64),
    ));
    filters.push(CatalogFilter::term(fields::CURRENT_GENERATION, "yes"));
    if let Some(edition) = engine_edition(query.engine) {
        filters.push(CatalogFilter::term(fields::DATABASE_EDITION, edition));
    }

    let prefix = family_prefix(query.instance_type);
    let sku = last_matching_sku(catalog, ctx, &filters, query.io_optimized, |sku| {
        family_prefix(&sku.instance_type) == prefix
    })
    .await?;

    match sku {
        Some(sku) => {
            info!(
                "Downsize candidate for {} is {} at ${}/hr",
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
            info!("No downsize candidate in family {}", prefix);
            Ok(unchanged)
        }
    }
}
