//! Recommendation engine
//!
//! For each instance the aggregator prices the current class, then looks for
//! a Graviton equivalent and (when CPU peaks are low) a smaller class in the
//! same family, checks provisioned IOPS against observed IOPS and flags
//! instances without connections.
//!
//! ## Candidate selection
//!
//! Every resolver walks the catalog response in order and keeps the *last*
//! surviving candidate. Catalogs normally return a single match for these
//! filter sets; when they do not, response order decides.
//!
//! Entries priced in Aurora I/O-Optimized mode are skipped unless the
//! instance itself uses that mode.

pub mod connections;
pub mod cost;
pub mod graviton;
pub mod rightsizing;
pub mod storage;
pub mod types;

pub use rightsizing::{downscale_factor, downscale_targets, DownscaleFactor};
pub use types::{
    AnalyzedInstance, CurrentCost, InstancePricing, PricingQuery, Recommendation, SkuChoice,
    Suggestion,
};

use crate::catalog::{fields, sku, CatalogFilter, PriceCatalog, SkuRecord, StorageMode};
use crate::config::AnalysisContext;
use crate::engine::{
    engine_display_name, is_io_optimized, is_serverless_class, normalize_engine, DeploymentMode,
};
use crate::error::Result;
use crate::metrics::UtilizationSnapshot;
use crate::rds::InstanceProfile;
use tracing::{info, warn};

/// Filters shared by every lookup: region, engine and deployment
///
/// `None` when the engine has no catalog name, i.e. cannot be priced.
pub(crate) fn base_filters(
    ctx: &AnalysisContext,
    query: &PricingQuery<'_>,
) -> Option<Vec<CatalogFilter>> {
    let engine = engine_display_name(query.engine)?;
    Some(vec![
        CatalogFilter::term(fields::REGION_CODE, &ctx.region),
        CatalogFilter::term(fields::DATABASE_ENGINE, engine),
        CatalogFilter::term(fields::DEPLOYMENT_OPTION, query.deployment.as_catalog_value()),
    ])
}

/// Query the catalog and keep the last DB instance SKU accepted by `accept`
pub(crate) async fn last_matching_sku<F>(
    catalog: &dyn PriceCatalog,
    ctx: &AnalysisContext,
    filters: &[CatalogFilter],
    io_optimized: bool,
    accept: F,
) -> Result<Option<SkuRecord>>
where
    F: Fn(&SkuRecord) -> bool,
{
    let entries = catalog.get_products(&ctx.service_code, filters).await?;

    let mut selected = None;
    for entry in &entries {
        let Some(sku) = sku::extract(entry, &ctx.settings.arm_processor_marker)? else {
            continue;
        };
        if !io_optimized && sku.storage_mode == StorageMode::AuroraIoOptimized {
            continue;
        }
        if accept(&sku) {
            selected = Some(sku);
        }
    }
    Ok(selected)
}

/// Build the recommendation for one instance
///
/// Returns `Ok(None)` when the current class cannot be priced; that instance
/// is left out of the report. Serverless instances get a record with every
/// derived field unavailable and cost no catalog queries.
pub async fn recommend(
    catalog: &dyn PriceCatalog,
    ctx: &AnalysisContext,
    profile: &InstanceProfile,
    usage: &UtilizationSnapshot,
) -> Result<Option<Recommendation>> {
    if is_serverless_class(&profile.instance_class) {
        info!("{} is serverless, skipping class analysis", profile.id);
        return Ok(Some(Recommendation::serverless(profile)));
    }

    let query = PricingQuery {
        instance_type: &profile.instance_class,
        engine: normalize_engine(&profile.engine),
        deployment: DeploymentMode::from_multi_az(profile.multi_az),
        io_optimized: is_io_optimized(&profile.storage_type),
    };

    let Some(pricing) = cost::resolve_instance_cost(catalog, ctx, &query).await? else {
        warn!(
            "Unable to get pricing for {} ({} {})",
            profile.id, profile.instance_class, profile.engine
        );
        return Ok(None);
    };

    let monthly_cost = ctx.monthly(pricing.hourly_price);
    let hours = ctx.settings.hours_per_month;

    let arm = graviton::resolve_arm_equivalent(catalog, ctx, &query, &pricing).await?;
    let graviton = Suggestion::from_choice(query.instance_type, monthly_cost, &arm, hours);

    let scale_down = match downscale_factor(usage.cpu_utilization, &ctx.settings) {
        Some(factor) => {
            let smaller =
                rightsizing::resolve_downsize(catalog, ctx, &query, &pricing, factor).await?;
            Suggestion::from_choice(query.instance_type, monthly_cost, &smaller, hours)
        }
        None => Suggestion::NotApplicable,
    };

    Ok(Some(Recommendation {
        instance_id: profile.id.clone(),
        instance_type: profile.instance_class.clone(),
        current: Some(CurrentCost {
            vcpu: pricing.vcpu,
            memory_gib: pricing.memory_gib,
            hourly_price: pricing.hourly_price,
            monthly_cost,
        }),
        graviton,
        scale_down,
        io_savings: storage::io_savings(profile, usage, &ctx.settings),
        idle_instance: connections::idle_instance(profile, usage),
    }))
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Price-list document builder for unit tests

    use serde_json::{json, Value};

    pub struct EntryBuilder {
        instance_type: String,
        vcpu: u32,
        memory_gib: f64,
        price: f64,
        engine: String,
        deployment: String,
        region: String,
        processor: String,
        storage: String,
        family: String,
        current_generation: String,
    }

    /// A MySQL Single-AZ us-east-1 x86 DB instance SKU
    pub fn sku(instance_type: &str, vcpu: u32, memory_gib: f64, price: f64) -> EntryBuilder {
        EntryBuilder {
            instance_type: instance_type.to_string(),
            vcpu,
            memory_gib,
            price,
            engine: "MySQL".to_string(),
            deployment: "Single-AZ".to_string(),
            region: "us-east-1".to_string(),
            processor: "Intel Xeon Platinum 8259 (Cascade Lake)".to_string(),
            storage: "EBS Only".to_string(),
            family: "Database Instance".to_string(),
            current_generation: "Yes".to_string(),
        }
    }

    impl EntryBuilder {
        pub fn engine(mut self, engine: &str) -> Self {
            self.engine = engine.to_string();
            self
        }

        pub fn multi_az(mut self) -> Self {
            self.deployment = "Multi-AZ".to_string();
            self
        }

        pub fn arm(mut self) -> Self {
            self.processor = "AWS Graviton2".to_string();
            self
        }

        pub fn io_optimized(mut self) -> Self {
            self.storage = "Aurora IO Optimization Mode".to_string();
            self
        }

        pub fn family(mut self, family: &str) -> Self {
            self.family = family.to_string();
            self
        }

        pub fn previous_generation(mut self) -> Self {
            self.current_generation = "No".to_string();
            self
        }

        pub fn value(self) -> Value {
            let memory = if self.memory_gib.fract() == 0.0 {
                format!("{:.0} GiB", self.memory_gib)
            } else {
                format!("{} GiB", self.memory_gib)
            };
            let attributes = json!({
                "instanceType": self.instance_type,
                "vcpu": self.vcpu.to_string(),
                "memory": memory,
                "databaseEngine": self.engine,
                "deploymentOption": self.deployment,
                "regionCode": self.region,
                "physicalProcessor": self.processor,
                "storage": self.storage,
                "currentGeneration": self.current_generation,
            });
            json!({
                "serviceCode": "AmazonRDS",
                "product": {
                    "productFamily": self.family,
                    "attributes": attributes
                },
                "terms": {
                    "OnDemand": {
                        "SKU.JRTCKXETXF": {
                            "priceDimensions": {
                                "SKU.JRTCKXETXF.6YS6EN2CT7": {
                                    "unit": "Hrs",
                                    "pricePerUnit": { "USD": format!("{:.10}", self.price) }
                                }
                            }
                        }
                    }
                }
            })
        }

        pub fn raw(self) -> String {
            self.value().to_string()
        }
    }
}
