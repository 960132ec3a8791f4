//! Current instance pricing

use super::{base_filters, last_matching_sku, PricingQuery};
use crate::catalog::{fields, CatalogFilter, PriceCatalog};
use crate::config::AnalysisContext;
use crate::error::Result;
use crate::recommend::types::InstancePricing;
use tracing::{debug, info};

/// Price the class an instance currently runs on
///
/// Returns `None` when the catalog has no matching SKU; the caller cannot
/// produce a recommendation for that instance.
pub async fn resolve_instance_cost(
    catalog: &dyn PriceCatalog,
    ctx: &AnalysisContext,
    query: &PricingQuery<'_>,
) -> Result<Option<InstancePricing>> {
    debug!(
        "Getting the details for {} {} {} io_optimized={}",
        query.instance_type, query.engine, query.deployment, query.io_optimized
    );

    let Some(mut filters) = base_filters(ctx, query) else {
        return Ok(None);
    };
    filters.push(CatalogFilter::term(fields::INSTANCE_TYPE, query.instance_type));

    let sku = last_matching_sku(catalog, ctx, &filters, query.io_optimized, |_| true).await?;

    Ok(sku.map(|sku| {
        info!(
            "{}: {} vCPU, {} GiB, ${}/hr",
            query.instance_type, sku.vcpu, sku.memory_gib, sku.hourly_price
        );
        InstancePricing {
            vcpu: sku.vcpu,
            memory_gib: sku.memory_gib,
            hourly_price: sku.hourly_price,
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MockPriceCatalog;
    use crate::config::Config;
    use crate::engine::DeploymentMode;
    use crate::recommend::test_support::sku;

    fn query() -> PricingQuery<'static> {
        PricingQuery {
            instance_type: "db.r5.xlarge",
            engine: "postgres",
            deployment: DeploymentMode::MultiAz,
            io_optimized: false,
        }
    }

    #[tokio::test]
    async fn test_filters_sent_to_catalog() {
        let mut catalog = MockPriceCatalog::new();
        catalog
            .expect_get_products()
            .withf(|service: &str, filters: &[CatalogFilter]| {
                service == "AmazonRDS"
                    && filters.to_vec()
                        == vec![
                            CatalogFilter::term("regionCode", "eu-west-1"),
                            CatalogFilter::term("databaseEngine", "PostgreSQL"),
                            CatalogFilter::term("deploymentOption", "Multi-AZ"),
                            CatalogFilter::term("instanceType", "db.r5.xlarge"),
                        ]
            })
            .times(1)
            .returning(|_, _| Ok(vec![sku("db.r5.xlarge", 4, 32.0, 1.0).raw()]));

        let ctx = AnalysisContext::new("eu-west-1", &Config::default());
        let pricing = resolve_instance_cost(&catalog, &ctx, &query())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pricing.vcpu, 4);
        assert_eq!(pricing.memory_gib, 32.0);
        assert_eq!(pricing.hourly_price, 1.0);
    }

    #[tokio::test]
    async fn test_unknown_engine_skips_catalog() {
        let mut catalog = MockPriceCatalog::new();
        catalog.expect_get_products().never();

        let ctx = AnalysisContext::new("eu-west-1", &Config::default());
        let mut q = query();
        q.engine = "neptune";
        assert!(resolve_instance_cost(&catalog, &ctx, &q).await.unwrap().is_none());
    }
}
