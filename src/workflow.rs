//! The `analyze` command
//!
//! Collects instance profiles, pulls utilization, asks the engine for a
//! recommendation per instance, then writes the CSV report and prints a
//! summary. Any AWS failure aborts the whole run.

use crate::aws_utils::load_sdk_config;
use crate::catalog::{AwsPricingCatalog, FileCatalog, PriceCatalog};
use crate::config::{AnalysisContext, Config};
use crate::engine::is_excluded_engine;
use crate::error::Result;
use crate::metrics::{AnalysisWindow, CloudWatchMetrics, MetricsSource};
use crate::rds::{InstanceDirectory, InstanceProfile, RdsInstanceDirectory};
use crate::recommend::{recommend, AnalyzedInstance};
use crate::report;
use crate::validation::{validate_period, validate_region, validate_target, Target};
use chrono::Utc;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// DB instance identifier to analyze
    #[arg(short, long, value_name = "DB_INSTANCE")]
    pub name: Option<String>,

    /// Analyze every DB instance in the region
    #[arg(short, long)]
    pub all: bool,

    /// AWS region of the instances
    #[arg(short, long, env = "AWS_REGION")]
    pub region: String,

    /// Days of CloudWatch history to inspect (default from config, 14)
    #[arg(short, long, value_name = "DAYS")]
    pub period: Option<u32>,

    /// Read prices from a saved price-list JSON file instead of the Price List API
    #[arg(long, value_name = "FILE")]
    pub pricing_file: Option<PathBuf>,

    /// CSV report path (default from config, costOptimizer.csv)
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

fn progress_bar(len: usize, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

/// Analyze the targeted instances
///
/// DocumentDB instances share the RDS API but not its price list and are
/// skipped, as are instances whose current class cannot be priced.
pub async fn analyze(
    directory: &dyn InstanceDirectory,
    metrics: &dyn MetricsSource,
    catalog: &dyn PriceCatalog,
    ctx: &AnalysisContext,
    target: &Target,
    window: &AnalysisWindow,
    show_progress: bool,
) -> Result<Vec<AnalyzedInstance>> {
    let profiles: Vec<InstanceProfile> = match target {
        Target::Instance(id) => vec![directory.describe(id).await?],
        Target::All => directory.list_all().await?,
    };
    info!("Analyzing {} DB instance(s) in {}", profiles.len(), ctx.region);

    let pb = progress_bar(profiles.len(), show_progress);
    let mut analyzed = Vec::with_capacity(profiles.len());

    for profile in profiles {
        pb.set_message(profile.id.clone());
        if is_excluded_engine(&profile.engine) {
            debug!("Skipping {} ({})", profile.id, profile.engine);
            pb.inc(1);
            continue;
        }

        let usage = metrics.utilization(&profile.id, window).await?;
        if let Some(recommendation) = recommend(catalog, ctx, &profile, &usage).await? {
            analyzed.push(AnalyzedInstance {
                profile,
                usage,
                recommendation,
            });
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(analyzed)
}

pub async fn handle_analyze(args: AnalyzeArgs, config: &Config, output_format: &str) -> Result<()> {
    let target = validate_target(args.name.as_deref(), args.all)?;
    validate_region(&args.region)?;
    let period = args.period.unwrap_or(config.analysis.default_period_days);
    validate_period(period)?;

    let ctx = AnalysisContext::new(args.region.as_str(), config);
    let window = AnalysisWindow::ending_at(Utc::now(), period);
    debug!(
        "Analysis window {} .. {} (period {}s)",
        window.start, window.end, window.period_secs
    );

    let sdk_config = load_sdk_config(&args.region).await;
    let directory = RdsInstanceDirectory::new(&sdk_config);
    let metrics = CloudWatchMetrics::new(&sdk_config);

    let catalog: Box<dyn PriceCatalog> = match &args.pricing_file {
        Some(path) => {
            info!("Using price list file {}", path.display());
            Box::new(FileCatalog::load(path)?)
        }
        None => {
            let pricing_config = load_sdk_config(&config.aws.pricing_region).await;
            Box::new(AwsPricingCatalog::new(&pricing_config))
        }
    };

    let json = output_format == "json";
    let analyzed = analyze(
        &directory,
        &metrics,
        catalog.as_ref(),
        &ctx,
        &target,
        &window,
        !json,
    )
    .await?;

    let report_path = args.report.unwrap_or_else(|| config.report.path.clone());
    report::write_csv_file(&report_path, &analyzed)?;
    info!("Wrote {} record(s) to {}", analyzed.len(), report_path.display());

    if json {
        report::print_json(&analyzed)?;
    } else {
        report::print_summary(&analyzed, &report_path);
    }
    Ok(())
}
