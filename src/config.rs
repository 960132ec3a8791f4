use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

const LOCAL_CONFIG: &str = ".rds-rightsizer.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub aws: AwsConfig,
    pub analysis: AnalysisSettings,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    /// The Price List API is only served from a handful of regions
    pub pricing_region: String,
    pub service_code: String,
}

/// Tunables for the recommendation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Flat month used to turn hourly prices into monthly cost
    pub hours_per_month: f64,
    /// Monthly price of one provisioned IOPS unit
    pub iops_unit_cost: f64,
    /// Provisioned IOPS must exceed observed peak by this factor to be flagged
    pub iops_headroom: f64,
    /// Max CPU at or below this triggers a 4x downscale attempt
    pub quarter_scale_cpu_threshold: f64,
    /// Max CPU at or below this (and above the quarter threshold) triggers 2x
    pub half_scale_cpu_threshold: f64,
    /// Smallest vCPU count offered by current-generation classes
    pub min_vcpu: u32,
    /// Substring of the `physicalProcessor` attribute that marks ARM SKUs
    pub arm_processor_marker: String,
    pub default_period_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub path: PathBuf,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            pricing_region: "us-east-1".to_string(),
            service_code: "AmazonRDS".to_string(),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            hours_per_month: 730.0,
            iops_unit_cost: 0.20,
            iops_headroom: 1.2,
            quarter_scale_cpu_threshold: 20.0,
            half_scale_cpu_threshold: 40.0,
            min_vcpu: 2,
            arm_processor_marker: "AWS Graviton".to_string(),
            default_period_days: 14,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("costOptimizer.csv"),
        }
    }
}

impl AnalysisSettings {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !(self.hours_per_month > 0.0) {
            return Err(invalid("analysis.hours_per_month", "must be positive"));
        }
        if !(self.iops_unit_cost >= 0.0) {
            return Err(invalid("analysis.iops_unit_cost", "must not be negative"));
        }
        if !(self.iops_headroom >= 1.0) {
            return Err(invalid("analysis.iops_headroom", "must be at least 1.0"));
        }
        let quarter = self.quarter_scale_cpu_threshold;
        let half = self.half_scale_cpu_threshold;
        if !(0.0..=100.0).contains(&quarter) || !(0.0..=100.0).contains(&half) || quarter > half {
            return Err(invalid(
                "analysis.quarter_scale_cpu_threshold",
                "thresholds must satisfy 0 <= quarter <= half <= 100",
            ));
        }
        if self.min_vcpu == 0 {
            return Err(invalid("analysis.min_vcpu", "must be at least 1"));
        }
        if self.arm_processor_marker.trim().is_empty() {
            return Err(ConfigError::MissingField(
                "analysis.arm_processor_marker".to_string(),
            ));
        }
        if self.default_period_days == 0 {
            return Err(invalid("analysis.default_period_days", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            let local = PathBuf::from(LOCAL_CONFIG);
            if local.exists() {
                local
            } else {
                dirs::config_dir()
                    .map(|d| d.join("rds-rightsizer").join("config.toml"))
                    .unwrap_or(local)
            }
        };

        if !config_path.exists() {
            if path.is_some() {
                warn!(
                    "Config file not found: {}, using defaults",
                    config_path.display()
                );
            }
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.aws.pricing_region.trim().is_empty() {
            return Err(ConfigError::MissingField("aws.pricing_region".to_string()));
        }
        if self.aws.service_code.trim().is_empty() {
            return Err(ConfigError::MissingField("aws.service_code".to_string()));
        }
        self.analysis.validate()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

pub fn init_config(output: &Path) -> Result<()> {
    Config::default().save(output)?;
    println!("Created config file: {}", output.display());
    Ok(())
}

/// Run parameters handed to every resolver call
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    /// Region the analysed instances live in (the catalog `regionCode`)
    pub region: String,
    pub service_code: String,
    pub settings: AnalysisSettings,
}

impl AnalysisContext {
    pub fn new(region: impl Into<String>, config: &Config) -> Self {
        Self {
            region: region.into(),
            service_code: config.aws.service_code.clone(),
            settings: config.analysis.clone(),
        }
    }

    pub fn monthly(&self, hourly_price: f64) -> f64 {
        hourly_price * self.settings.hours_per_month
    }
}
