//! rds-rightsizer library
//!
//! Cost-optimization recommendations for Amazon RDS instances: current
//! monthly cost, Graviton equivalents, CPU-driven downsizing, io1/io2 to gp3
//! storage savings and idle instances.

pub mod aws_utils;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod exit_codes;
pub mod metrics;
pub mod rds;
pub mod recommend;
pub mod report;
pub mod validation;
pub mod workflow;

// Re-export commonly used types
pub use config::{AnalysisContext, Config};
pub use error::{Result, RightsizerError};
pub use recommend::{AnalyzedInstance, Recommendation, Suggestion};
