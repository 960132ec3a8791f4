//! Input validation utilities
//!
//! All command-line input is checked before the first AWS call.

use crate::error::{Result, RightsizerError};
use regex::Regex;

/// Longest analysis period CloudWatch can serve at daily resolution
pub const MAX_PERIOD_DAYS: u32 = 455;

/// Instances selected for analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Instance(String),
    All,
}

/// Resolve `--name` / `--all` into a target; exactly one must be given
pub fn validate_target(name: Option<&str>, all: bool) -> Result<Target> {
    match (name, all) {
        (Some(_), true) => Err(RightsizerError::validation(
            "name",
            "Only instance name or --all can be provided, not both",
        )),
        (None, false) => Err(RightsizerError::validation(
            "name",
            "Either an instance name (--name) or --all is required",
        )),
        (Some(name), false) => {
            validate_instance_identifier(name)?;
            Ok(Target::Instance(name.to_string()))
        }
        (None, true) => Ok(Target::All),
    }
}

/// Validate a DB instance identifier
///
/// 1-63 letters, digits or hyphens; starts with a letter; no trailing or
/// doubled hyphen.
pub fn validate_instance_identifier(identifier: &str) -> Result<()> {
    if identifier.is_empty() || identifier.len() > 63 {
        return Err(RightsizerError::validation(
            "name",
            format!(
                "DB instance identifier must be 1-63 characters, got: {} (len: {})",
                identifier,
                identifier.len()
            ),
        ));
    }

    let valid = identifier.starts_with(|c: char| c.is_ascii_alphabetic())
        && identifier.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !identifier.ends_with('-')
        && !identifier.contains("--");
    if !valid {
        return Err(RightsizerError::validation(
            "name",
            format!(
                "DB instance identifier must start with a letter and contain only \
                 letters, digits and single hyphens, got: {}",
                identifier
            ),
        ));
    }
    Ok(())
}

/// Validate an AWS region code such as `us-east-1` or `us-gov-west-1`
pub fn validate_region(region: &str) -> Result<()> {
    let pattern = Regex::new(r"^[a-z]{2}(-[a-z]+)+-\d{1,2}$").map_err(|e| {
        RightsizerError::validation("region", format!("Invalid region pattern: {}", e))
    })?;
    if !pattern.is_match(region) {
        return Err(RightsizerError::validation(
            "region",
            format!("Expected a region code like 'us-east-1', got: {}", region),
        ));
    }
    Ok(())
}

/// Validate the analysis period in days
pub fn validate_period(days: u32) -> Result<()> {
    if days == 0 || days > MAX_PERIOD_DAYS {
        return Err(RightsizerError::validation(
            "period",
            format!("Period must be between 1 and {} days, got: {}", MAX_PERIOD_DAYS, days),
        ));
    }
    Ok(())
}
