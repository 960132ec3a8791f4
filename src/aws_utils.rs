//! Shared AWS SDK setup
//!
//! Failed API calls are not retried: the SDK's default retry strategy is
//! disabled so a failure surfaces immediately and aborts the run.

use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::debug;

/// Load credentials and settings for `region` with retries disabled
pub async fn load_sdk_config(region: &str) -> SdkConfig {
    debug!("Loading AWS configuration for {}", region);
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .retry_config(RetryConfig::disabled())
        .load()
        .await
}
