//! Provisioned IOPS over-allocation check

use crate::config::AnalysisSettings;
use crate::engine::is_provisioned_iops;
use crate::metrics::UtilizationSnapshot;
use crate::rds::InstanceProfile;
use tracing::info;

/// Monthly savings from dropping provisioned IOPS, if they are over-allocated
///
/// Only provisioned-IOPS storage with both read and write IOPS observed is
/// considered. The instance is flagged when provisioned IOPS exceed the
/// observed read+write peak by more than the configured headroom.
pub fn io_savings(
    profile: &InstanceProfile,
    usage: &UtilizationSnapshot,
    settings: &AnalysisSettings,
) -> Option<f64> {
    if !is_provisioned_iops(&profile.storage_type) {
        return None;
    }
    let provisioned = f64::from(profile.provisioned_iops?);
    let observed = usage.read_iops.value()? + usage.write_iops.value()?;

    if provisioned > observed * settings.iops_headroom {
        let savings = provisioned * settings.iops_unit_cost;
        info!(
            "{}: {} provisioned IOPS vs {} observed, gp3 saves {:.2}/month",
            profile.id, provisioned, observed, savings
        );
        Some(savings)
    } else {
        None
    }
}
