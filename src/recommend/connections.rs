//! Idle instance detection

use crate::metrics::{MetricValue, UtilizationSnapshot};
use crate::rds::InstanceProfile;

/// The instance id when not a single connection was observed in the window
pub fn idle_instance(profile: &InstanceProfile, usage: &UtilizationSnapshot) -> Option<String> {
    match usage.database_connections {
        MetricValue::Value(peak) if peak == 0.0 => Some(profile.id.clone()),
        _ => None,
    }
}
