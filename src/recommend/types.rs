//! Recommendation records
//!
//! A `Recommendation` is built once per instance and never mutated.

use crate::engine::DeploymentMode;
use crate::metrics::UtilizationSnapshot;
use crate::rds::InstanceProfile;
use serde::Serialize;

/// Lookup key for pricing an instance class
#[derive(Debug, Clone, Copy)]
pub struct PricingQuery<'a> {
    pub instance_type: &'a str,
    /// Normalized RDS engine identifier (e.g. `aurora-mysql`)
    pub engine: &'a str,
    pub deployment: DeploymentMode,
    /// Include Aurora I/O-Optimized SKUs; they are skipped otherwise
    pub io_optimized: bool,
}

/// Capacity and price of the class an instance runs on today
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InstancePricing {
    pub vcpu: u32,
    pub memory_gib: f64,
    pub hourly_price: f64,
}

/// Outcome of an alternative-SKU search
///
/// Resolvers return the current class unchanged when nothing better exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkuChoice {
    pub instance_type: String,
    pub vcpu: u32,
    pub memory_gib: f64,
    pub hourly_price: f64,
}

impl SkuChoice {
    pub fn unchanged(instance_type: &str, pricing: &InstancePricing) -> Self {
        Self {
            instance_type: instance_type.to_string(),
            vcpu: pricing.vcpu,
            memory_gib: pricing.memory_gib,
            hourly_price: pricing.hourly_price,
        }
    }

    pub fn is_unchanged(&self, instance_type: &str) -> bool {
        self.instance_type == instance_type
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrentCost {
    pub vcpu: u32,
    pub memory_gib: f64,
    pub hourly_price: f64,
    pub monthly_cost: f64,
}

/// A suggested instance class change
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Suggestion {
    /// Not evaluated at all (serverless instances)
    Unavailable,
    /// Evaluated, no cheaper class found
    NotApplicable,
    Switch {
        instance_type: String,
        monthly_savings: f64,
    },
}

impl Suggestion {
    /// Compare a resolver outcome with the current class
    pub fn from_choice(
        current_type: &str,
        current_monthly: f64,
        choice: &SkuChoice,
        hours_per_month: f64,
    ) -> Self {
        if choice.is_unchanged(current_type) {
            Suggestion::NotApplicable
        } else {
            Suggestion::Switch {
                instance_type: choice.instance_type.clone(),
                monthly_savings: current_monthly - choice.hourly_price * hours_per_month,
            }
        }
    }

    pub fn monthly_savings(&self) -> Option<f64> {
        match self {
            Suggestion::Switch {
                monthly_savings, ..
            } => Some(*monthly_savings),
            _ => None,
        }
    }

    pub fn instance_type(&self) -> Option<&str> {
        match self {
            Suggestion::Switch { instance_type, .. } => Some(instance_type),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub instance_id: String,
    pub instance_type: String,
    /// `None` for serverless instances
    pub current: Option<CurrentCost>,
    pub graviton: Suggestion,
    pub scale_down: Suggestion,
    /// Monthly savings from moving provisioned-IOPS storage to gp3
    pub io_savings: Option<f64>,
    /// Set to the instance id when no connections were observed
    pub idle_instance: Option<String>,
}

impl Recommendation {
    pub fn serverless(profile: &InstanceProfile) -> Self {
        Self {
            instance_id: profile.id.clone(),
            instance_type: profile.instance_class.clone(),
            current: None,
            graviton: Suggestion::Unavailable,
            scale_down: Suggestion::Unavailable,
            io_savings: None,
            idle_instance: None,
        }
    }

    /// Best achievable monthly saving: the larger class change plus storage
    pub fn potential_savings(&self) -> f64 {
        let class_change = self
            .graviton
            .monthly_savings()
            .into_iter()
            .chain(self.scale_down.monthly_savings())
            .fold(0.0_f64, f64::max);
        class_change + self.io_savings.unwrap_or(0.0)
    }
}

/// One report row: inputs and the derived recommendation
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedInstance {
    pub profile: InstanceProfile,
    pub usage: UtilizationSnapshot,
    pub recommendation: Recommendation,
}
