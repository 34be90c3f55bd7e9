//! Plan tier and billing period definitions.
//!
//! Represents the subscription plan levels offered on CoveTalks.

use serde::{Deserialize, Serialize};

/// Subscription plan tier.
///
/// Derived from the billing provider's price identifier during
/// reconciliation. Determines listing visibility and feature access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    /// Entry-level plan, and the fallback for unrecognized price ids.
    Standard,

    /// Mid-level plan with enhanced profile placement.
    Plus,

    /// Top plan with featured placement and priority support.
    Premium,
}

impl PlanTier {
    /// Returns the display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            PlanTier::Standard => "Standard",
            PlanTier::Plus => "Plus",
            PlanTier::Premium => "Premium",
        }
    }

    /// Returns the numeric rank of this tier for comparison.
    ///
    /// Higher rank = more features.
    pub fn rank(&self) -> u8 {
        match self {
            PlanTier::Standard => 0,
            PlanTier::Plus => 1,
            PlanTier::Premium => 2,
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// How often a subscription renews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    /// Renews every month.
    Monthly,

    /// Renews every year.
    Yearly,
}

impl BillingPeriod {
    /// Returns the display name for this period.
    pub fn display_name(&self) -> &'static str {
        match self {
            BillingPeriod::Monthly => "Monthly",
            BillingPeriod::Yearly => "Yearly",
        }
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_ranks_are_ordered() {
        assert!(PlanTier::Standard.rank() < PlanTier::Plus.rank());
        assert!(PlanTier::Plus.rank() < PlanTier::Premium.rank());
    }

    #[test]
    fn tier_serializes_lowercase() {
        let json = serde_json::to_string(&PlanTier::Plus).unwrap();
        assert_eq!(json, "\"plus\"");
    }

    #[test]
    fn tier_deserializes_from_lowercase() {
        let tier: PlanTier = serde_json::from_str("\"premium\"").unwrap();
        assert_eq!(tier, PlanTier::Premium);
    }

    #[test]
    fn period_serializes_lowercase() {
        let json = serde_json::to_string(&BillingPeriod::Yearly).unwrap();
        assert_eq!(json, "\"yearly\"");
    }
}
