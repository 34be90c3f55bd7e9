//! Billing configuration (Stripe)

use serde::Deserialize;

use crate::domain::billing::{PlanTier, PriceTierMap};

use super::error::ValidationError;

/// Billing configuration (Stripe)
///
/// Price ids come from the Stripe dashboard, one per tier and billing
/// period. All six are optional: a deployment that only sells some
/// plans simply leaves the others unset, and unknown price ids seen
/// during reconciliation fall back to the Standard tier.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillingConfig {
    /// Stripe API key
    pub stripe_api_key: String,

    /// Stripe price ID for the Standard monthly plan
    pub standard_monthly_price_id: Option<String>,

    /// Stripe price ID for the Standard yearly plan
    pub standard_yearly_price_id: Option<String>,

    /// Stripe price ID for the Plus monthly plan
    pub plus_monthly_price_id: Option<String>,

    /// Stripe price ID for the Plus yearly plan
    pub plus_yearly_price_id: Option<String>,

    /// Stripe price ID for the Premium monthly plan
    pub premium_monthly_price_id: Option<String>,

    /// Stripe price ID for the Premium yearly plan
    pub premium_yearly_price_id: Option<String>,
}

impl BillingConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_live_")
    }

    /// Flatten the configured price ids into a lookup map.
    pub fn price_map(&self) -> PriceTierMap {
        let mut map = PriceTierMap::new();
        let entries = [
            (&self.standard_monthly_price_id, PlanTier::Standard),
            (&self.standard_yearly_price_id, PlanTier::Standard),
            (&self.plus_monthly_price_id, PlanTier::Plus),
            (&self.plus_yearly_price_id, PlanTier::Plus),
            (&self.premium_monthly_price_id, PlanTier::Premium),
            (&self.premium_yearly_price_id, PlanTier::Premium),
        ];
        for (price_id, tier) in entries {
            if let Some(price_id) = price_id {
                map.insert(price_id.clone(), tier);
            }
        }
        map
    }

    /// Validate billing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
        }

        // Verify key prefix for safety
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }

        Ok(())
    }
}
