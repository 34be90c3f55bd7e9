//! Price-id to plan-tier mapping.

use std::collections::HashMap;

use super::PlanTier;

/// Maps billing-provider price identifiers to plan tiers.
///
/// The mapping table is maintained externally (the provider dashboard is
/// the source of truth for price ids) and injected at construction.
/// Unmapped price ids resolve to [`PlanTier::Standard`]: unknown products
/// degrade gracefully rather than failing a whole reconciliation batch.
#[derive(Debug, Clone, Default)]
pub struct PriceTierMap {
    entries: HashMap<String, PlanTier>,
}

impl PriceTierMap {
    /// Creates an empty map; every price id resolves to Standard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from `(price_id, tier)` pairs.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, PlanTier)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(id, tier)| (id.into(), tier))
                .collect(),
        }
    }

    /// Registers a price id for a tier.
    pub fn insert(&mut self, price_id: impl Into<String>, tier: PlanTier) {
        self.entries.insert(price_id.into(), tier);
    }

    /// Resolves a price id to its tier, defaulting to Standard.
    pub fn tier_for(&self, price_id: &str) -> PlanTier {
        self.entries
            .get(price_id)
            .copied()
            .unwrap_or(PlanTier::Standard)
    }

    /// Number of known price ids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no price ids are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_price_id_resolves_to_its_tier() {
        let map = PriceTierMap::from_entries([
            ("price_plus_monthly", PlanTier::Plus),
            ("price_premium_yearly", PlanTier::Premium),
        ]);

        assert_eq!(map.tier_for("price_plus_monthly"), PlanTier::Plus);
        assert_eq!(map.tier_for("price_premium_yearly"), PlanTier::Premium);
    }

    #[test]
    fn insert_registers_price_id() {
        let mut map = PriceTierMap::new();
        map.insert("price_x", PlanTier::Plus);
        assert_eq!(map.tier_for("price_x"), PlanTier::Plus);
        assert_eq!(map.len(), 1);
    }

    proptest! {
        #[test]
        fn unknown_price_ids_default_to_standard(id in "[a-z_0-9]{1,40}") {
            let map = PriceTierMap::from_entries([("price_plus_monthly", PlanTier::Plus)]);
            prop_assume!(id != "price_plus_monthly");
            prop_assert_eq!(map.tier_for(&id), PlanTier::Standard);
        }
    }
}
