//! Stripe API wire types.
//!
//! These types represent Stripe objects as returned by the REST API and
//! convert into the provider-agnostic port types. Only the fields the
//! reconciliation workflow reads are modeled; everything else in the
//! payload is ignored.

use serde::Deserialize;

use crate::ports::{
    LatestInvoice, ProviderCharge, ProviderChargeStatus, ProviderInvoice, ProviderInvoiceStatus,
    ProviderSubscription, ProviderSubscriptionStatus, RecurringInterval,
};

/// Paginated list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeList<T> {
    pub data: Vec<T>,

    #[serde(default)]
    pub has_more: bool,
}

/// A field that may arrive as a bare id or as the expanded object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StripeExpandable<T> {
    Object(T),
    Id(String),
}

/// Stripe Subscription object.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscription {
    /// Subscription id (sub_...).
    pub id: String,

    /// Raw status string (active, past_due, ...).
    pub status: String,

    /// Subscription items; the first item's price drives tier mapping.
    pub items: StripeList<StripeSubscriptionItem>,

    /// Unix timestamp of creation.
    pub created: i64,

    /// Unix timestamp of cancellation, if cancelled.
    pub canceled_at: Option<i64>,

    /// End of the current billing period.
    #[serde(default)]
    pub current_period_end: i64,

    /// Most recent invoice, as id or expanded object.
    pub latest_invoice: Option<StripeExpandable<StripeInvoice>>,
}

/// Stripe subscription item.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscriptionItem {
    pub price: StripePrice,
}

/// Stripe Price object (the parts we read).
#[derive(Debug, Clone, Deserialize)]
pub struct StripePrice {
    pub id: String,

    pub unit_amount: Option<i64>,

    pub recurring: Option<StripeRecurring>,
}

/// Recurrence settings of a price.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeRecurring {
    pub interval: String,
}

/// Stripe Invoice object (the parts we read).
#[derive(Debug, Clone, Deserialize)]
pub struct StripeInvoice {
    /// Invoice id (in_...).
    pub id: String,

    /// Payment intent id once a charge exists.
    pub payment_intent: Option<String>,

    /// Amount actually paid, in minor units.
    #[serde(default)]
    pub amount_paid: i64,

    /// Raw status string (draft, open, paid, ...).
    pub status: Option<String>,

    /// Hosted invoice page.
    pub hosted_invoice_url: Option<String>,

    /// Human-readable invoice number.
    pub number: Option<String>,

    /// Unix timestamp of creation.
    pub created: i64,
}

/// Stripe Charge object (the parts we read).
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCharge {
    /// Charge id (ch_...).
    pub id: String,

    /// Raw status string (succeeded, pending, failed).
    pub status: String,

    /// Invoice id this charge settled, if any.
    pub invoice: Option<String>,

    /// Payment intent id; absent on legacy charges.
    pub payment_intent: Option<String>,

    /// Charge amount in minor units.
    pub amount: i64,

    /// Statement description.
    pub description: Option<String>,

    /// Unix timestamp of creation.
    pub created: i64,
}

impl From<StripeSubscription> for ProviderSubscription {
    fn from(sub: StripeSubscription) -> Self {
        let price = sub.items.data.into_iter().next().map(|item| item.price);

        let (price_id, unit_amount, interval) = match price {
            Some(price) => (
                price.id,
                price.unit_amount.unwrap_or(0),
                price
                    .recurring
                    .map(|r| RecurringInterval::parse(&r.interval))
                    .unwrap_or(RecurringInterval::Month),
            ),
            None => (String::new(), 0, RecurringInterval::Month),
        };

        ProviderSubscription {
            id: sub.id,
            status: ProviderSubscriptionStatus::parse(&sub.status),
            price_id,
            unit_amount,
            interval,
            created: sub.created,
            canceled_at: sub.canceled_at,
            current_period_end: sub.current_period_end,
            latest_invoice: sub.latest_invoice.map(|latest| match latest {
                StripeExpandable::Id(id) => LatestInvoice::Reference(id),
                StripeExpandable::Object(invoice) => {
                    LatestInvoice::Expanded(Box::new(invoice.into()))
                }
            }),
        }
    }
}

impl From<StripeInvoice> for ProviderInvoice {
    fn from(invoice: StripeInvoice) -> Self {
        ProviderInvoice {
            id: invoice.id,
            payment_intent: invoice.payment_intent,
            amount_paid: invoice.amount_paid,
            status: invoice
                .status
                .as_deref()
                .map(ProviderInvoiceStatus::parse)
                .unwrap_or(ProviderInvoiceStatus::Unknown),
            hosted_invoice_url: invoice.hosted_invoice_url,
            number: invoice.number,
            created: invoice.created,
        }
    }
}

impl From<StripeCharge> for ProviderCharge {
    fn from(charge: StripeCharge) -> Self {
        ProviderCharge {
            id: charge.id,
            status: ProviderChargeStatus::parse(&charge.status),
            invoice: charge.invoice,
            payment_intent: charge.payment_intent,
            amount: charge.amount,
            description: charge.description,
            created: charge.created,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_parses_and_converts() {
        let json = r#"{
            "id": "sub_123",
            "status": "active",
            "items": {
                "data": [
                    {"price": {"id": "price_plus_yearly", "unit_amount": 149700, "recurring": {"interval": "year"}}}
                ],
                "has_more": false
            },
            "created": 1704067200,
            "canceled_at": null,
            "current_period_end": 1735689600,
            "latest_invoice": "in_123"
        }"#;

        let sub: StripeSubscription = serde_json::from_str(json).unwrap();
        let provider: ProviderSubscription = sub.into();

        assert_eq!(provider.id, "sub_123");
        assert_eq!(provider.status, ProviderSubscriptionStatus::Active);
        assert_eq!(provider.price_id, "price_plus_yearly");
        assert_eq!(provider.unit_amount, 149700);
        assert_eq!(provider.interval, RecurringInterval::Year);
        assert!(matches!(
            provider.latest_invoice,
            Some(LatestInvoice::Reference(ref id)) if id == "in_123"
        ));
    }

    #[test]
    fn expanded_latest_invoice_converts_to_object() {
        let json = r#"{
            "id": "sub_123",
            "status": "active",
            "items": {"data": [{"price": {"id": "price_x", "unit_amount": 2900, "recurring": {"interval": "month"}}}]},
            "created": 1704067200,
            "canceled_at": null,
            "current_period_end": 1706745600,
            "latest_invoice": {
                "id": "in_9",
                "payment_intent": "pi_9",
                "amount_paid": 2900,
                "status": "paid",
                "hosted_invoice_url": null,
                "number": "CT-0009",
                "created": 1704067260
            }
        }"#;

        let sub: StripeSubscription = serde_json::from_str(json).unwrap();
        let provider: ProviderSubscription = sub.into();

        match provider.latest_invoice {
            Some(LatestInvoice::Expanded(invoice)) => {
                assert_eq!(invoice.id, "in_9");
                assert_eq!(invoice.status, ProviderInvoiceStatus::Paid);
            }
            other => panic!("expected expanded invoice, got {:?}", other),
        }
    }

    #[test]
    fn subscription_without_items_converts_defensively() {
        let json = r#"{
            "id": "sub_empty",
            "status": "incomplete",
            "items": {"data": []},
            "created": 1704067200,
            "canceled_at": null,
            "latest_invoice": null
        }"#;

        let sub: StripeSubscription = serde_json::from_str(json).unwrap();
        let provider: ProviderSubscription = sub.into();

        assert_eq!(provider.price_id, "");
        assert_eq!(provider.unit_amount, 0);
        assert_eq!(provider.interval, RecurringInterval::Month);
    }

    #[test]
    fn charge_parses_and_converts() {
        let json = r#"{
            "id": "ch_1",
            "status": "succeeded",
            "invoice": "in_1",
            "payment_intent": "pi_1",
            "amount": 14900,
            "description": "CoveTalks Plus",
            "created": 1704070000
        }"#;

        let charge: StripeCharge = serde_json::from_str(json).unwrap();
        let provider: ProviderCharge = charge.into();

        assert_eq!(provider.status, ProviderChargeStatus::Succeeded);
        assert_eq!(provider.invoice.as_deref(), Some("in_1"));
    }

    #[test]
    fn invoice_without_status_converts_to_unknown() {
        let json = r#"{
            "id": "in_1",
            "payment_intent": null,
            "amount_paid": 0,
            "status": null,
            "hosted_invoice_url": null,
            "number": null,
            "created": 1704067200
        }"#;

        let invoice: StripeInvoice = serde_json::from_str(json).unwrap();
        let provider: ProviderInvoice = invoice.into();
        assert_eq!(provider.status, ProviderInvoiceStatus::Unknown);
    }

    #[test]
    fn list_envelope_parses() {
        let json = r#"{"data": [], "has_more": true}"#;
        let list: StripeList<StripeCharge> = serde_json::from_str(json).unwrap();
        assert!(list.data.is_empty());
        assert!(list.has_more);
    }
}
