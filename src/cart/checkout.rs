//! Order summary and the call-to-order intent.
//!
//! There is no order submission: the customer calls the restaurant. The
//! summary only tells them what to expect on the phone.

use super::line::Money;
use super::promo::Promo;
use super::storage::KvStore;
use super::CartStore;
use crate::config::DeliveryConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FulfillmentMethod {
    #[default]
    Delivery,
    Pickup,
}

impl FulfillmentMethod {
    pub fn toggle(self) -> Self {
        match self {
            FulfillmentMethod::Delivery => FulfillmentMethod::Pickup,
            FulfillmentMethod::Pickup => FulfillmentMethod::Delivery,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FulfillmentMethod::Delivery => "Delivery",
            FulfillmentMethod::Pickup => "Pickup",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub item_count: u32,
    pub subtotal: Money,
    /// Applied promo code, if any.
    pub promo_code: Option<&'static str>,
    pub discount: Money,
    pub delivery_fee: Money,
    pub tax: Money,
    pub total: Money,
    /// Advisory only; ordering stays possible.
    pub meets_minimum: bool,
    /// Amount still missing to reach the minimum order.
    pub short_by: Money,
    /// Totals exclude market-priced lines and are estimates.
    pub is_estimate: bool,
}

impl OrderSummary {
    /// Promo discounts come off before tax. The minimum order is checked
    /// against the undiscounted subtotal.
    pub fn compute<S: KvStore>(
        cart: &CartStore<S>,
        delivery: &DeliveryConfig,
        method: FulfillmentMethod,
        promo: Option<&'static Promo>,
    ) -> Self {
        let subtotal = cart.subtotal();
        let minimum = Money::from_decimal(delivery.min_order).unwrap_or(Money::ZERO);
        let free_threshold =
            Money::from_decimal(delivery.free_delivery_threshold).unwrap_or(Money::ZERO);
        let discount = promo.map(|p| p.discount(subtotal)).unwrap_or(Money::ZERO);
        let waived = promo.is_some_and(|p| p.waives_delivery());

        let delivery_fee = match method {
            FulfillmentMethod::Pickup => Money::ZERO,
            FulfillmentMethod::Delivery if waived || subtotal >= free_threshold => Money::ZERO,
            FulfillmentMethod::Delivery => {
                Money::from_decimal(delivery.delivery_fee).unwrap_or(Money::ZERO)
            }
        };
        let discounted = Money(subtotal.cents().saturating_sub(discount.cents()));
        let tax = discounted.scale(delivery.tax_rate);

        Self {
            item_count: cart.item_count(),
            subtotal,
            promo_code: promo.map(|p| p.code),
            discount,
            delivery_fee,
            tax,
            total: discounted + delivery_fee + tax,
            meets_minimum: subtotal >= minimum,
            short_by: Money(minimum.cents().saturating_sub(subtotal.cents())),
            is_estimate: cart.has_market_priced_lines(),
        }
    }
}

/// `tel:` URI for the configured phone number, keeping only `+` and digits.
pub fn call_intent(phone: &str) -> String {
    let dialable: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    format!("tel:{}", dialable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::storage::MemoryStore;
    use crate::catalog::Catalog;
    use crate::haptics::NoHaptics;
    use std::sync::Arc;

    fn cart_with(entries: &[(&str, usize, u32)]) -> CartStore<MemoryStore> {
        let catalog = Catalog::bundled().unwrap();
        let mut cart = CartStore::new(MemoryStore::new(), "cart", Arc::new(NoHaptics));
        for (id, variant, qty) in entries {
            let item = catalog.item(id).unwrap();
            cart.add_line(item, &item.variants[*variant], *qty, None);
        }
        cart
    }

    #[test]
    fn test_call_intent() {
        assert_eq!(call_intent("+1-437-566-6989"), "tel:+14375666989");
        assert_eq!(call_intent("(705) 555 0101"), "tel:7055550101");
    }

    #[test]
    fn test_small_delivery_order() {
        let cart = cart_with(&[("spring-rolls", 0, 1)]);
        let summary = OrderSummary::compute(&cart, &DeliveryConfig::default(), FulfillmentMethod::Delivery, None);
        assert_eq!(summary.subtotal, Money(899));
        assert_eq!(summary.delivery_fee, Money(499));
        assert_eq!(summary.tax, Money(117));
        assert_eq!(summary.total, Money(899 + 499 + 117));
        assert!(!summary.meets_minimum);
        assert_eq!(summary.short_by, Money(2000 - 899));
        assert!(!summary.is_estimate);
    }

    #[test]
    fn test_free_delivery_and_pickup() {
        // 3 x 15.99 = 47.97
        let cart = cart_with(&[("manchurian-chicken", 0, 3)]);
        let delivery = OrderSummary::compute(&cart, &DeliveryConfig::default(), FulfillmentMethod::Delivery, None);
        assert_eq!(delivery.delivery_fee, Money::ZERO);
        assert!(delivery.meets_minimum);
        assert_eq!(delivery.short_by, Money::ZERO);

        let cart = cart_with(&[("mapo-tofu", 0, 2)]);
        let pickup = OrderSummary::compute(&cart, &DeliveryConfig::default(), FulfillmentMethod::Pickup, None);
        assert_eq!(pickup.delivery_fee, Money::ZERO);
        assert_eq!(pickup.total, pickup.subtotal + pickup.tax);
    }

    #[test]
    fn test_market_lines_make_estimate() {
        let cart = cart_with(&[("spring-rolls", 0, 1), ("ginger-scallion-lobster", 0, 1)]);
        let summary = OrderSummary::compute(&cart, &DeliveryConfig::default(), FulfillmentMethod::Delivery, None);
        assert!(summary.is_estimate);
        assert_eq!(summary.subtotal, Money(899));
        assert_eq!(summary.item_count, 2);
    }

    #[test]
    fn test_promo_discount_before_tax() {
        // 2 x 8.99 = 17.98, 10% off is 1.80
        let cart = cart_with(&[("spring-rolls", 0, 2)]);
        let promo = crate::cart::promo::lookup("welcome10");
        let summary = OrderSummary::compute(&cart, &DeliveryConfig::default(), FulfillmentMethod::Pickup, promo);
        assert_eq!(summary.promo_code, Some("WELCOME10"));
        assert_eq!(summary.subtotal, Money(1798));
        assert_eq!(summary.discount, Money(180));
        assert_eq!(summary.tax, Money(210));
        assert_eq!(summary.total, Money(1618 + 210));
        assert!(!summary.meets_minimum);
    }

    #[test]
    fn test_free_delivery_promo_waives_fee() {
        let cart = cart_with(&[("spring-rolls", 0, 1)]);
        let promo = crate::cart::promo::lookup("FREESHIP");
        let summary = OrderSummary::compute(&cart, &DeliveryConfig::default(), FulfillmentMethod::Delivery, promo);
        assert_eq!(summary.delivery_fee, Money::ZERO);
        assert_eq!(summary.discount, Money::ZERO);
        assert_eq!(summary.total, Money(899 + 117));
    }
}
