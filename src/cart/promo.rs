//! Promo codes.
//!
//! A fixed table; codes match case-insensitively and never stack. The
//! discount comes off the subtotal before tax. A free-delivery code waives
//! the fee instead.

use super::line::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoKind {
    /// Whole percent off the subtotal.
    Percentage(u32),
    /// Flat amount off once the subtotal reaches `min_subtotal`.
    Fixed { amount: Money, min_subtotal: Money },
    FreeDelivery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promo {
    pub code: &'static str,
    pub kind: PromoKind,
    pub description: &'static str,
}

pub const PROMO_CODES: &[Promo] = &[
    Promo {
        code: "WELCOME10",
        kind: PromoKind::Percentage(10),
        description: "10% off your first order",
    },
    Promo {
        code: "SAVE5",
        kind: PromoKind::Fixed {
            amount: Money(500),
            min_subtotal: Money(2500),
        },
        description: "$5 off orders over $25",
    },
    Promo {
        code: "FREESHIP",
        kind: PromoKind::FreeDelivery,
        description: "Free delivery on any order",
    },
    Promo {
        code: "STUDENT15",
        kind: PromoKind::Percentage(15),
        description: "15% student discount",
    },
];

/// Find a code, ignoring case and surrounding whitespace.
pub fn lookup(code: &str) -> Option<&'static Promo> {
    let code = code.trim();
    PROMO_CODES
        .iter()
        .find(|promo| promo.code.eq_ignore_ascii_case(code))
}

impl Promo {
    /// Amount taken off `subtotal`, never more than the subtotal itself.
    pub fn discount(&self, subtotal: Money) -> Money {
        let off = match self.kind {
            PromoKind::Percentage(percent) => subtotal.scale(percent as f64 / 100.0),
            PromoKind::Fixed {
                amount,
                min_subtotal,
            } if subtotal >= min_subtotal => amount,
            PromoKind::Fixed { .. } | PromoKind::FreeDelivery => Money::ZERO,
        };
        Money(off.cents().min(subtotal.cents()))
    }

    pub fn waives_delivery(&self) -> bool {
        self.kind == PromoKind::FreeDelivery
    }

    /// Short label for the summary row.
    pub fn label(&self) -> String {
        match self.kind {
            PromoKind::Percentage(percent) => format!("{}% off", percent),
            PromoKind::Fixed { amount, .. } => format!("{} off", amount),
            PromoKind::FreeDelivery => "Free delivery".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        assert_eq!(lookup("welcome10").map(|p| p.code), Some("WELCOME10"));
        assert_eq!(lookup("  Student15 ").map(|p| p.code), Some("STUDENT15"));
        assert!(lookup("WELCOME").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn test_percentage_rounds_to_cents() {
        let promo = lookup("WELCOME10").unwrap();
        assert_eq!(promo.discount(Money(1798)), Money(180));
        assert_eq!(promo.label(), "10% off");
        assert!(!promo.waives_delivery());
    }

    #[test]
    fn test_fixed_needs_minimum() {
        let promo = lookup("SAVE5").unwrap();
        assert_eq!(promo.discount(Money(2499)), Money::ZERO);
        assert_eq!(promo.discount(Money(2500)), Money(500));
        assert_eq!(promo.label(), "$5.00 off");
    }

    #[test]
    fn test_free_delivery_takes_nothing_off_subtotal() {
        let promo = lookup("freeship").unwrap();
        assert_eq!(promo.discount(Money(4000)), Money::ZERO);
        assert!(promo.waives_delivery());
    }
}
