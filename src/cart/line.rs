//! Cart line model: money, prices, and the line record itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Mul};

pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 99;
pub const MAX_NOTE_CHARS: usize = 200;

/// Amount in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(pub u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn cents(self) -> u64 {
        self.0
    }

    /// Decimal amount as written in the catalog and snapshots (`8.99`).
    /// Rejects negative and non-finite input.
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() || amount < 0.0 {
            return None;
        }
        Some(Money((amount * 100.0).round() as u64))
    }

    pub fn as_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Multiply by a rate, rounding half away from zero to the cent.
    pub fn scale(self, rate: f64) -> Money {
        Money((self.0 as f64 * rate).round().max(0.0) as u64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, rhs: u32) -> Money {
        Money(self.0.saturating_mul(rhs as u64))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Unit price of a variant. `Market` is settled at fulfillment time: it adds
/// nothing to totals but is always displayed as such.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Price {
    Fixed(Money),
    Market,
}

impl Price {
    pub fn amount(self) -> Option<Money> {
        match self {
            Price::Fixed(m) => Some(m),
            Price::Market => None,
        }
    }

    pub fn is_market(self) -> bool {
        matches!(self, Price::Market)
    }

    /// Contribution of `quantity` units to a total; zero for market price.
    pub fn extended(self, quantity: u32) -> Money {
        self.amount().map(|m| m * quantity).unwrap_or(Money::ZERO)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Fixed(m) => write!(f, "{}", m),
            Price::Market => f.write_str("Market Price"),
        }
    }
}

const MARKET_TAG: &str = "market";

// Wire shape shared by the catalog document and cart snapshots:
// either a decimal number or the string "market".
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PriceRepr {
    Amount(f64),
    Tag(String),
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Price::Fixed(m) => PriceRepr::Amount(m.as_decimal()).serialize(serializer),
            Price::Market => PriceRepr::Tag(MARKET_TAG.to_string()).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;
        match PriceRepr::deserialize(deserializer)? {
            PriceRepr::Amount(v) => Money::from_decimal(v)
                .map(Price::Fixed)
                .ok_or_else(|| D::Error::custom(format!("invalid price {}", v))),
            PriceRepr::Tag(t) if t.eq_ignore_ascii_case(MARKET_TAG) => Ok(Price::Market),
            PriceRepr::Tag(t) => Err(D::Error::custom(format!("unknown price tag {:?}", t))),
        }
    }
}

/// A purchasable configuration of a catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub size: String,
    pub price: Price,
    #[serde(default)]
    pub pieces: Option<u32>,
}

/// Identity of a cart line. Never derived from the catalog item id: the same
/// item can sit in the cart several times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub u64);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub line_id: LineId,
    /// Catalog item id.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub variant: Variant,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    pub fn unit_price(&self) -> Price {
        self.variant.price
    }

    pub fn line_total(&self) -> Money {
        self.variant.price.extended(self.quantity)
    }
}

pub fn clamp_quantity(quantity: u32) -> u32 {
    quantity.clamp(MIN_QUANTITY, MAX_QUANTITY)
}

/// Trim a free-text note and bound it to [`MAX_NOTE_CHARS`] characters.
pub fn bound_note(note: Option<&str>) -> Option<String> {
    let trimmed = note?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_NOTE_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display_and_decimal() {
        assert_eq!(Money::from_decimal(8.99), Some(Money(899)));
        assert_eq!(Money(1798).to_string(), "$17.98");
        assert_eq!(Money(5).to_string(), "$0.05");
        assert_eq!(Money::from_decimal(-1.0), None);
        assert_eq!(Money::from_decimal(f64::NAN), None);
    }

    #[test]
    fn test_market_price_contributes_zero_but_displays() {
        assert_eq!(Price::Market.extended(5), Money::ZERO);
        assert_eq!(Price::Market.to_string(), "Market Price");
        assert_eq!(Price::Fixed(Money(899)).extended(2), Money(1798));
    }

    #[test]
    fn test_price_wire_format() {
        let json = serde_json::to_string(&vec![Price::Fixed(Money(899)), Price::Market]).unwrap();
        assert_eq!(json, r#"[8.99,"market"]"#);
        let back: Vec<Price> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Price::Fixed(Money(899)), Price::Market]);
        assert!(serde_json::from_str::<Price>(r#""free""#).is_err());
        assert!(serde_json::from_str::<Price>("-3").is_err());
    }

    #[test]
    fn test_bound_note() {
        assert_eq!(bound_note(None), None);
        assert_eq!(bound_note(Some("   ")), None);
        assert_eq!(bound_note(Some(" extra sauce ")), Some("extra sauce".into()));
        let long = "é".repeat(250);
        assert_eq!(bound_note(Some(&long)).map(|n| n.chars().count()), Some(MAX_NOTE_CHARS));
    }

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(0), 1);
        assert_eq!(clamp_quantity(42), 42);
        assert_eq!(clamp_quantity(150), 99);
    }
}
