use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A brand choice for a product, with its own price overriding the base price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandOption {
    pub name: String,
    pub price: Decimal,
}

/// A size/pack option, priced as a multiple of the chosen brand price
/// (e.g. `1` for the base pack, `0.5` for half, `5` for bulk).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    pub multiplier: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Base price, used when no brand is selected.
    pub price: Decimal,
    #[serde(default)]
    pub emoji: String,
    pub category: String,
    pub description: Option<String>,
    #[serde(default)]
    pub brands: Vec<BrandOption>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Product {
    /// Returns the brand entry named `name`, if the product offers it.
    #[must_use]
    pub fn brand(&self, name: &str) -> Option<&BrandOption> {
        self.brands.iter().find(|b| b.name == name)
    }

    /// Unit price for a brand/variant selection.
    ///
    /// An unknown or absent brand falls back to the base price; an absent
    /// variant counts as multiplier `1`.
    #[must_use]
    pub fn unit_price(&self, brand: Option<&str>, variant: Option<&Variant>) -> Decimal {
        let base = brand
            .and_then(|name| self.brand(name))
            .map_or(self.price, |b| b.price);
        variant.map_or(base, |v| base * v.multiplier)
    }

    /// Reprice the product (and its brands) with a store-level multiplier,
    /// rounding each price up to a whole unit.
    #[must_use]
    pub fn repriced(&self, multiplier: Decimal) -> Product {
        Product {
            price: (self.price * multiplier).ceil(),
            brands: self
                .brands
                .iter()
                .map(|b| BrandOption {
                    name: b.name.clone(),
                    price: (b.price * multiplier).ceil(),
                })
                .collect(),
            ..self.clone()
        }
    }
}

/// Deterministic per-store price multiplier in `[0.90, 1.09]` used for demo
/// stores, derived from the character codes of the store id.
#[must_use]
pub fn store_price_multiplier(store_id: &str) -> Decimal {
    let hash = store_id
        .chars()
        .fold(0_u32, |acc, c| acc.wrapping_add(u32::from(c)));
    Decimal::new(90, 2) + Decimal::new(i64::from(hash % 20), 2)
}
