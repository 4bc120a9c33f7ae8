use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{Product, Variant};
use crate::stores::{Store, StoreKind};

const GENERIC_BRAND: &str = "Generic";

/// The cart surface the store-switch advisory needs: a switch to another
/// store invalidates the cart, because inventory and pricing are store-scoped.
pub trait CartOwner {
    /// Store that owns the items currently in the cart, if any.
    fn current_store_id(&self) -> Option<&str>;

    fn clear(&mut self);
}

/// One cart line: a product with a brand/variant selection at a specific store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// `<product>-<brand>[-<variant>]-<store>`; unique per selection.
    pub id: String,
    pub product_id: String,
    /// Display name including brand and variant.
    pub name: String,
    pub brand: String,
    pub variant: Option<Variant>,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub store_id: String,
    pub store_name: String,
    pub store_kind: StoreKind,
}

impl CartItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Add `quantity` of a product selection from `store`.
    ///
    /// A cart only ever holds items from one store: if the existing items
    /// belong to a different store they are discarded first. Returns `true`
    /// when that happened.
    pub fn add(
        &mut self,
        store: &Store,
        product: &Product,
        quantity: u32,
        brand: Option<&str>,
        variant: Option<&Variant>,
    ) -> bool {
        let reset = self
            .current_store_id()
            .is_some_and(|owner| owner != store.id);
        if reset {
            self.items.clear();
        }
        if quantity == 0 {
            return reset;
        }

        let brand_name = brand.unwrap_or(GENERIC_BRAND);
        let variant_suffix = variant
            .map(|v| format!("-{}", v.name.split_whitespace().collect::<String>()))
            .unwrap_or_default();
        let id = format!("{}-{brand_name}{variant_suffix}-{}", product.id, store.id);

        if let Some(line) = self.items.iter_mut().find(|line| line.id == id) {
            line.quantity = line.quantity.saturating_add(quantity);
            return reset;
        }

        let mut name = product.name.clone();
        if brand_name != GENERIC_BRAND {
            name = format!("{brand_name} {name}");
        }
        if let Some(v) = variant {
            name = format!("{name} ({})", v.name);
        }

        self.items.push(CartItem {
            id,
            product_id: product.id.clone(),
            name,
            brand: brand_name.to_string(),
            variant: variant.cloned(),
            unit_price: product.unit_price(brand, variant),
            quantity,
            store_id: store.id.clone(),
            store_name: store.name.clone(),
            store_kind: store.kind,
        });
        reset
    }

    /// Adjust a line's quantity by `delta`, dropping the line when it reaches zero.
    pub fn update_quantity(&mut self, line_id: &str, delta: i64) {
        for line in &mut self.items {
            if line.id == line_id {
                let next = (i64::from(line.quantity) + delta).max(0);
                line.quantity = u32::try_from(next).unwrap_or(u32::MAX);
            }
        }
        self.items.retain(|line| line.quantity > 0);
    }

    /// Take the cart's lines, leaving it empty (checkout).
    pub fn take_items(&mut self) -> Vec<CartItem> {
        std::mem::take(&mut self.items)
    }
}

impl CartOwner for Cart {
    fn current_store_id(&self) -> Option<&str> {
        self.items.first().map(|line| line.store_id.as_str())
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}
