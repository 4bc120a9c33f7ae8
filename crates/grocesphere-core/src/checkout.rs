//! Checkout pricing: MRP savings, delivery fees and the payment split.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::app_config::CheckoutConfig;
use crate::cart::CartItem;
use crate::orders::OrderMode;
use crate::stores::Store;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Pending,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Paid => write!(f, "PAID"),
            PaymentStatus::Pending => write!(f, "PENDING"),
        }
    }
}

/// Who receives what for one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSplit {
    pub store_amount: Decimal,
    pub store_upi: String,
    pub handling_fee: Decimal,
    /// Zero when delivery is free for the customer; otherwise owed to the driver.
    pub delivery_fee: Decimal,
    /// Only set for delivery orders.
    pub driver_upi: Option<String>,
}

/// Priced summary of a cart for one fulfilment mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutQuote {
    pub mode: OrderMode,
    pub items_total: Decimal,
    pub mrp_total: Decimal,
    pub savings: Decimal,
    pub store_count: usize,
    pub minimum_order_met: bool,
    pub delivery_fee: Decimal,
    pub handling_fee: Decimal,
}

/// Display MRP for a unit price: the price marked up and rounded up to a whole unit.
#[must_use]
pub fn mrp(unit_price: Decimal, config: &CheckoutConfig) -> Decimal {
    (unit_price * config.mrp_markup).ceil()
}

/// Latest time a scheduled order can be paid; `None` for instant orders.
#[must_use]
pub fn payment_deadline(
    scheduled_time: Option<DateTime<Utc>>,
    config: &CheckoutConfig,
) -> Option<DateTime<Utc>> {
    scheduled_time.map(|slot| slot - config.payment_lead)
}

impl CheckoutQuote {
    /// Price `items` for `mode`.
    ///
    /// Delivery costs the base fee once per store in the cart unless the
    /// items total reaches the minimum order value. Pickup is never charged.
    #[must_use]
    pub fn for_items(items: &[CartItem], mode: OrderMode, config: &CheckoutConfig) -> Self {
        let items_total: Decimal = items.iter().map(CartItem::line_total).sum();
        let mrp_total: Decimal = items
            .iter()
            .map(|item| mrp(item.unit_price, config) * Decimal::from(item.quantity))
            .sum();
        let store_count = items
            .iter()
            .map(|item| item.store_id.as_str())
            .collect::<BTreeSet<_>>()
            .len();
        let minimum_order_met = items_total >= config.minimum_order_value;
        let delivery_fee = match mode {
            OrderMode::Delivery if !minimum_order_met => {
                config.base_delivery_fee * Decimal::from(store_count)
            }
            OrderMode::Delivery | OrderMode::Pickup => Decimal::ZERO,
        };

        Self {
            mode,
            items_total,
            mrp_total,
            savings: mrp_total - items_total,
            store_count,
            minimum_order_met,
            delivery_fee,
            handling_fee: config.handling_fee,
        }
    }

    /// What the customer pays.
    #[must_use]
    pub fn payable_total(&self) -> Decimal {
        self.items_total + self.delivery_fee + self.handling_fee
    }

    #[must_use]
    pub fn split(&self, store: &Store, config: &CheckoutConfig) -> PaymentSplit {
        PaymentSplit {
            store_amount: self.items_total,
            store_upi: store
                .upi_id
                .clone()
                .unwrap_or_else(|| config.fallback_store_upi.clone()),
            handling_fee: self.handling_fee,
            delivery_fee: self.delivery_fee,
            driver_upi: (self.mode == OrderMode::Delivery).then(|| config.driver_upi.clone()),
        }
    }
}
