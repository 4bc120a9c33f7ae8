use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_config::CheckoutConfig;
use crate::cart::CartItem;
use crate::checkout::{payment_deadline, CheckoutQuote, PaymentSplit, PaymentStatus};
use crate::location::Coordinate;
use crate::stores::Store;
use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderMode {
    Delivery,
    Pickup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryType {
    Instant,
    Scheduled,
}

/// Order status as shown to the customer.
///
/// Happy paths are `Pending → Preparing → OnTheWay → Delivered` for delivery
/// orders and `Pending → Preparing → Ready → PickedUp` for pickup orders.
/// `Cancelled` only ever arrives from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Preparing,
    #[serde(rename = "On the way")]
    OnTheWay,
    Ready,
    Delivered,
    #[serde(rename = "Picked Up")]
    PickedUp,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::PickedUp | OrderStatus::Cancelled
        )
    }

    /// The next status on the happy path for `mode`, or `None` once terminal.
    #[must_use]
    pub fn successor(self, mode: OrderMode) -> Option<OrderStatus> {
        match (self, mode) {
            (OrderStatus::Pending, _) => Some(OrderStatus::Preparing),
            (OrderStatus::Preparing, OrderMode::Delivery) => Some(OrderStatus::OnTheWay),
            (OrderStatus::Preparing, OrderMode::Pickup) => Some(OrderStatus::Ready),
            (OrderStatus::OnTheWay, _) => Some(OrderStatus::Delivered),
            (OrderStatus::Ready, _) => Some(OrderStatus::PickedUp),
            (OrderStatus::Delivered | OrderStatus::PickedUp | OrderStatus::Cancelled, _) => None,
        }
    }

    /// Map an order-management backend status string to the customer-facing status.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownStatus`] for strings the backend is not
    /// known to emit.
    pub fn from_backend(status: &str) -> Result<OrderStatus, CoreError> {
        match status {
            "placed" | "accepted" => Ok(OrderStatus::Pending),
            "packing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            "on_way" => Ok(OrderStatus::OnTheWay),
            "delivered" => Ok(OrderStatus::Delivered),
            "picked_up" => Ok(OrderStatus::PickedUp),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Preparing => write!(f, "Preparing"),
            OrderStatus::OnTheWay => write!(f, "On the way"),
            OrderStatus::Ready => write!(f, "Ready"),
            OrderStatus::Delivered => write!(f, "Delivered"),
            OrderStatus::PickedUp => write!(f, "Picked Up"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub mode: OrderMode,
    pub delivery_type: DeliveryType,
    pub store_id: String,
    pub store_name: String,
    /// `(0, 0)` when the backend did not supply one.
    pub store_location: Coordinate,
    pub user_location: Option<Coordinate>,
    pub delivery_address: Option<String>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub items: Vec<CartItem>,
    /// Items plus delivery and handling fees.
    pub total: Decimal,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub splits: Option<PaymentSplit>,
}

impl Order {
    /// Build a fresh `Pending`, unpaid order for the given cart lines placed
    /// at `store`, priced with the checkout fees for `mode`.
    #[must_use]
    pub fn place(
        store: &Store,
        items: Vec<CartItem>,
        mode: OrderMode,
        scheduled_time: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        checkout: &CheckoutConfig,
    ) -> Self {
        let quote = CheckoutQuote::for_items(&items, mode, checkout);
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            status: OrderStatus::Pending,
            mode,
            delivery_type: if scheduled_time.is_some() {
                DeliveryType::Scheduled
            } else {
                DeliveryType::Instant
            },
            store_id: store.id.clone(),
            store_name: store.name.clone(),
            store_location: store.location(),
            user_location: None,
            delivery_address: None,
            scheduled_time,
            items,
            total: quote.payable_total(),
            payment_status: PaymentStatus::Pending,
            payment_deadline: payment_deadline(scheduled_time, checkout),
            splits: Some(quote.split(store, checkout)),
        }
    }

    /// Record payment. Returns `false` if the order was already paid.
    pub fn mark_paid(&mut self) -> bool {
        if self.payment_status == PaymentStatus::Paid {
            return false;
        }
        self.payment_status = PaymentStatus::Paid;
        true
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.status.is_terminal()
    }
}
