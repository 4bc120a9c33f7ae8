//! The session's single state container.
//!
//! `LocalityEngine` owns the store list, the active store, the latest user
//! location, the cart, the orders and the three stateful components. Each
//! piece of mutable state has exactly one owner: this struct. Timers and the
//! feed reach it through a shared handle (see [`crate::session`]).

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use grocesphere_core::{
    AdvisoryConfig, Cart, CartOwner, CheckoutConfig, CheckoutQuote, Coordinate, LifecycleConfig,
    Order, OrderMode, OrderStatus, Store,
};

use crate::advisory::{PendingSwitch, StoreSwitchAdvisor, SwitchResolution};
use crate::clock::Clock;
use crate::driver::DriverTracker;
use crate::feed::AuthoritativeUpdate;
use crate::lifecycle::LifecycleSimulator;
use crate::random::RandomSource;

pub struct LocalityEngine {
    stores: Vec<Store>,
    active_store: Option<Store>,
    user_location: Option<Coordinate>,
    cart: Cart,
    favorites: BTreeSet<String>,
    /// Newest first.
    orders: Vec<Order>,
    checkout: CheckoutConfig,
    advisor: StoreSwitchAdvisor,
    simulator: LifecycleSimulator,
    drivers: DriverTracker,
}

impl LocalityEngine {
    #[must_use]
    pub fn new(
        advisory: AdvisoryConfig,
        lifecycle: LifecycleConfig,
        clock: Arc<dyn Clock>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            stores: Vec::new(),
            active_store: None,
            user_location: None,
            cart: Cart::new(),
            favorites: BTreeSet::new(),
            orders: Vec::new(),
            checkout: CheckoutConfig::default(),
            advisor: StoreSwitchAdvisor::new(advisory, clock),
            drivers: DriverTracker::new(&lifecycle),
            simulator: LifecycleSimulator::new(lifecycle, rng),
        }
    }

    /// Replace the default checkout fees.
    #[must_use]
    pub fn with_checkout(mut self, checkout: CheckoutConfig) -> Self {
        self.checkout = checkout;
        self
    }

    #[must_use]
    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    #[must_use]
    pub fn active_store(&self) -> Option<&Store> {
        self.active_store.as_ref()
    }

    #[must_use]
    pub fn user_location(&self) -> Option<Coordinate> {
        self.user_location
    }

    #[must_use]
    pub fn pending_switch(&self) -> Option<&PendingSwitch> {
        self.advisor.pending()
    }

    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// Flip `product_id` in or out of the favorites. Returns whether it is
    /// now a favorite.
    pub fn toggle_favorite(&mut self, product_id: &str) -> bool {
        if self.favorites.remove(product_id) {
            return false;
        }
        self.favorites.insert(product_id.to_string());
        true
    }

    #[must_use]
    pub fn is_favorite(&self, product_id: &str) -> bool {
        self.favorites.contains(product_id)
    }

    #[must_use]
    pub fn favorites(&self) -> &BTreeSet<String> {
        &self.favorites
    }

    /// Replace the store list (already sorted closest first).
    ///
    /// The active store is kept if it is still listed; otherwise the store
    /// owning the cart's items is chosen, then the first store. An empty list
    /// clears the active store. A pending switch whose candidate vanished is
    /// dropped without re-prompting.
    pub fn refresh_stores(&mut self, stores: Vec<Store>) {
        self.stores = stores;

        let keep = |id: &str| self.stores.iter().find(|s| s.id == id).cloned();
        let next = self
            .active_store
            .as_ref()
            .and_then(|s| keep(&s.id))
            .or_else(|| self.cart.current_store_id().and_then(keep))
            .or_else(|| self.stores.first().cloned());

        let changed = next.as_ref().map(|s| &s.id) != self.active_store.as_ref().map(|s| &s.id);
        if changed {
            tracing::info!(
                store = next.as_ref().map_or("none", |s| s.id.as_str()),
                "locality: active store changed"
            );
        }
        self.active_store = next;
        self.advisor.expire_if_stale(&self.stores);
    }

    /// Choose a listed store by hand. Returns `false` for an unknown id.
    pub fn select_store(&mut self, store_id: &str) -> bool {
        match self.stores.iter().find(|s| s.id == store_id) {
            Some(store) => {
                self.active_store = Some(store.clone());
                true
            }
            None => false,
        }
    }

    /// Record a location sample and run one advisory evaluation.
    ///
    /// `None` (or the `(0, 0)` sentinel) is a failed sample: the evaluation
    /// is skipped and the last known location stays in place.
    pub fn evaluate_proximity(&mut self, location: Option<Coordinate>) -> Option<PendingSwitch> {
        let sample = location.and_then(Coordinate::known)?;
        self.user_location = Some(sample);
        self.advisor
            .evaluate(Some(sample), self.active_store.as_ref(), &self.stores)
    }

    /// Answer the pending switch. An accepted candidate becomes the active store.
    pub fn resolve_switch(&mut self, accepted: bool) -> Option<SwitchResolution> {
        let resolution = self.advisor.resolve(accepted, &mut self.cart)?;
        if let SwitchResolution::Accepted { store, .. } = &resolution {
            self.active_store = Some(store.clone());
        }
        Some(resolution)
    }

    /// Price the current cart for `mode` without placing it.
    #[must_use]
    pub fn checkout_quote(&self, mode: OrderMode) -> CheckoutQuote {
        CheckoutQuote::for_items(self.cart.items(), mode, &self.checkout)
    }

    /// Check out the cart at the active store. The order starts unpaid.
    ///
    /// Returns `None` when there is no active store or the cart is empty.
    pub fn place_order(
        &mut self,
        mode: OrderMode,
        scheduled_time: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Option<Order> {
        if self.cart.is_empty() {
            return None;
        }
        let store = self.active_store.as_ref()?;
        let mut order = Order::place(
            store,
            self.cart.take_items(),
            mode,
            scheduled_time,
            now,
            &self.checkout,
        );
        order.user_location = self.user_location;
        tracing::info!(
            order_id = %order.id,
            store_id = %order.store_id,
            total = %order.total,
            "locality: order placed"
        );
        self.orders.insert(0, order.clone());
        Some(order)
    }

    /// Record payment for a placed order.
    ///
    /// Returns the order, or `None` if it is unknown or already paid.
    pub fn settle_payment(&mut self, order_id: &str) -> Option<Order> {
        let order = self.orders.iter_mut().find(|o| o.id == order_id)?;
        if !order.mark_paid() {
            return None;
        }
        tracing::info!(order_id, total = %order.total, "locality: order paid");
        Some(order.clone())
    }

    /// Merge orders from persistence or the backend.
    ///
    /// Orders with an id already known replace the existing copy. When
    /// `backed` is true every live loaded order is handed to the backend and
    /// is never simulated.
    pub fn load_orders(&mut self, orders: Vec<Order>, backed: bool) {
        for order in orders {
            if backed && order.is_live() {
                self.simulator.mark_authoritative(&order.id);
            } else if backed {
                self.simulator.release(&order.id);
            }
            match self.orders.iter_mut().find(|o| o.id == order.id) {
                Some(existing) => *existing = order,
                None => self.orders.push(order),
            }
        }
        self.orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.drivers_follow_statuses();
    }

    /// Apply a status pushed by the backend. Authoritative updates always
    /// win over simulated state, and the order is never simulated again.
    ///
    /// Returns the updated order, or `None` if it is not known locally.
    /// Updates for unknown orders are dropped.
    pub fn apply_authoritative(&mut self, update: &AuthoritativeUpdate) -> Option<Order> {
        let Some(order) = self.orders.iter_mut().find(|o| o.id == update.order_id) else {
            tracing::debug!(order_id = %update.order_id, "locality: update for unknown order");
            return None;
        };
        if order.status != update.status {
            tracing::info!(
                order_id = %order.id,
                from = %order.status,
                to = %update.status,
                "locality: authoritative status"
            );
        }
        order.status = update.status;
        let order = order.clone();
        if order.is_live() {
            self.simulator.mark_authoritative(&order.id);
        } else {
            self.simulator.release(&order.id);
        }
        if order.status != OrderStatus::OnTheWay {
            self.drivers.discard(&order.id);
        }
        Some(order)
    }

    /// One lifecycle tick: every simulated order is judged against `now`.
    pub fn tick_lifecycle(&mut self, now: DateTime<Utc>) -> Vec<Order> {
        let changed = self.simulator.tick(&mut self.orders, now);
        if !changed.is_empty() {
            self.drivers_follow_statuses();
        }
        changed
    }

    /// One driver tick against the latest user location.
    pub fn tick_driver_positions(&mut self) -> HashMap<String, Coordinate> {
        self.drivers.tick(&self.orders, self.user_location)
    }

    /// Whether the backend, not the simulator, drives `order_id`.
    #[must_use]
    pub fn is_backed(&self, order_id: &str) -> bool {
        self.simulator.is_authoritative(order_id)
    }

    #[must_use]
    pub fn driver_position(&self, order_id: &str) -> Option<Coordinate> {
        self.drivers.position(order_id)
    }

    /// The most recent order that has not reached a terminal status.
    #[must_use]
    pub fn active_order(&self) -> Option<&Order> {
        self.orders.iter().find(|o| o.is_live())
    }

    #[must_use]
    pub fn has_live_orders(&self) -> bool {
        self.active_order().is_some()
    }

    fn drivers_follow_statuses(&mut self) {
        for order in &self.orders {
            if order.status != OrderStatus::OnTheWay {
                self.drivers.discard(&order.id);
            }
        }
    }
}

#[cfg(test)]
#[path = "locality_test.rs"]
mod tests;
