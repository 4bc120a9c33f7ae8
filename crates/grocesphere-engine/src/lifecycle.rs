//! Simulated order-status progression.
//!
//! Orders without an authoritative backend are walked along their happy
//! path on every tick. Once the backend has spoken for an order, the
//! simulator never touches it again.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use grocesphere_core::{LifecycleConfig, Order, OrderStatus};

use crate::random::RandomSource;

pub struct LifecycleSimulator {
    config: LifecycleConfig,
    rng: Box<dyn RandomSource>,
    authoritative: HashSet<String>,
}

impl LifecycleSimulator {
    #[must_use]
    pub fn new(config: LifecycleConfig, rng: Box<dyn RandomSource>) -> Self {
        Self {
            config,
            rng,
            authoritative: HashSet::new(),
        }
    }

    /// Hand `order_id` over to the backend; it will no longer be simulated.
    pub fn mark_authoritative(&mut self, order_id: &str) {
        if self.authoritative.insert(order_id.to_string()) {
            tracing::debug!(order_id, "lifecycle: order is now backend-driven");
        }
    }

    /// Forget a backend-driven order once it can no longer change locally.
    pub fn release(&mut self, order_id: &str) {
        self.authoritative.remove(order_id);
    }

    #[must_use]
    pub fn is_authoritative(&self, order_id: &str) -> bool {
        self.authoritative.contains(order_id)
    }

    /// Whether `order` is still eligible for simulated transitions at `now`.
    #[must_use]
    pub fn is_simulated(&self, order: &Order, now: DateTime<Utc>) -> bool {
        !order.status.is_terminal()
            && !self.is_authoritative(&order.id)
            && now.signed_duration_since(order.created_at) <= self.config.simulation_horizon
    }

    /// Decide the status `order` moves to on this tick, if any.
    ///
    /// Draws from the random source only for the probabilistic transitions.
    pub fn next_status(&mut self, order: &Order, now: DateTime<Utc>) -> Option<OrderStatus> {
        if !self.is_simulated(order, now) {
            return None;
        }
        let next = order.status.successor(order.mode)?;
        let threshold = match order.status {
            OrderStatus::OnTheWay => self.config.delivered_draw_threshold,
            OrderStatus::Ready => self.config.picked_up_draw_threshold,
            _ => return Some(next),
        };
        (self.rng.next_unit() > threshold).then_some(next)
    }

    /// Advance every eligible order by at most one status.
    ///
    /// All orders are judged against the same `now`. Returns copies of the
    /// orders that changed; unchanged orders are left untouched.
    pub fn tick(&mut self, orders: &mut [Order], now: DateTime<Utc>) -> Vec<Order> {
        let mut changed = Vec::new();
        for order in orders.iter_mut() {
            if let Some(next) = self.next_status(order, now) {
                tracing::info!(
                    order_id = %order.id,
                    from = %order.status,
                    to = %next,
                    "lifecycle: simulated transition"
                );
                order.status = next;
                changed.push(order.clone());
            }
        }
        changed
    }
}

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod tests;
