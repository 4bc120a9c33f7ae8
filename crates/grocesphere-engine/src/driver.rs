//! Cosmetic driver-marker interpolation for in-transit delivery orders.
//!
//! Movement happens in raw degree space along a straight line; it is a
//! stand-in for real routing and speed, nothing more.

use std::collections::HashMap;

use grocesphere_core::{Coordinate, LifecycleConfig, Order, OrderStatus};

#[derive(Debug)]
pub struct DriverTracker {
    step_deg: f64,
    epsilon_deg: f64,
    positions: HashMap<String, Coordinate>,
}

fn degree_distance(a: Coordinate, b: Coordinate) -> f64 {
    (b.lat - a.lat).hypot(b.lng - a.lng)
}

impl DriverTracker {
    #[must_use]
    pub fn new(config: &LifecycleConfig) -> Self {
        Self {
            step_deg: config.driver_step_deg,
            epsilon_deg: config.driver_arrival_epsilon_deg,
            positions: HashMap::new(),
        }
    }

    #[must_use]
    pub fn position(&self, order_id: &str) -> Option<Coordinate> {
        self.positions.get(order_id).copied()
    }

    pub fn discard(&mut self, order_id: &str) {
        if self.positions.remove(order_id).is_some() {
            tracing::debug!(order_id, "driver: position discarded");
        }
    }

    /// Advance every in-transit driver by one step.
    ///
    /// `live_destination` is the user's current location; orders fall back
    /// to the location recorded at checkout when it is unknown. A driver is
    /// seeded at the store on the first tick it is eligible and starts moving
    /// on the next one. Positions for orders no longer "On the way" are
    /// dropped. Returns a snapshot of all tracked positions.
    pub fn tick(
        &mut self,
        orders: &[Order],
        live_destination: Option<Coordinate>,
    ) -> HashMap<String, Coordinate> {
        self.positions.retain(|id, _| {
            orders
                .iter()
                .any(|o| &o.id == id && o.status == OrderStatus::OnTheWay)
        });

        for order in orders.iter().filter(|o| o.status == OrderStatus::OnTheWay) {
            let destination = live_destination
                .and_then(Coordinate::known)
                .or_else(|| order.user_location.and_then(Coordinate::known));
            let Some(destination) = destination else {
                continue;
            };

            if let Some(driver) = self.positions.get_mut(&order.id) {
                let remaining = degree_distance(*driver, destination);
                if remaining > self.epsilon_deg {
                    let step = self.step_deg.min(remaining);
                    driver.lat += (destination.lat - driver.lat) / remaining * step;
                    driver.lng += (destination.lng - driver.lng) / remaining * step;
                }
                continue;
            }

            if let Some(start) = order.store_location.known() {
                tracing::debug!(order_id = %order.id, %start, "driver: seeded at store");
                self.positions.insert(order.id.clone(), start);
            }
        }

        self.positions.clone()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use grocesphere_core::{DeliveryType, OrderMode, PaymentStatus};
    use rust_decimal::Decimal;

    use super::*;

    fn order(id: &str, status: OrderStatus, store_location: Coordinate) -> Order {
        Order {
            id: id.to_string(),
            created_at: Utc::now(),
            status,
            mode: OrderMode::Delivery,
            delivery_type: DeliveryType::Instant,
            store_id: "s1".to_string(),
            store_name: "Store".to_string(),
            store_location,
            user_location: None,
            delivery_address: None,
            scheduled_time: None,
            items: vec![],
            total: Decimal::ZERO,
            payment_status: PaymentStatus::Pending,
            payment_deadline: None,
            splits: None,
        }
    }

    fn tracker() -> DriverTracker {
        DriverTracker::new(&LifecycleConfig::default())
    }

    #[test]
    fn first_tick_seeds_at_store() {
        let store = Coordinate::new(12.970, 77.590);
        let user = Coordinate::new(12.975, 77.595);
        let mut t = tracker();
        let positions = t.tick(&[order("o1", OrderStatus::OnTheWay, store)], Some(user));
        assert_eq!(positions.get("o1"), Some(&store));
    }

    #[test]
    fn distance_decreases_monotonically_and_settles_without_overshoot() {
        let store = Coordinate::new(12.970, 77.590);
        let user = Coordinate::new(12.972, 77.5915);
        let orders = [order("o1", OrderStatus::OnTheWay, store)];
        let eps = LifecycleConfig::default().driver_arrival_epsilon_deg;
        let mut t = tracker();

        let mut previous = f64::INFINITY;
        let mut settled_at = None;
        for _ in 0..200 {
            let pos = t.tick(&orders, Some(user))["o1"];
            let d = degree_distance(pos, user);
            assert!(d <= previous, "distance grew from {previous} to {d}");
            if previous <= eps {
                assert!((d - previous).abs() < f64::EPSILON, "moved after arriving");
            }
            if d <= eps && settled_at.is_none() {
                settled_at = Some(pos);
            }
            previous = d;
        }
        assert!(previous <= eps, "driver never arrived: {previous}");
        assert_eq!(t.position("o1"), settled_at);
    }

    #[test]
    fn step_never_passes_the_destination() {
        let config = LifecycleConfig {
            driver_step_deg: 0.01,
            driver_arrival_epsilon_deg: 0.000_001,
            ..LifecycleConfig::default()
        };
        let store = Coordinate::new(12.970, 77.590);
        let user = Coordinate::new(12.9705, 77.590);
        let orders = [order("o1", OrderStatus::OnTheWay, store)];
        let mut t = DriverTracker::new(&config);

        t.tick(&orders, Some(user));
        let pos = t.tick(&orders, Some(user))["o1"];
        assert!(degree_distance(pos, user) < 1e-12);
    }

    #[test]
    fn no_destination_means_no_tracking() {
        let mut t = tracker();
        let orders = [order("o1", OrderStatus::OnTheWay, Coordinate::new(12.97, 77.59))];
        assert!(t.tick(&orders, None).is_empty());
        assert!(t.tick(&orders, Some(Coordinate::new(0.0, 0.0))).is_empty());
    }

    #[test]
    fn checkout_location_is_used_when_live_location_is_unknown() {
        let store = Coordinate::new(12.970, 77.590);
        let mut o = order("o1", OrderStatus::OnTheWay, store);
        o.user_location = Some(Coordinate::new(12.980, 77.590));
        let orders = [o];
        let mut t = tracker();

        t.tick(&orders, None);
        let pos = t.tick(&orders, None)["o1"];
        assert!(pos.lat > store.lat);
    }

    #[test]
    fn unknown_store_location_is_never_seeded() {
        let mut t = tracker();
        let orders = [order("o1", OrderStatus::OnTheWay, Coordinate::new(0.0, 0.0))];
        assert!(t
            .tick(&orders, Some(Coordinate::new(12.97, 77.59)))
            .is_empty());
    }

    #[test]
    fn position_is_dropped_when_order_leaves_on_the_way() {
        let store = Coordinate::new(12.970, 77.590);
        let user = Coordinate::new(12.975, 77.595);
        let mut t = tracker();
        t.tick(&[order("o1", OrderStatus::OnTheWay, store)], Some(user));
        assert!(t.position("o1").is_some());

        let positions = t.tick(&[order("o1", OrderStatus::Delivered, store)], Some(user));
        assert!(positions.is_empty());
        assert!(t.position("o1").is_none());
    }

    #[test]
    fn other_statuses_are_ignored() {
        let mut t = tracker();
        let store = Coordinate::new(12.97, 77.59);
        let orders = [
            order("a", OrderStatus::Pending, store),
            order("b", OrderStatus::Ready, store),
        ];
        assert!(t.tick(&orders, Some(Coordinate::new(12.98, 77.6))).is_empty());
    }
}
