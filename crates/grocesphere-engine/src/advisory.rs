//! Store-switch advisory.
//!
//! Watches the user's location and suggests switching the active store when
//! the user has physically arrived at another store, or when the active store
//! is far away and a materially closer one exists. A cooldown and a per-session
//! ignore set keep the prompt from nagging.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use grocesphere_core::{AdvisoryConfig, CartOwner, Coordinate, Store};

use crate::clock::Clock;
use crate::geo::{distance_km, nearest_with_distance};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchReason {
    /// The user is standing at (within the arrival radius of) another store.
    Arrival,
    /// The active store is far and the candidate is materially closer.
    BetterOption,
}

/// An outstanding suggestion awaiting the user's accept/decline.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSwitch {
    pub candidate: Store,
    pub distance_km: f64,
    pub reason: SwitchReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SwitchResolution {
    Accepted { store: Store, cart_cleared: bool },
    Declined { store_id: String },
}

pub struct StoreSwitchAdvisor {
    config: AdvisoryConfig,
    clock: Arc<dyn Clock>,
    last_alert: Option<Instant>,
    ignored: HashSet<String>,
    pending: Option<PendingSwitch>,
}

impl StoreSwitchAdvisor {
    #[must_use]
    pub fn new(config: AdvisoryConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            last_alert: None,
            ignored: HashSet::new(),
            pending: None,
        }
    }

    #[must_use]
    pub fn pending(&self) -> Option<&PendingSwitch> {
        self.pending.as_ref()
    }

    #[must_use]
    pub fn is_ignored(&self, store_id: &str) -> bool {
        self.ignored.contains(store_id)
    }

    fn cooling_down(&self, now: Instant) -> bool {
        match self.last_alert {
            Some(last) => now.saturating_duration_since(last) < self.config.cooldown,
            None => false,
        }
    }

    /// Evaluate one location update.
    ///
    /// Returns the newly raised switch, or `None` when nothing was raised:
    /// a switch is already pending, the cooldown has not elapsed, an input is
    /// missing, or no rule fires.
    pub fn evaluate(
        &mut self,
        location: Option<Coordinate>,
        active: Option<&Store>,
        stores: &[Store],
    ) -> Option<PendingSwitch> {
        if self.pending.is_some() {
            return None;
        }
        let now = self.clock.now();
        if self.cooling_down(now) {
            return None;
        }
        let location = location.and_then(Coordinate::known)?;
        let active = active?;
        let (closest, dist_to_closest) = nearest_with_distance(stores, location)?;

        if closest.id == active.id || self.ignored.contains(&closest.id) {
            return None;
        }

        let dist_to_active = distance_km(location, active.location());
        let reason = if dist_to_closest < self.config.arrival_radius_km {
            SwitchReason::Arrival
        } else if dist_to_active > self.config.far_threshold_km
            && dist_to_closest < dist_to_active * self.config.better_option_ratio
        {
            SwitchReason::BetterOption
        } else {
            return None;
        };

        tracing::info!(
            candidate = %closest.id,
            active = %active.id,
            dist_to_closest,
            dist_to_active,
            ?reason,
            "advisory: suggesting store switch"
        );

        let pending = PendingSwitch {
            candidate: closest.clone(),
            distance_km: dist_to_closest,
            reason,
        };
        self.last_alert = Some(now);
        self.pending = Some(pending.clone());
        Some(pending)
    }

    /// Apply the user's answer to the pending switch.
    ///
    /// Accepting clears `cart` when its items belong to another store and
    /// forgets every previously declined store. Declining remembers the
    /// candidate for the rest of the session. Returns `None` when nothing was
    /// pending.
    pub fn resolve(
        &mut self,
        accepted: bool,
        cart: &mut dyn CartOwner,
    ) -> Option<SwitchResolution> {
        let pending = self.pending.take()?;
        let store = pending.candidate;

        if accepted {
            let cart_cleared = cart
                .current_store_id()
                .is_some_and(|owner| owner != store.id);
            if cart_cleared {
                cart.clear();
            }
            self.ignored.clear();
            tracing::info!(store = %store.id, cart_cleared, "advisory: switch accepted");
            Some(SwitchResolution::Accepted {
                store,
                cart_cleared,
            })
        } else {
            tracing::debug!(store = %store.id, "advisory: switch declined");
            self.ignored.insert(store.id.clone());
            Some(SwitchResolution::Declined { store_id: store.id })
        }
    }

    /// Drop the pending switch if its candidate is no longer in `stores`.
    ///
    /// The candidate is not added to the ignore set and the cooldown is left
    /// untouched. Returns `true` if a pending switch was expired.
    pub fn expire_if_stale(&mut self, stores: &[Store]) -> bool {
        let stale = self
            .pending
            .as_ref()
            .is_some_and(|p| !stores.iter().any(|s| s.id == p.candidate.id));
        if stale {
            if let Some(p) = self.pending.take() {
                tracing::debug!(store = %p.candidate.id, "advisory: pending switch expired");
            }
        }
        stale
    }
}

#[cfg(test)]
#[path = "advisory_test.rs"]
mod tests;
