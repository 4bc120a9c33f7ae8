//! Background timers and the authoritative feed for one user session.
//!
//! The lifecycle and driver timers run only while the session is active and
//! at least one live order exists. They stop themselves once every order is
//! terminal and are aborted when the session ends or is dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use grocesphere_core::{Coordinate, LifecycleConfig, Order};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::feed::FeedSubscription;
use crate::locality::LocalityEngine;

/// Handle through which timers, the feed and the caller share one engine.
pub type SharedEngine = Arc<Mutex<LocalityEngine>>;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Orders whose status changed, from a lifecycle tick or the feed.
    OrdersUpdated(Vec<Order>),
    /// Snapshot of every tracked driver position.
    DriverPositions(HashMap<String, Coordinate>),
}

#[must_use]
pub fn shared(engine: LocalityEngine) -> SharedEngine {
    Arc::new(Mutex::new(engine))
}

/// The two periodic tasks. Dropping this aborts both.
///
/// `idle` is set, under the engine lock, by whichever timer first sees no
/// live orders. From then on the pair counts as stopped even if the other
/// task is still alive.
struct SessionTimers {
    lifecycle: JoinHandle<()>,
    driver: JoinHandle<()>,
    idle: Arc<AtomicBool>,
}

impl SessionTimers {
    fn is_running(&self) -> bool {
        !self.idle.load(Ordering::Acquire)
            && !self.lifecycle.is_finished()
            && !self.driver.is_finished()
    }
}

impl Drop for SessionTimers {
    fn drop(&mut self) {
        self.lifecycle.abort();
        self.driver.abort();
    }
}

pub struct Session {
    engine: SharedEngine,
    lifecycle_period: Duration,
    driver_period: Duration,
    events: broadcast::Sender<SessionEvent>,
    timers: Option<SessionTimers>,
    feed: Option<JoinHandle<()>>,
}

impl Session {
    #[must_use]
    pub fn new(engine: SharedEngine, config: &LifecycleConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            engine,
            lifecycle_period: config.tick_interval,
            driver_period: config.driver_tick_interval,
            events,
            timers: None,
            feed: None,
        }
    }

    #[must_use]
    pub fn engine(&self) -> SharedEngine {
        Arc::clone(&self.engine)
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Whether the periodic timers are currently held.
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.timers.as_ref().is_some_and(SessionTimers::is_running)
    }

    /// Acquire or release the timers to match the engine's orders.
    ///
    /// Call after anything that may create a live order (checkout, loading
    /// orders). If either timer already stopped on its own, both are
    /// replaced.
    pub async fn sync(&mut self) {
        let (live, ticking) = {
            let engine = self.engine.lock().await;
            (engine.has_live_orders(), self.is_ticking())
        };
        match (live, ticking) {
            (true, false) => {
                tracing::debug!("session: timers acquired");
                self.timers = Some(self.spawn_timers());
            }
            (false, _) => {
                if self.timers.take().is_some() {
                    tracing::debug!("session: timers released");
                }
            }
            (true, true) => {}
        }
    }

    /// Apply authoritative updates from `feed` as they arrive.
    ///
    /// Replaces any previously attached feed.
    pub fn attach_feed(&mut self, mut feed: FeedSubscription) {
        let engine = Arc::clone(&self.engine);
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            while let Some(update) = feed.next().await {
                let updated = engine.lock().await.apply_authoritative(&update);
                if let Some(order) = updated {
                    let _ = events.send(SessionEvent::OrdersUpdated(vec![order]));
                }
            }
            tracing::debug!("session: order feed closed");
        });
        if let Some(previous) = self.feed.replace(task) {
            previous.abort();
        }
    }

    /// Stop every background task. Safe to call more than once.
    pub fn end(&mut self) {
        if self.timers.take().is_some() {
            tracing::debug!("session: timers released");
        }
        if let Some(feed) = self.feed.take() {
            feed.abort();
        }
    }

    fn spawn_timers(&self) -> SessionTimers {
        let idle = Arc::new(AtomicBool::new(false));
        SessionTimers {
            lifecycle: tokio::spawn(run_lifecycle(
                Arc::clone(&self.engine),
                self.lifecycle_period,
                self.events.clone(),
                Arc::clone(&idle),
            )),
            driver: tokio::spawn(run_driver(
                Arc::clone(&self.engine),
                self.driver_period,
                self.events.clone(),
                Arc::clone(&idle),
            )),
            idle,
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.end();
    }
}

fn interval(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn run_lifecycle(
    engine: SharedEngine,
    period: Duration,
    events: broadcast::Sender<SessionEvent>,
    idle: Arc<AtomicBool>,
) {
    let mut ticker = interval(period);
    loop {
        ticker.tick().await;
        let (changed, live) = {
            let mut engine = engine.lock().await;
            let changed = engine.tick_lifecycle(Utc::now());
            let live = engine.has_live_orders();
            if !live {
                idle.store(true, Ordering::Release);
            }
            (changed, live)
        };
        if !changed.is_empty() {
            let _ = events.send(SessionEvent::OrdersUpdated(changed));
        }
        if !live {
            tracing::debug!("session: lifecycle timer idle, stopping");
            break;
        }
    }
}

async fn run_driver(
    engine: SharedEngine,
    period: Duration,
    events: broadcast::Sender<SessionEvent>,
    idle: Arc<AtomicBool>,
) {
    let mut ticker = interval(period);
    loop {
        ticker.tick().await;
        let (positions, live) = {
            let mut engine = engine.lock().await;
            let positions = engine.tick_driver_positions();
            let live = engine.has_live_orders();
            if !live {
                idle.store(true, Ordering::Release);
            }
            (positions, live)
        };
        if !positions.is_empty() {
            let _ = events.send(SessionEvent::DriverPositions(positions));
        }
        if !live {
            tracing::debug!("session: driver timer idle, stopping");
            break;
        }
    }
}
