use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Thresholds for the store-switch advisory.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisoryConfig {
    /// Minimum gap between two raised switch prompts.
    pub cooldown: Duration,
    /// A different store closer than this means the user is standing at it.
    pub arrival_radius_km: f64,
    /// The active store must be further than this before the better-option rule applies.
    pub far_threshold_km: f64,
    /// The closest store must be under `ratio × distance to active` to count as better.
    pub better_option_ratio: f64,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(60),
            arrival_radius_km: 0.5,
            far_threshold_km: 2.0,
            better_option_ratio: 0.7,
        }
    }
}

/// Cadence and tuning for the order-lifecycle and driver simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleConfig {
    pub tick_interval: Duration,
    pub driver_tick_interval: Duration,
    /// Orders older than this are no longer simulated.
    pub simulation_horizon: TimeDelta,
    /// `On the way → Delivered` fires when a uniform draw exceeds this.
    pub delivered_draw_threshold: f64,
    /// `Ready → Picked Up` fires when a uniform draw exceeds this.
    pub picked_up_draw_threshold: f64,
    /// Driver movement per driver tick, in degrees.
    pub driver_step_deg: f64,
    /// Remaining distance (degrees) under which the driver counts as arrived.
    pub driver_arrival_epsilon_deg: f64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(10),
            driver_tick_interval: Duration::from_millis(1000),
            simulation_horizon: TimeDelta::minutes(30),
            delivered_draw_threshold: 0.7,
            picked_up_draw_threshold: 0.8,
            driver_step_deg: 0.000_15,
            driver_arrival_epsilon_deg: 0.000_2,
        }
    }
}

/// Fees and payment routing applied at checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutConfig {
    /// Delivery is free once the items total reaches this.
    pub minimum_order_value: Decimal,
    /// Charged per store in the order when the minimum is not met.
    pub base_delivery_fee: Decimal,
    pub handling_fee: Decimal,
    /// Shown MRP is the unit price times this, rounded up.
    pub mrp_markup: Decimal,
    /// Payee for stores that did not register a UPI id.
    pub fallback_store_upi: String,
    pub driver_upi: String,
    /// Scheduled orders must be paid this long before the slot.
    pub payment_lead: TimeDelta,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            minimum_order_value: Decimal::new(1000, 0),
            base_delivery_fee: Decimal::new(30, 0),
            handling_fee: Decimal::ZERO,
            mrp_markup: Decimal::new(125, 2),
            fallback_store_upi: "store@upi".to_string(),
            driver_upi: "driver@upi".to_string(),
            payment_lead: TimeDelta::minutes(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub stores_path: PathBuf,
    pub search_radius_km: f64,
    /// Fixed seed for the simulation RNG; `None` seeds from the OS.
    pub rng_seed: Option<u64>,
    pub advisory: AdvisoryConfig,
    pub lifecycle: LifecycleConfig,
    pub checkout: CheckoutConfig,
}
