use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;

use rust_decimal::Decimal;

use crate::app_config::{
    AdvisoryConfig, AppConfig, CheckoutConfig, Environment, LifecycleConfig,
};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse = |var: &str, default: &str| -> Result<f64, ConfigError> {
        parse_value::<f64>(var, &or_default(var, default))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_value::<u64>(var, &or_default(var, default))
    };

    let env = parse_environment(&or_default("GROCESPHERE_ENV", "development"))?;
    let log_level = or_default("GROCESPHERE_LOG_LEVEL", "info");
    let stores_path = PathBuf::from(or_default(
        "GROCESPHERE_STORES_PATH",
        "./config/stores.yaml",
    ));

    let search_radius_km = positive(
        "GROCESPHERE_SEARCH_RADIUS_KM",
        parse("GROCESPHERE_SEARCH_RADIUS_KM", "15")?,
    )?;

    let rng_seed = match lookup("GROCESPHERE_RNG_SEED") {
        Ok(raw) => Some(parse_value::<u64>("GROCESPHERE_RNG_SEED", &raw)?),
        Err(_) => None,
    };

    let advisory = AdvisoryConfig {
        cooldown: Duration::from_secs(parse_u64("GROCESPHERE_SWITCH_COOLDOWN_SECS", "60")?),
        arrival_radius_km: positive(
            "GROCESPHERE_ARRIVAL_RADIUS_KM",
            parse("GROCESPHERE_ARRIVAL_RADIUS_KM", "0.5")?,
        )?,
        far_threshold_km: positive(
            "GROCESPHERE_FAR_THRESHOLD_KM",
            parse("GROCESPHERE_FAR_THRESHOLD_KM", "2.0")?,
        )?,
        better_option_ratio: ratio(
            "GROCESPHERE_BETTER_OPTION_RATIO",
            parse("GROCESPHERE_BETTER_OPTION_RATIO", "0.7")?,
        )?,
    };

    let tick_secs = parse_u64("GROCESPHERE_LIFECYCLE_TICK_SECS", "10")?;
    let driver_tick_ms = parse_u64("GROCESPHERE_DRIVER_TICK_MS", "1000")?;
    if tick_secs == 0 {
        return Err(invalid("GROCESPHERE_LIFECYCLE_TICK_SECS", "must be at least 1"));
    }
    if driver_tick_ms == 0 {
        return Err(invalid("GROCESPHERE_DRIVER_TICK_MS", "must be at least 1"));
    }
    let horizon_mins = parse_value::<i64>(
        "GROCESPHERE_SIMULATION_HORIZON_MINS",
        &or_default("GROCESPHERE_SIMULATION_HORIZON_MINS", "30"),
    )?;
    let simulation_horizon = TimeDelta::try_minutes(horizon_mins)
        .filter(|d| *d > TimeDelta::zero())
        .ok_or_else(|| {
            invalid(
                "GROCESPHERE_SIMULATION_HORIZON_MINS",
                "must be a positive minute count",
            )
        })?;

    let lifecycle = LifecycleConfig {
        tick_interval: Duration::from_secs(tick_secs),
        driver_tick_interval: Duration::from_millis(driver_tick_ms),
        simulation_horizon,
        ..LifecycleConfig::default()
    };

    let minimum_order_value = parse_value::<Decimal>(
        "GROCESPHERE_MIN_ORDER_VALUE",
        &or_default("GROCESPHERE_MIN_ORDER_VALUE", "1000"),
    )?;
    let base_delivery_fee = parse_value::<Decimal>(
        "GROCESPHERE_DELIVERY_FEE",
        &or_default("GROCESPHERE_DELIVERY_FEE", "30"),
    )?;
    if minimum_order_value.is_sign_negative() {
        return Err(invalid("GROCESPHERE_MIN_ORDER_VALUE", "must not be negative"));
    }
    if base_delivery_fee.is_sign_negative() {
        return Err(invalid("GROCESPHERE_DELIVERY_FEE", "must not be negative"));
    }
    let checkout = CheckoutConfig {
        minimum_order_value,
        base_delivery_fee,
        ..CheckoutConfig::default()
    };

    Ok(AppConfig {
        env,
        log_level,
        stores_path,
        search_radius_km,
        rng_seed,
        advisory,
        lifecycle,
        checkout,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

fn invalid(var: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(var: &str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(var, "must be a positive number"))
    }
}

fn ratio(var: &str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(invalid(var, "must be in (0, 1]"))
    }
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GROCESPHERE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
