pub mod app_config;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod location;
pub mod orders;
pub mod stores;

use thiserror::Error;

pub use app_config::{AdvisoryConfig, AppConfig, CheckoutConfig, Environment, LifecycleConfig};
pub use cart::{Cart, CartItem, CartOwner};
pub use catalog::{store_price_multiplier, BrandOption, Product, Variant};
pub use checkout::{mrp, payment_deadline, CheckoutQuote, PaymentSplit, PaymentStatus};
pub use config::{load_app_config, load_app_config_from_env};
pub use location::Coordinate;
pub use orders::{DeliveryType, Order, OrderMode, OrderStatus};
pub use stores::{load_stores, parse_stores, Store, StoreKind, StoresFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read stores file {path}: {source}")]
    StoresFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse stores file: {0}")]
    StoresFileParse(#[from] serde_yaml::Error),

    #[error("stores validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown order status: {0}")]
    UnknownStatus(String),
}
