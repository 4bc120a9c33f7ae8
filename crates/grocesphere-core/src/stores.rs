use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::location::Coordinate;
use crate::ConfigError;

/// Store category. Drives map marker colour and the default inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    General,
    Produce,
    Dairy,
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKind::General => write!(f, "general"),
            StoreKind::Produce => write!(f, "produce"),
            StoreKind::Dairy => write!(f, "dairy"),
        }
    }
}

fn default_open() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "type")]
    pub kind: StoreKind,
    #[serde(default)]
    pub rating: f64,
    #[serde(default = "default_open")]
    pub is_open: bool,
    #[serde(default)]
    pub available_product_ids: Vec<String>,
    pub upi_id: Option<String>,
}

impl Store {
    #[must_use]
    pub fn location(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    /// Demo and crawled stores carry an id prefix; their inventory comes
    /// from the bundled catalog rather than a live backend.
    #[must_use]
    pub fn is_external(&self) -> bool {
        ["demo-", "local-", "osm-", "blr-"]
            .iter()
            .any(|prefix| self.id.starts_with(prefix))
    }

    #[must_use]
    pub fn stocks(&self, product_id: &str) -> bool {
        self.available_product_ids.iter().any(|p| p == product_id)
    }
}

/// A store directory file: the stores and, optionally, the catalog they draw
/// their inventory from.
#[derive(Debug, Default, Deserialize)]
pub struct StoresFile {
    pub stores: Vec<Store>,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl StoresFile {
    #[must_use]
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

/// Load and validate a store directory from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_stores(path: &Path) -> Result<StoresFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StoresFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_stores(&content)
}

/// Parse and validate a store directory from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_stores(content: &str) -> Result<StoresFile, ConfigError> {
    let stores_file: StoresFile = serde_yaml::from_str(content)?;
    validate_stores(&stores_file)?;
    Ok(stores_file)
}

fn validate_stores(stores_file: &StoresFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for store in &stores_file.stores {
        if store.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store id must be non-empty".to_string(),
            ));
        }

        if store.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "store '{}' has an empty name",
                store.id
            )));
        }

        let location = store.location();
        if !location.in_range() || !location.is_known() {
            return Err(ConfigError::Validation(format!(
                "store '{}' has invalid coordinates {location}",
                store.id
            )));
        }

        if !(0.0..=5.0).contains(&store.rating) {
            return Err(ConfigError::Validation(format!(
                "store '{}' has invalid rating {}; must be between 0 and 5",
                store.id, store.rating
            )));
        }

        if !seen_ids.insert(store.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate store id: '{}'",
                store.id
            )));
        }
    }

    validate_products(&stores_file.products)
}

fn validate_products(products: &[Product]) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for product in products {
        if product.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "product id must be non-empty".to_string(),
            ));
        }

        let negative_brand = product.brands.iter().any(|b| b.price.is_sign_negative());
        if product.price.is_sign_negative() || negative_brand {
            return Err(ConfigError::Validation(format!(
                "product '{}' has a negative price",
                product.id
            )));
        }

        if product
            .variants
            .iter()
            .any(|v| v.multiplier <= rust_decimal::Decimal::ZERO)
        {
            return Err(ConfigError::Validation(format!(
                "product '{}' has a non-positive variant multiplier",
                product.id
            )));
        }

        if !seen_ids.insert(product.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate product id: '{}'",
                product.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "stores_test.rs"]
mod tests;
