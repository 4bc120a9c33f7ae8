//! Builds the store directory for a CLI run from the configured YAML file.

use std::collections::BTreeSet;

use grocesphere_core::{load_stores, AppConfig, Product, Store, StoreKind, StoresFile};
use grocesphere_engine::{DemoDirectory, StaticDirectory, StoreDirectory};

pub(crate) struct LoadedDirectory {
    pub(crate) directory: Box<dyn StoreDirectory>,
    pub(crate) catalog: Vec<Product>,
}

/// Load the stores file and wrap it in the directory the run asked for.
///
/// # Errors
///
/// Returns an error if the stores file cannot be read or fails validation.
pub(crate) fn load_directory(config: &AppConfig, demo: bool) -> anyhow::Result<LoadedDirectory> {
    let StoresFile { stores, products } = load_stores(&config.stores_path)?;
    tracing::info!(
        path = %config.stores_path.display(),
        stores = stores.len(),
        products = products.len(),
        "cli: store directory loaded"
    );

    let directory: Box<dyn StoreDirectory> = if demo {
        let produce = stocked_by_kind(&stores, StoreKind::Produce);
        let general = products.iter().map(|p| p.id.clone()).collect();
        Box::new(DemoDirectory::new(
            StaticDirectory::new(stores, config.search_radius_km),
            general,
            produce,
        ))
    } else {
        Box::new(StaticDirectory::new(stores, config.search_radius_km))
    };

    Ok(LoadedDirectory {
        directory,
        catalog: products,
    })
}

/// Every product id stocked by at least one store of `kind`.
fn stocked_by_kind(stores: &[Store], kind: StoreKind) -> Vec<String> {
    stores
        .iter()
        .filter(|s| s.kind == kind)
        .flat_map(|s| s.available_product_ids.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
