//! Store directories: where the list of candidate stores comes from.

use std::cmp::Ordering;

use grocesphere_core::{Coordinate, Store, StoreKind};
use serde::Serialize;

use crate::geo::{distance_km, format_distance};

/// Source of the stores serving a location.
///
/// An empty result means "no service area here" and is not an error.
pub trait StoreDirectory: Send + Sync {
    fn stores_near(&self, at: Coordinate) -> Vec<Store>;
}

/// Sort `stores` by distance from `at`, closest first. Equal distances keep
/// their input order.
pub fn sort_by_distance(stores: &mut [Store], at: Coordinate) {
    stores.sort_by(|a, b| {
        distance_km(at, a.location())
            .partial_cmp(&distance_km(at, b.location()))
            .unwrap_or(Ordering::Equal)
    });
}

/// A store as presented in a nearby-stores list.
#[derive(Debug, Clone, Serialize)]
pub struct StoreListing {
    #[serde(flatten)]
    pub store: Store,
    pub distance_km: f64,
    /// Rounded for display, e.g. `"1.2 km"`.
    pub distance: String,
}

/// Annotate already-sorted `stores` with their distance from `at`.
#[must_use]
pub fn listings(stores: Vec<Store>, at: Coordinate) -> Vec<StoreListing> {
    stores
        .into_iter()
        .map(|store| {
            let km = distance_km(at, store.location());
            StoreListing {
                store,
                distance_km: km,
                distance: format_distance(km),
            }
        })
        .collect()
}

/// A fixed list of stores (typically loaded from YAML), filtered to open
/// stores within a search radius.
#[derive(Debug, Clone)]
pub struct StaticDirectory {
    stores: Vec<Store>,
    radius_km: f64,
}

impl StaticDirectory {
    #[must_use]
    pub fn new(stores: Vec<Store>, radius_km: f64) -> Self {
        Self { stores, radius_km }
    }
}

impl StoreDirectory for StaticDirectory {
    fn stores_near(&self, at: Coordinate) -> Vec<Store> {
        if !at.is_known() {
            return Vec::new();
        }
        let mut nearby: Vec<Store> = self
            .stores
            .iter()
            .filter(|s| s.is_open && distance_km(at, s.location()) <= self.radius_km)
            .cloned()
            .collect();
        sort_by_distance(&mut nearby, at);
        tracing::debug!(%at, count = nearby.len(), "directory: stores near location");
        nearby
    }
}

/// Demo mode: two stores generated right next to the caller, plus the
/// static directory's stores.
#[derive(Debug, Clone)]
pub struct DemoDirectory {
    inner: StaticDirectory,
    general_products: Vec<String>,
    produce_products: Vec<String>,
}

impl DemoDirectory {
    #[must_use]
    pub fn new(
        inner: StaticDirectory,
        general_products: Vec<String>,
        produce_products: Vec<String>,
    ) -> Self {
        Self {
            inner,
            general_products,
            produce_products,
        }
    }

    fn generated_around(&self, center: Coordinate) -> [Store; 2] {
        [
            Store {
                id: "demo-gen-1".to_string(),
                name: "Fresh Basket Supermarket".to_string(),
                address: "12, Main Road, Near Park".to_string(),
                lat: center.lat + 0.002,
                lng: center.lng + 0.002,
                kind: StoreKind::General,
                rating: 4.6,
                is_open: true,
                available_product_ids: self.general_products.clone(),
                upi_id: Some("freshbasket@oksbi".to_string()),
            },
            Store {
                id: "demo-prod-1".to_string(),
                name: "Green Leaf Organics".to_string(),
                address: "Market Lane, Opp. Station".to_string(),
                lat: center.lat - 0.0015,
                lng: center.lng + 0.001,
                kind: StoreKind::Produce,
                rating: 4.9,
                is_open: true,
                available_product_ids: self.produce_products.clone(),
                upi_id: Some("greenleaf@okhdfc".to_string()),
            },
        ]
    }
}

impl StoreDirectory for DemoDirectory {
    fn stores_near(&self, at: Coordinate) -> Vec<Store> {
        if !at.is_known() {
            return Vec::new();
        }
        let mut stores: Vec<Store> = self.generated_around(at).into_iter().collect();
        stores.extend(self.inner.stores_near(at));
        sort_by_distance(&mut stores, at);
        stores
    }
}
