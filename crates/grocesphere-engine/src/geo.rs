//! Great-circle distance and nearest-store selection.

use grocesphere_core::{Coordinate, Store};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points in kilometres.
///
/// Returns exactly `0.0` for identical points. The haversine term is clamped
/// to `[0, 1]` so rounding near antipodal inputs cannot produce `NaN`.
#[must_use]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// The store closest to `from`. Ties go to the earliest store in `stores`.
///
/// Returns `None` only for an empty slice.
#[must_use]
pub fn nearest(stores: &[Store], from: Coordinate) -> Option<&Store> {
    nearest_with_distance(stores, from).map(|(store, _)| store)
}

/// Like [`nearest`], also returning the distance in kilometres.
#[must_use]
pub fn nearest_with_distance(stores: &[Store], from: Coordinate) -> Option<(&Store, f64)> {
    let mut best: Option<(&Store, f64)> = None;
    for store in stores {
        let d = distance_km(from, store.location());
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((store, d)),
        }
    }
    best
}

/// Human-readable distance, e.g. `"1.2 km"`.
#[must_use]
pub fn format_distance(km: f64) -> String {
    format!("{km:.1} km")
}
