use serde::{Deserialize, Serialize};

/// A WGS84 point in decimal degrees.
///
/// `(0, 0)` is the "unknown location" sentinel used by upstream sources that
/// have no coordinate to report; see [`Coordinate::is_known`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `false` for the `(0, 0)` sentinel.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !(self.lat == 0.0 && self.lng == 0.0)
    }

    /// Returns `true` when both components are finite and inside WGS84 bounds.
    #[must_use]
    pub fn in_range(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Converts the sentinel into `None` so callers can treat it as absent.
    #[must_use]
    pub fn known(self) -> Option<Self> {
        self.is_known().then_some(self)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_the_unknown_sentinel() {
        assert!(!Coordinate::new(0.0, 0.0).is_known());
        assert!(Coordinate::new(0.0, 0.0).known().is_none());
    }

    #[test]
    fn equator_or_meridian_alone_is_still_known() {
        assert!(Coordinate::new(0.0, 77.59).is_known());
        assert!(Coordinate::new(12.97, 0.0).is_known());
    }

    #[test]
    fn in_range_rejects_out_of_bounds_and_nan() {
        assert!(Coordinate::new(12.97, 77.59).in_range());
        assert!(!Coordinate::new(91.0, 0.0).in_range());
        assert!(!Coordinate::new(0.0, -181.0).in_range());
        assert!(!Coordinate::new(f64::NAN, 10.0).in_range());
    }
}
