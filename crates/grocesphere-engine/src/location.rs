//! Location sample filtering in front of the advisory.

use grocesphere_core::Coordinate;

use crate::geo::distance_km;

/// Minimum movement, in kilometres, before a new sample is passed on.
pub const DEFAULT_MIN_MOVEMENT_KM: f64 = 0.02;

/// Drops samples that moved less than `min_movement_km` from the last
/// accepted one, so jittery GPS does not re-run the advisory.
#[derive(Debug, Clone)]
pub struct MovementFilter {
    min_movement_km: f64,
    last: Option<Coordinate>,
}

impl Default for MovementFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_MOVEMENT_KM)
    }
}

impl MovementFilter {
    #[must_use]
    pub fn new(min_movement_km: f64) -> Self {
        Self {
            min_movement_km,
            last: None,
        }
    }

    #[must_use]
    pub fn last(&self) -> Option<Coordinate> {
        self.last
    }

    /// Returns the sample if it should be forwarded, recording it as the new
    /// reference point. Unknown locations are never forwarded.
    pub fn accept(&mut self, sample: Coordinate) -> Option<Coordinate> {
        let sample = sample.known()?;
        if let Some(last) = self.last {
            if distance_km(last, sample) < self.min_movement_km {
                return None;
            }
        }
        self.last = Some(sample);
        Some(sample)
    }
}
