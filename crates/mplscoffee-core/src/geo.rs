//! Coordinates and the rectangular geofence used to accept or reject
//! search candidates.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Inclusive latitude/longitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// City of Minneapolis, as shipped in `config/region.yaml`.
    pub const MINNEAPOLIS: Self = Self {
        min_lat: 44.889_4,
        max_lat: 45.051_2,
        min_lng: -93.329_9,
        max_lng: -93.195_1,
    };

    /// Returns `true` when `point` lies on or inside the box.
    ///
    /// `NaN` coordinates never match.
    #[must_use]
    pub fn contains(&self, point: Coordinates) -> bool {
        self.min_lat <= point.lat
            && point.lat <= self.max_lat
            && self.min_lng <= point.lng
            && point.lng <= self.max_lng
    }

    /// Checks axis ordering and coordinate ranges.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the box is unusable.
    pub fn validate(&self) -> Result<(), String> {
        let finite = [self.min_lat, self.max_lat, self.min_lng, self.max_lng]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err("bounding box values must be finite".to_string());
        }
        if self.min_lat > self.max_lat {
            return Err(format!(
                "min_lat {} is greater than max_lat {}",
                self.min_lat, self.max_lat
            ));
        }
        if self.min_lng > self.max_lng {
            return Err(format!(
                "min_lng {} is greater than max_lng {}",
                self.min_lng, self.max_lng
            ));
        }
        if self.min_lat < -90.0 || self.max_lat > 90.0 {
            return Err("latitudes must be within [-90, 90]".to_string());
        }
        if self.min_lng < -180.0 || self.max_lng > 180.0 {
            return Err("longitudes must be within [-180, 180]".to_string());
        }
        Ok(())
    }
}
