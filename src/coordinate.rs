//! Geographic coordinates and bounding boxes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A (latitude, longitude) pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Whether the coordinate can be placed on a map.
    ///
    /// `(0, 0)` is the "unset" sentinel and is never valid.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
            && !(self.latitude == 0.0 && self.longitude == 0.0)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self { latitude, longitude }
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(coordinate: Coordinate) -> Self {
        (coordinate.latitude, coordinate.longitude)
    }
}

/// Axis-aligned bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Bounding box of the given coordinates, or `None` when empty.
    pub fn from_coordinates(coordinates: &[Coordinate]) -> Option<Self> {
        let (first, rest) = coordinates.split_first()?;
        let mut bounds = Bounds {
            min_lat: first.latitude,
            max_lat: first.latitude,
            min_lng: first.longitude,
            max_lng: first.longitude,
        };

        for c in rest {
            bounds.min_lat = bounds.min_lat.min(c.latitude);
            bounds.max_lat = bounds.max_lat.max(c.latitude);
            bounds.min_lng = bounds.min_lng.min(c.longitude);
            bounds.max_lng = bounds.max_lng.max(c.longitude);
        }

        Some(bounds)
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lng_span(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    /// The larger of the latitude and longitude spans.
    pub fn span(&self) -> f64 {
        self.lat_span().max(self.lng_span())
    }
}
