//! Collaborator seams for the trip planner.
//!
//! The planner consumes two external services: a directions provider that
//! orders stops and returns a route geometry, and a rendering surface that
//! may know how to frame a bounding box better than the coarse zoom table.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coordinate::{Bounds, Coordinate};
use crate::polyline::EncodeError;
use crate::viewport::{EdgeInsets, Viewport};

/// A trip to route: fixed start and destination with intermediate stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub start: Coordinate,
    pub destination: Coordinate,
    pub stops: Vec<Coordinate>,
    /// Let the provider reorder `stops` to shorten the trip.
    pub optimize: bool,
}

impl TripRequest {
    pub fn new(start: Coordinate, destination: Coordinate) -> Self {
        Self {
            start,
            destination,
            stops: Vec::new(),
            optimize: true,
        }
    }

    pub fn with_stops(mut self, stops: Vec<Coordinate>) -> Self {
        self.stops = stops;
        self
    }

    pub fn optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    /// All waypoints in request order: start, stops, destination.
    pub fn waypoints(&self) -> Vec<Coordinate> {
        let mut waypoints = Vec::with_capacity(self.stops.len() + 2);
        waypoints.push(self.start);
        waypoints.extend_from_slice(&self.stops);
        waypoints.push(self.destination);
        waypoints
    }

    /// Rejects coordinates that cannot be routed.
    pub fn validate(&self) -> Result<(), DirectionsError> {
        for (index, waypoint) in self.waypoints().into_iter().enumerate() {
            if !waypoint.is_valid() {
                return Err(DirectionsError::InvalidCoordinate {
                    index,
                    coordinate: waypoint,
                });
            }
        }
        Ok(())
    }
}

/// One driving leg between consecutive waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub start: Coordinate,
    pub end: Coordinate,
    pub distance_meters: f64,
    pub duration_secs: f64,
}

/// A directions response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directions {
    /// Route geometry in encoded polyline format (precision 5).
    pub encoded_polyline: String,
    pub legs: Vec<RouteLeg>,
    /// Visiting order of the intermediate stops, as indices into
    /// [`TripRequest::stops`].
    pub stop_order: Vec<usize>,
    pub distance_meters: f64,
    pub duration_secs: f64,
}

/// Errors returned by a [`DirectionsProvider`].
#[derive(Debug, Error)]
pub enum DirectionsError {
    #[error("waypoint {index} has an invalid coordinate {coordinate}")]
    InvalidCoordinate { index: usize, coordinate: Coordinate },

    #[error("directions request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("directions service returned {code}: {message}")]
    Service { code: String, message: String },

    #[error("directions response contained no route")]
    NoRoute,

    #[error("malformed directions response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Provides an ordered, driveable route for a trip.
pub trait DirectionsProvider {
    fn directions_for(&self, request: &TripRequest) -> Result<Directions, DirectionsError>;
}

/// A rendering surface that can frame a bounding box itself.
///
/// Returning `None` means the surface cannot answer (not laid out yet,
/// headless, ...) and the coarse fit is used unchanged.
pub trait BoundsFitter {
    fn fit_bounds(&self, bounds: &Bounds, padding: &EdgeInsets) -> Option<Viewport>;
}

impl<T: DirectionsProvider + ?Sized> DirectionsProvider for &T {
    fn directions_for(&self, request: &TripRequest) -> Result<Directions, DirectionsError> {
        (**self).directions_for(request)
    }
}
