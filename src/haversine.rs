//! Straight-line directions provider (fallback when OSRM is unavailable).
//!
//! Uses great-circle distance to estimate travel time and draws the route
//! as straight segments between waypoints. Less accurate than OSRM
//! (ignores roads) but always available.

use crate::coordinate::Coordinate;
use crate::polyline;
use crate::traits::{Directions, DirectionsError, DirectionsProvider, RouteLeg, TripRequest};

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine-based directions provider.
#[derive(Debug, Clone)]
pub struct StraightLineDirections {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for StraightLineDirections {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl StraightLineDirections {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Convert distance in km to travel time in seconds.
    fn km_to_seconds(&self, km: f64) -> f64 {
        (km / self.speed_kmh * 3600.0).round()
    }

    /// Greedy nearest-neighbour order over the stops, starting from `start`.
    fn nearest_neighbour_order(start: Coordinate, stops: &[Coordinate]) -> Vec<usize> {
        let mut remaining: Vec<usize> = (0..stops.len()).collect();
        let mut order = Vec::with_capacity(stops.len());
        let mut current = start;

        while !remaining.is_empty() {
            let mut best = 0;
            let mut best_km = f64::INFINITY;
            for (slot, &stop) in remaining.iter().enumerate() {
                let km = haversine_km(current, stops[stop]);
                if km < best_km {
                    best_km = km;
                    best = slot;
                }
            }
            let next = remaining.remove(best);
            current = stops[next];
            order.push(next);
        }

        order
    }
}

/// Great-circle distance between two points in kilometers.
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.latitude.to_radians();
    let lat2_rad = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lng = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

impl DirectionsProvider for StraightLineDirections {
    fn directions_for(&self, request: &TripRequest) -> Result<Directions, DirectionsError> {
        request.validate()?;

        let stop_order = if request.optimize {
            Self::nearest_neighbour_order(request.start, &request.stops)
        } else {
            (0..request.stops.len()).collect()
        };

        let mut waypoints = Vec::with_capacity(stop_order.len() + 2);
        waypoints.push(request.start);
        waypoints.extend(stop_order.iter().map(|&i| request.stops[i]));
        waypoints.push(request.destination);

        let legs: Vec<RouteLeg> = waypoints
            .windows(2)
            .map(|pair| {
                let km = haversine_km(pair[0], pair[1]);
                RouteLeg {
                    start: pair[0],
                    end: pair[1],
                    distance_meters: km * 1000.0,
                    duration_secs: self.km_to_seconds(km),
                }
            })
            .collect();

        Ok(Directions {
            encoded_polyline: polyline::encode(&waypoints)?,
            distance_meters: legs.iter().map(|leg| leg.distance_meters).sum(),
            duration_secs: legs.iter().map(|leg| leg.duration_secs).sum(),
            legs,
            stop_order,
        })
    }
}
