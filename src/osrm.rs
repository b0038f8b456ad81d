//! OSRM HTTP adapter for trip directions.
//!
//! Optimized trips go through the `trip` service with the start fixed
//! first and the destination fixed last. Ordered trips use `route`.

use serde::Deserialize;

use crate::coordinate::Coordinate;
use crate::traits::{Directions, DirectionsError, DirectionsProvider, RouteLeg, TripRequest};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

impl OsrmConfig {
    /// Defaults overridden by `OSRM_BASE_URL`, `OSRM_PROFILE` and
    /// `OSRM_TIMEOUT_SECS` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var("OSRM_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(profile) = std::env::var("OSRM_PROFILE") {
            config.profile = profile;
        }
        if let Ok(raw) = std::env::var("OSRM_TIMEOUT_SECS") {
            match raw.parse() {
                Ok(secs) => config.timeout_secs = secs,
                Err(_) => tracing::warn!(value = %raw, "ignoring unparseable OSRM_TIMEOUT_SECS"),
            }
        }

        config
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OsrmConfig {
        &self.config
    }

    fn url_for(&self, request: &TripRequest) -> String {
        let coords = request
            .waypoints()
            .iter()
            .map(|c| format!("{:.6},{:.6}", c.longitude, c.latitude))
            .collect::<Vec<_>>()
            .join(";");
        let base_url = self.config.base_url.trim_end_matches('/');

        if request.optimize {
            format!(
                "{}/trip/v1/{}/{}?source=first&destination=last&roundtrip=false&geometries=polyline&overview=full",
                base_url, self.config.profile, coords
            )
        } else {
            format!(
                "{}/route/v1/{}/{}?geometries=polyline&overview=full",
                base_url, self.config.profile, coords
            )
        }
    }
}

impl DirectionsProvider for OsrmClient {
    fn directions_for(&self, request: &TripRequest) -> Result<Directions, DirectionsError> {
        request.validate()?;

        let url = self.url_for(request);
        tracing::debug!(%url, stops = request.stops.len(), "requesting OSRM directions");

        // OSRM reports failures such as NoTrips as JSON on a 400, so the
        // body is parsed before the status is checked.
        let response = self.client.get(url).send()?;
        let status = response.status();
        let body = match response.json::<OsrmResponse>() {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(%status, error = %err, "unreadable OSRM response");
                return Err(err.into());
            }
        };

        body.into_directions(request)
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
    #[serde(default)]
    trips: Vec<OsrmRoute>,
    #[serde(default)]
    waypoints: Vec<OsrmWaypoint>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: String,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmWaypoint {
    /// `[longitude, latitude]` snapped to the road network.
    location: [f64; 2],
    /// Position in the trip; only set by the `trip` service.
    #[serde(default)]
    waypoint_index: Option<usize>,
}

impl OsrmResponse {
    fn into_directions(self, request: &TripRequest) -> Result<Directions, DirectionsError> {
        if self.code != "Ok" {
            return Err(DirectionsError::Service {
                code: self.code,
                message: self.message.unwrap_or_default(),
            });
        }

        let waypoint_count = request.stops.len() + 2;
        if self.waypoints.len() != waypoint_count {
            return Err(DirectionsError::MalformedResponse(format!(
                "expected {} waypoints, got {}",
                waypoint_count,
                self.waypoints.len()
            )));
        }

        let route = self
            .trips
            .into_iter()
            .next()
            .or_else(|| self.routes.into_iter().next())
            .ok_or(DirectionsError::NoRoute)?;

        let visit_order = visiting_order(&self.waypoints, request.optimize)?;
        if visit_order.first() != Some(&0) || visit_order.last() != Some(&(waypoint_count - 1)) {
            return Err(DirectionsError::MalformedResponse(
                "trip does not start and end at the fixed endpoints".to_string(),
            ));
        }

        if route.legs.len() != waypoint_count - 1 {
            return Err(DirectionsError::MalformedResponse(format!(
                "expected {} legs, got {}",
                waypoint_count - 1,
                route.legs.len()
            )));
        }

        let ordered: Vec<Coordinate> = visit_order
            .iter()
            .map(|&i| {
                let [lng, lat] = self.waypoints[i].location;
                Coordinate::new(lat, lng)
            })
            .collect();

        let legs = route
            .legs
            .iter()
            .zip(ordered.windows(2))
            .map(|(leg, pair)| RouteLeg {
                start: pair[0],
                end: pair[1],
                distance_meters: leg.distance,
                duration_secs: leg.duration,
            })
            .collect();

        let stop_order = visit_order[1..visit_order.len() - 1]
            .iter()
            .map(|&i| i - 1)
            .collect();

        Ok(Directions {
            encoded_polyline: route.geometry,
            legs,
            stop_order,
            distance_meters: route.distance,
            duration_secs: route.duration,
        })
    }
}

/// Input indices of the waypoints in the order they are visited.
fn visiting_order(waypoints: &[OsrmWaypoint], optimized: bool) -> Result<Vec<usize>, DirectionsError> {
    if !optimized {
        return Ok((0..waypoints.len()).collect());
    }

    let mut order: Vec<Option<usize>> = vec![None; waypoints.len()];
    for (input_index, waypoint) in waypoints.iter().enumerate() {
        let position = waypoint.waypoint_index.ok_or_else(|| {
            DirectionsError::MalformedResponse("trip waypoint without waypoint_index".to_string())
        })?;
        match order.get_mut(position) {
            Some(slot) if slot.is_none() => *slot = Some(input_index),
            _ => {
                return Err(DirectionsError::MalformedResponse(format!(
                    "invalid or repeated waypoint_index {}",
                    position
                )));
            }
        }
    }

    Ok(order.into_iter().flatten().collect())
}
