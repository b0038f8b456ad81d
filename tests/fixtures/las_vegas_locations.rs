//! Real Las Vegas / Henderson locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap via Overpass API.
//! These are real, routable locations that work with OSRM Nevada data.

use trip_planner::coordinate::Coordinate;
use trip_planner::traits::TripRequest;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

// ============================================================================
// Strip (tight cluster, a few hundred meters apart)
// ============================================================================

pub const STRIP: &[Location] = &[
    Location::new("Wynn Las Vegas", 36.1263781, -115.1658180),
    Location::new("Caesars Palace", 36.1162, -115.1745),
    Location::new("Bellagio", 36.1126, -115.1767),
    Location::new("Hard Rock Cafe", 36.1041592, -115.1722166),
    Location::new("MGM Grand", 36.1023654, -115.1688720),
    Location::new("Brooklyn Bowl", 36.1175388, -115.1695094),
];

// ============================================================================
// Henderson / East Las Vegas
// ============================================================================

pub const HENDERSON: &[Location] = &[
    Location::new("I Love Sushi Henderson", 35.9916660, -115.1028343),
    Location::new("Islander's Grill", 36.0335058, -114.9856162),
    Location::new("Green Valley Ranch Area", 36.0308, -115.0825),
    Location::new("Sunset Station Area", 36.0614, -115.0631),
];

// ============================================================================
// Outlying
// ============================================================================

pub const NORTH_VEGAS: &[Location] = &[
    Location::new("Rivas Mexican Grill North", 36.1450055, -115.0482587),
    Location::new("Beers and Bets", 36.1428945, -115.1573836),
];

/// Reno, a long way from everything else here.
pub const RENO: Location = Location::new("Reno Arch", 39.5296, -119.8138);

/// Every fixture location, Strip first.
pub fn all_locations() -> Vec<&'static Location> {
    STRIP
        .iter()
        .chain(HENDERSON.iter())
        .chain(NORTH_VEGAS.iter())
        .collect()
}

/// Rounds to the five decimal places the polyline format keeps.
pub fn rounded(c: Coordinate) -> Coordinate {
    Coordinate::new(
        (c.latitude * 1e5).round() / 1e5,
        (c.longitude * 1e5).round() / 1e5,
    )
}

/// A Strip-to-Henderson trip with a few stops in between.
pub fn strip_to_henderson() -> TripRequest {
    TripRequest::new(STRIP[0].coordinate(), HENDERSON[0].coordinate()).with_stops(vec![
        STRIP[3].coordinate(),
        HENDERSON[2].coordinate(),
        STRIP[1].coordinate(),
    ])
}
