//! Turns directions into something a map can draw.
//!
//! Every display path (a freshly planned trip, a saved route, the saved
//! routes overview) goes through here so decoding and framing happen the
//! same way everywhere.

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::haversine::StraightLineDirections;
use crate::polyline::{self, Polyline};
use crate::traits::{BoundsFitter, Directions, DirectionsError, DirectionsProvider, RouteLeg, TripRequest};
use crate::viewport::{Viewport, ViewportFitter};

/// A route ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteView {
    /// Path to draw, in route order.
    pub path: Polyline,
    /// Stop markers: every leg start plus the final destination.
    pub markers: Vec<Coordinate>,
    pub viewport: Viewport,
}

impl RouteView {
    /// Decodes the route geometry and frames it.
    ///
    /// A geometry that decodes to nothing is replaced by straight
    /// segments between the leg endpoints so the trip is still visible.
    pub fn from_directions(
        directions: &Directions,
        fitter: &ViewportFitter,
        surface: Option<&dyn BoundsFitter>,
    ) -> Self {
        let markers = leg_endpoints(&directions.legs);
        let mut path = Polyline::decode(&directions.encoded_polyline);

        if path.is_empty() && !markers.is_empty() {
            tracing::debug!(
                legs = directions.legs.len(),
                "route geometry is empty, drawing straight segments between stops"
            );
            path = Polyline::new(markers.clone());
        }

        let mut framed = path.points().to_vec();
        framed.extend_from_slice(&markers);
        let viewport = fitter.fit_with_surface(&framed, surface);

        Self {
            path,
            markers,
            viewport,
        }
    }
}

fn leg_endpoints(legs: &[RouteLeg]) -> Vec<Coordinate> {
    let mut endpoints: Vec<Coordinate> = legs.iter().map(|leg| leg.start).collect();
    if let Some(last) = legs.last() {
        endpoints.push(last.end);
    }
    endpoints
}

/// Viewport framing every saved route at once.
pub fn overview_viewport<S>(encoded_routes: &[S], fitter: &ViewportFitter) -> Viewport
where
    S: AsRef<str> + Sync,
{
    let points: Vec<Coordinate> = polyline::decode_all(encoded_routes)
        .into_iter()
        .flat_map(Polyline::into_points)
        .collect();
    fitter.fit(&points)
}

/// Result of [`TripPlanner::plan`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedTrip {
    pub directions: Directions,
    pub view: RouteView,
    /// Set when the primary provider failed and the fallback answered.
    pub used_fallback: bool,
}

impl PlannedTrip {
    /// The request's intermediate stops in visiting order.
    pub fn ordered_stops(&self, request: &TripRequest) -> Vec<Coordinate> {
        self.directions
            .stop_order
            .iter()
            .filter_map(|&i| request.stops.get(i).copied())
            .collect()
    }
}

/// Plans a trip with a primary provider and an optional fallback.
pub struct TripPlanner<P, F = StraightLineDirections> {
    primary: P,
    fallback: Option<F>,
    fitter: ViewportFitter,
}

impl<P: DirectionsProvider> TripPlanner<P> {
    pub fn new(primary: P) -> Self {
        Self {
            primary,
            fallback: None,
            fitter: ViewportFitter::default(),
        }
    }
}

impl<P: DirectionsProvider, F: DirectionsProvider> TripPlanner<P, F> {
    pub fn with_fallback<G: DirectionsProvider>(self, fallback: G) -> TripPlanner<P, G> {
        TripPlanner {
            primary: self.primary,
            fallback: Some(fallback),
            fitter: self.fitter,
        }
    }

    pub fn with_fitter(mut self, fitter: ViewportFitter) -> Self {
        self.fitter = fitter;
        self
    }

    pub fn fitter(&self) -> &ViewportFitter {
        &self.fitter
    }

    pub fn plan(
        &self,
        request: &TripRequest,
        surface: Option<&dyn BoundsFitter>,
    ) -> Result<PlannedTrip, DirectionsError> {
        request.validate()?;

        let (directions, used_fallback) = match self.primary.directions_for(request) {
            Ok(directions) => (directions, false),
            Err(err) => {
                let Some(fallback) = &self.fallback else {
                    return Err(err);
                };
                tracing::warn!(error = %err, "directions provider failed, using fallback");
                (fallback.directions_for(request)?, true)
            }
        };

        let view = RouteView::from_directions(&directions, &self.fitter, surface);

        Ok(PlannedTrip {
            directions,
            view,
            used_fallback,
        })
    }
}
