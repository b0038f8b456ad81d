//! Viewport fitting for multi-stop routes.
//!
//! The coarse fit picks a zoom from the larger side of the bounding box
//! using a [`ZoomTable`]. When a rendering surface is available it may
//! refine that into a padded camera; the refined zoom is clamped so very
//! tight or very sparse routes do not end up at an extreme zoom.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coordinate::{Bounds, Coordinate};
use crate::traits::BoundsFitter;

/// Geographic center of the contiguous United States.
pub const DEFAULT_CENTER: Coordinate = Coordinate::new(39.8283, -98.5795);

/// Zoom used when there is nothing to frame.
pub const FALLBACK_ZOOM: f64 = 4.0;

/// Street-level zoom for a single point.
pub const SINGLE_POINT_ZOOM: f64 = 15.0;

pub const MIN_REFINED_ZOOM: f64 = 10.0;
pub const MAX_REFINED_ZOOM: f64 = 18.0;

/// Screen padding in points, handed to the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeInsets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl EdgeInsets {
    pub const fn uniform(inset: f64) -> Self {
        Self {
            top: inset,
            left: inset,
            bottom: inset,
            right: inset,
        }
    }
}

impl Default for EdgeInsets {
    fn default() -> Self {
        Self::uniform(50.0)
    }
}

/// Map camera: a center and a zoom level (larger is closer).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: f64,
}

impl Viewport {
    pub const fn new(center: Coordinate, zoom: f64) -> Self {
        Self { center, zoom }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER, FALLBACK_ZOOM)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewportError {
    #[error("zoom table entries must be finite (span {span}, zoom {zoom})")]
    NonFinite { span: f64, zoom: f64 },

    #[error("zoom {zoom} for spans above {span} is closer than a narrower breakpoint")]
    NotMonotonic { span: f64, zoom: f64 },

    #[error("zoom levels must be positive, got {zoom}")]
    NonPositiveZoom { zoom: f64 },
}

/// Spans strictly wider than `min_span` degrees get `zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomBreakpoint {
    pub min_span: f64,
    pub zoom: f64,
}

impl ZoomBreakpoint {
    pub const fn new(min_span: f64, zoom: f64) -> Self {
        Self { min_span, zoom }
    }
}

/// Lookup from bounding-box span to zoom level.
///
/// The default breakpoints were tuned by eye against one map SDK's
/// projection. Other projections can supply their own table; it only has
/// to keep "wider span, lower zoom". Build custom tables through
/// [`ZoomTable::new`] so that ordering is checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomTable {
    breakpoints: Vec<ZoomBreakpoint>,
    closest_zoom: f64,
}

impl ZoomTable {
    /// Builds a table, ordering breakpoints from widest to narrowest.
    ///
    /// `closest_zoom` applies when the span exceeds no breakpoint.
    pub fn new(mut breakpoints: Vec<ZoomBreakpoint>, closest_zoom: f64) -> Result<Self, ViewportError> {
        for b in &breakpoints {
            if !b.min_span.is_finite() || !b.zoom.is_finite() {
                return Err(ViewportError::NonFinite {
                    span: b.min_span,
                    zoom: b.zoom,
                });
            }
        }
        if !closest_zoom.is_finite() {
            return Err(ViewportError::NonFinite {
                span: 0.0,
                zoom: closest_zoom,
            });
        }
        if let Some(zoom) = breakpoints
            .iter()
            .map(|b| b.zoom)
            .chain(std::iter::once(closest_zoom))
            .find(|&zoom| zoom <= 0.0)
        {
            return Err(ViewportError::NonPositiveZoom { zoom });
        }

        breakpoints.sort_by(|a, b| b.min_span.total_cmp(&a.min_span));

        for pair in breakpoints.windows(2) {
            if pair[0].zoom > pair[1].zoom {
                return Err(ViewportError::NotMonotonic {
                    span: pair[0].min_span,
                    zoom: pair[0].zoom,
                });
            }
        }
        if let Some(last) = breakpoints.last() {
            if last.zoom > closest_zoom {
                return Err(ViewportError::NotMonotonic {
                    span: last.min_span,
                    zoom: last.zoom,
                });
            }
        }

        Ok(Self {
            breakpoints,
            closest_zoom,
        })
    }

    /// Zoom for a span in degrees.
    pub fn zoom_for_span(&self, span: f64) -> f64 {
        self.breakpoints
            .iter()
            .find(|b| span > b.min_span)
            .map_or(self.closest_zoom, |b| b.zoom)
    }

    pub fn breakpoints(&self) -> &[ZoomBreakpoint] {
        &self.breakpoints
    }

    pub fn closest_zoom(&self) -> f64 {
        self.closest_zoom
    }
}

impl Default for ZoomTable {
    fn default() -> Self {
        Self {
            breakpoints: vec![
                ZoomBreakpoint::new(10.0, 5.0),
                ZoomBreakpoint::new(1.0, 8.0),
                ZoomBreakpoint::new(0.1, 12.0),
                ZoomBreakpoint::new(0.01, 15.0),
            ],
            closest_zoom: 17.0,
        }
    }
}

/// Tunables for [`ViewportFitter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitterConfig {
    /// Returned when no valid coordinate is left to frame.
    pub fallback: Viewport,
    pub single_point_zoom: f64,
    /// Padding requested from the rendering surface.
    pub padding: EdgeInsets,
    pub min_refined_zoom: f64,
    pub max_refined_zoom: f64,
}

impl Default for FitterConfig {
    fn default() -> Self {
        Self {
            fallback: Viewport::default(),
            single_point_zoom: SINGLE_POINT_ZOOM,
            padding: EdgeInsets::default(),
            min_refined_zoom: MIN_REFINED_ZOOM,
            max_refined_zoom: MAX_REFINED_ZOOM,
        }
    }
}

/// Picks a center and zoom that frame a set of coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportFitter {
    table: ZoomTable,
    config: FitterConfig,
}

impl ViewportFitter {
    pub fn new(table: ZoomTable, config: FitterConfig) -> Self {
        Self { table, config }
    }

    pub fn table(&self) -> &ZoomTable {
        &self.table
    }

    pub fn config(&self) -> &FitterConfig {
        &self.config
    }

    /// Coarse fit from the zoom table alone.
    pub fn fit(&self, coordinates: &[Coordinate]) -> Viewport {
        self.fit_with_surface(coordinates, None)
    }

    /// Fits the coordinates, letting `surface` refine multi-point fits.
    ///
    /// Invalid coordinates (out of range or the `(0, 0)` sentinel) are
    /// ignored. Always returns a usable viewport.
    pub fn fit_with_surface(
        &self,
        coordinates: &[Coordinate],
        surface: Option<&dyn BoundsFitter>,
    ) -> Viewport {
        let valid: Vec<Coordinate> = coordinates.iter().copied().filter(|c| c.is_valid()).collect();

        match valid.as_slice() {
            [] => {
                tracing::debug!(
                    input = coordinates.len(),
                    "no valid coordinates to frame, using fallback viewport"
                );
                self.config.fallback
            }
            [only] => Viewport::new(*only, self.config.single_point_zoom),
            _ => {
                let Some(bounds) = Bounds::from_coordinates(&valid) else {
                    return self.config.fallback;
                };
                let coarse = Viewport::new(bounds.center(), self.table.zoom_for_span(bounds.span()));

                match surface {
                    Some(surface) => self.refine(surface, &bounds, coarse),
                    None => coarse,
                }
            }
        }
    }

    fn refine(&self, surface: &dyn BoundsFitter, bounds: &Bounds, coarse: Viewport) -> Viewport {
        match surface.fit_bounds(bounds, &self.config.padding) {
            Some(camera) if camera.center.is_valid() && camera.zoom.is_finite() => {
                Viewport::new(camera.center, self.clamp_refined(camera.zoom))
            }
            Some(camera) => {
                tracing::debug!(?camera, "rendering surface returned an unusable camera");
                coarse
            }
            None => coarse,
        }
    }

    fn clamp_refined(&self, zoom: f64) -> f64 {
        zoom.max(self.config.min_refined_zoom)
            .min(self.config.max_refined_zoom)
    }
}

/// Fits coordinates with the default table and configuration.
pub fn fit_viewport(coordinates: &[Coordinate]) -> Viewport {
    ViewportFitter::default().fit(coordinates)
}
