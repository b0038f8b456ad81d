//! Encoded polyline codec for route geometries.
//!
//! Directions providers ship route shapes in the compact delta/zig-zag
//! "encoded polyline" format. Decoding happens once at the boundary; the
//! rest of the planner works with [`Polyline`] values.
//!
//! Malformed input never fails: decoding stops at the first group that
//! cannot be completed and returns the coordinates read so far. Callers
//! should draw a short path rather than treat it as an error. Encoding
//! goes through the `polyline` crate; its decoder rejects truncated input
//! as a whole, so decoding is done here.

use geo_types::Coord;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coordinate::Coordinate;

/// Decimal places used by Google and the OSRM `polyline` geometry.
pub const DEFAULT_PRECISION: u32 = 5;

/// Largest shift that still fits a 5-bit group in a 64-bit accumulator.
const MAX_SHIFT: u32 = 60;

/// Coordinates that cannot be represented in the encoded format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot encode polyline: {0}")]
pub struct EncodeError(pub String);

/// A route geometry as an ordered sequence of decoded coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Decodes an encoded polyline at [`DEFAULT_PRECISION`].
    pub fn decode(encoded: &str) -> Self {
        Self::new(decode(encoded))
    }

    /// Encodes the points at [`DEFAULT_PRECISION`].
    pub fn encode(&self) -> Result<String, EncodeError> {
        encode(&self.points)
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl From<Vec<Coordinate>> for Polyline {
    fn from(points: Vec<Coordinate>) -> Self {
        Self::new(points)
    }
}

/// Decodes an encoded polyline at [`DEFAULT_PRECISION`].
pub fn decode(encoded: &str) -> Vec<Coordinate> {
    decode_with_precision(encoded, DEFAULT_PRECISION)
}

/// Decodes an encoded polyline whose values are scaled by `10^precision`.
///
/// Returns every coordinate decoded before the input ran out or became
/// unreadable. A latitude without its longitude is dropped.
pub fn decode_with_precision(encoded: &str, precision: u32) -> Vec<Coordinate> {
    let factor = scale_factor(precision);
    let bytes = encoded.as_bytes();
    let mut cursor = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut coordinates = Vec::new();
    let mut stopped_early = false;

    while cursor < bytes.len() {
        let Some(next_lat) = read_delta(bytes, &mut cursor).and_then(|d| lat.checked_add(d)) else {
            stopped_early = true;
            break;
        };
        let Some(next_lng) = read_delta(bytes, &mut cursor).and_then(|d| lng.checked_add(d)) else {
            stopped_early = true;
            break;
        };

        lat = next_lat;
        lng = next_lng;
        coordinates.push(Coordinate::new(lat as f64 / factor, lng as f64 / factor));
    }

    if stopped_early {
        tracing::debug!(
            decoded = coordinates.len(),
            consumed = cursor,
            length = bytes.len(),
            "polyline decode stopped early, returning partial geometry"
        );
    }

    coordinates
}

/// Decodes many encoded polylines in parallel, preserving input order.
pub fn decode_all<S>(encoded: &[S]) -> Vec<Polyline>
where
    S: AsRef<str> + Sync,
{
    encoded
        .par_iter()
        .map(|e| Polyline::decode(e.as_ref()))
        .collect()
}

/// Encodes coordinates at [`DEFAULT_PRECISION`].
pub fn encode(coordinates: &[Coordinate]) -> Result<String, EncodeError> {
    encode_with_precision(coordinates, DEFAULT_PRECISION)
}

/// Encodes coordinates scaled by `10^precision`, rounding each component.
///
/// Fails when a coordinate is outside the latitude/longitude range.
pub fn encode_with_precision(coordinates: &[Coordinate], precision: u32) -> Result<String, EncodeError> {
    let coords = coordinates.iter().map(|c| Coord {
        x: c.longitude,
        y: c.latitude,
    });
    ::polyline::encode_coordinates(coords, precision).map_err(|err| EncodeError(err.to_string()))
}

fn scale_factor(precision: u32) -> f64 {
    10f64.powi(precision.min(15) as i32)
}

/// Reads one zig-zag encoded value starting at `cursor`.
///
/// Returns `None` when the input ends mid-group or the group chain is
/// too long for 64 bits. The cursor is left wherever reading stopped.
fn read_delta(bytes: &[u8], cursor: &mut usize) -> Option<i64> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = *bytes.get(*cursor)?;
        *cursor += 1;

        if shift > MAX_SHIFT {
            return None;
        }

        let chunk = i64::from(byte) - 63;
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk & 0x20 == 0 {
            break;
        }
    }

    Some(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}
