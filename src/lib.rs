//! trip-planner core
//!
//! Route geometry decoding and map framing for multi-stop trips, plus the
//! directions providers that feed them.

pub mod coordinate;
pub mod haversine;
pub mod osrm;
pub mod polyline;
pub mod route_view;
pub mod traits;
pub mod viewport;

pub use coordinate::{Bounds, Coordinate};
pub use polyline::{decode, encode, EncodeError, Polyline};
pub use viewport::{fit_viewport, Viewport, ViewportFitter};
