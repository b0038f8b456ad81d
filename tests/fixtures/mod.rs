//! Test fixtures for trip-planner.
//!
//! Provides realistic test data including:
//! - Real Las Vegas / Henderson locations (from OpenStreetMap)
//! - Trip request builders over those locations
//! - OSRM dataset preparation for the container-backed tests

#![allow(dead_code)]

pub mod las_vegas_locations;
pub mod osrm_dataset;

pub use las_vegas_locations::*;
