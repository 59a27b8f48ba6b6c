//! Theoretical speed-of-light ping between two points on Earth, directly and
//! via the nearest submarine cable vertices.

pub mod cable;
pub mod cli;
pub mod endpoints;
pub mod error;
pub mod geo;
pub mod osm;
pub mod overpass;
pub mod report;

pub use cable::{
    estimate_cable_path, nearest_cable_vertex, CablePathEstimate, CablePolyline, NearestVertex,
};
pub use endpoints::{MarkerColor, RouteEndpoints, Selection};
pub use error::{Error, Result};
pub use geo::{
    degrees_to_radians, distance_km, format_latency, theoretical_latency_ms, GeoPoint,
    LatencyResult, PropagationModel,
};
pub use report::PingReport;
