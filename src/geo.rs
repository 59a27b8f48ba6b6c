//! Great-circle distance and the speed-of-light latency model.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Speed of light in vacuum, km/s.
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Fraction of `c` at which light travels inside optical fiber.
pub const FIBER_FACTOR: f64 = 0.68;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns the point unchanged if it lies inside the valid lat/lon range.
    pub fn validated(self) -> Result<Self> {
        if (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon) {
            Ok(self)
        } else {
            Err(Error::OutOfRange {
                lat: self.lat,
                lon: self.lon,
            })
        }
    }

    /// `[lon, lat]`, the GeoJSON coordinate order.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

impl FromStr for GeoPoint {
    type Err = Error;

    /// Parses `"lat,lon"`. Range is not checked here, see [`GeoPoint::validated`].
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidPoint(s.to_string());
        let (lat, lon) = s.split_once(',').ok_or_else(invalid)?;
        let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;
        Ok(GeoPoint::new(lat, lon))
    }
}

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * (PI / 180.0)
}

/// Great-circle distance using the haversine formula.
/// Input lat/lon in degrees. Output in kilometers.
pub fn distance_km(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let dlat = degrees_to_radians(p2.lat - p1.lat);
    let dlon = degrees_to_radians(p2.lon - p1.lon);
    let a = (dlat / 2.0).sin().powi(2)
        + degrees_to_radians(p1.lat).cos()
            * degrees_to_radians(p2.lat).cos()
            * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Midpoint of the two coordinates, averaged component-wise.
/// Used as a label anchor, not a geodesic midpoint.
pub fn midpoint(p1: GeoPoint, p2: GeoPoint) -> GeoPoint {
    GeoPoint::new((p1.lat + p2.lat) / 2.0, (p1.lon + p2.lon) / 2.0)
}

/// Converts a distance into a round-trip time for a medium whose signals
/// travel at `speed_factor * c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagationModel {
    speed_factor: f64,
}

impl PropagationModel {
    pub const FIBER: PropagationModel = PropagationModel {
        speed_factor: FIBER_FACTOR,
    };

    pub const VACUUM: PropagationModel = PropagationModel { speed_factor: 1.0 };

    pub fn new(speed_factor: f64) -> Result<Self> {
        if speed_factor > 0.0 && speed_factor <= 1.0 {
            Ok(Self { speed_factor })
        } else {
            Err(Error::InvalidFactor(speed_factor))
        }
    }

    pub fn speed_factor(&self) -> f64 {
        self.speed_factor
    }

    pub fn one_way_ms(&self, distance_km: f64) -> f64 {
        (distance_km / (SPEED_OF_LIGHT_KM_S * self.speed_factor)) * 1000.0
    }

    pub fn round_trip_ms(&self, distance_km: f64) -> f64 {
        self.one_way_ms(distance_km) * 2.0
    }
}

impl Default for PropagationModel {
    fn default() -> Self {
        Self::FIBER
    }
}

/// Theoretical minimum ping (RTT) in milliseconds through optical fiber.
///
/// `distance_override_km` replaces the great-circle distance between `p1`
/// and `p2`, which is how multi-segment paths are priced.
pub fn theoretical_latency_ms(
    p1: GeoPoint,
    p2: GeoPoint,
    distance_override_km: Option<f64>,
) -> f64 {
    let distance = distance_override_km.unwrap_or_else(|| distance_km(p1, p2));
    PropagationModel::FIBER.round_trip_ms(distance)
}

/// Rounds to `decimals` places with ties away from zero. `{:.N}` alone
/// rounds exact ties to even.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Renders a latency with two decimals in μs, ms or s.
pub fn format_latency(ms: f64) -> String {
    if ms < 1.0 {
        format!("{:.2} μs", round_to(ms * 1000.0, 2))
    } else if ms < 1000.0 {
        format!("{:.2} ms", round_to(ms, 2))
    } else {
        format!("{:.2} s", round_to(ms / 1000.0, 2))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyResult {
    pub distance_km: f64,
    pub rtt_ms: f64,
}

impl LatencyResult {
    pub fn between(p1: GeoPoint, p2: GeoPoint, model: PropagationModel) -> Self {
        let distance_km = distance_km(p1, p2);
        Self {
            distance_km,
            rtt_ms: model.round_trip_ms(distance_km),
        }
    }
}
