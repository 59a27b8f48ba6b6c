//! Direct and cable latency for one pair of points, as text or GeoJSON.

use crate::cable::{estimate_cable_path, CableId, CablePathEstimate, CablePolyline};
use crate::endpoints::RouteEndpoints;
use crate::geo::{format_latency, midpoint, round_to, GeoPoint, LatencyResult, PropagationModel};
use serde_json::{json, Value};
use std::fmt;

pub const NO_CABLE_PATH: &str = "N/A (No cable path found)";

#[derive(Debug, Clone, PartialEq)]
pub struct PingReport {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub direct: LatencyResult,
    pub cable: Option<CableLatency>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CableLatency {
    pub estimate: CablePathEstimate,
    pub rtt_ms: f64,
    pub start_cable_name: Option<String>,
    pub end_cable_name: Option<String>,
}

fn cable_name(cables: &[CablePolyline], id: CableId) -> Option<String> {
    cables
        .iter()
        .find(|c| c.id == id)
        .and_then(CablePolyline::name)
        .map(str::to_string)
}

impl PingReport {
    pub fn compute(
        start: GeoPoint,
        end: GeoPoint,
        cables: &[CablePolyline],
        model: PropagationModel,
    ) -> Self {
        let direct = LatencyResult::between(start, end, model);
        let cable = estimate_cable_path(start, end, cables).map(|estimate| CableLatency {
            rtt_ms: estimate.latency_ms(model),
            start_cable_name: cable_name(cables, estimate.start_cable_id),
            end_cable_name: cable_name(cables, estimate.end_cable_id),
            estimate,
        });
        Self {
            start,
            end,
            direct,
            cable,
        }
    }

    pub fn formatted_direct(&self) -> String {
        format_latency(self.direct.rtt_ms)
    }

    pub fn formatted_cable(&self) -> String {
        match &self.cable {
            Some(c) => format_latency(c.rtt_ms),
            None => NO_CABLE_PATH.to_string(),
        }
    }

    /// Route line, optional cable route and a labelled midpoint, in `[lon, lat]` order.
    pub fn to_geojson(&self) -> Value {
        let mut features = vec![json!({
            "type": "Feature",
            "properties": { "id": "route" },
            "geometry": {
                "type": "LineString",
                "coordinates": [self.start.lon_lat(), self.end.lon_lat()],
            },
        })];

        if let Some(cable) = &self.cable {
            let coordinates: Vec<[f64; 2]> =
                cable.estimate.path().iter().map(GeoPoint::lon_lat).collect();
            features.push(json!({
                "type": "Feature",
                "properties": {
                    "id": "cable-route",
                    "start_cable_id": cable.estimate.start_cable_id,
                    "end_cable_id": cable.estimate.end_cable_id,
                    "start_cable_name": cable.start_cable_name,
                    "end_cable_name": cable.end_cable_name,
                    "distance_km": cable.estimate.total_distance_km,
                },
                "geometry": { "type": "LineString", "coordinates": coordinates },
            }));
        }

        let mut popup = json!({
            "id": "popup",
            "ping": self.formatted_direct(),
            "distance_km": self.direct.distance_km.round(),
        });
        if self.cable.is_some() {
            popup["cable_ping"] = Value::String(self.formatted_cable());
        }
        features.push(json!({
            "type": "Feature",
            "properties": popup,
            "geometry": {
                "type": "Point",
                "coordinates": midpoint(self.start, self.end).lon_lat(),
            },
        }));

        json!({ "type": "FeatureCollection", "features": features })
    }

    /// [`PingReport::to_geojson`] plus one coloured point per live selection.
    pub fn to_geojson_with_markers(&self, endpoints: &RouteEndpoints) -> Value {
        let mut geojson = self.to_geojson();
        if let Some(features) = geojson["features"].as_array_mut() {
            for selection in endpoints.iter() {
                features.push(json!({
                    "type": "Feature",
                    "properties": {
                        "id": format!("marker-{}", selection.ordinal),
                        "marker-color": selection.color.hex(),
                    },
                    "geometry": { "type": "Point", "coordinates": selection.point.lon_lat() },
                }));
            }
        }
        geojson
    }
}

impl fmt::Display for PingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Direct minimum ping: {}", self.formatted_direct())?;
        writeln!(f, "Distance: {:.0} km", round_to(self.direct.distance_km, 0))?;
        write!(f, "Via submarine cables: {}", self.formatted_cable())
    }
}
