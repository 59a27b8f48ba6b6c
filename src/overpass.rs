//! Submarine cable data in the Overpass API's JSON output format.
//!
//! Fetching is left to the caller (`curl --data-binary @query.txt
//! https://overpass-api.de/api/interpreter > cables.json` works); this module
//! only knows the query and how to read its response.

use crate::cable::{CableId, CablePolyline};
use crate::error::Result;
use crate::geo::GeoPoint;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const SUBMARINE_CABLE_QUERY: &str = r#"[out:json];
(
  way["power"="cable"]["location"="underwater"];
  way["communication"="line"]["location"="underwater"];
  way["seamark:type"="cable_submarine"];
);
out body geom;
"#;

/// Tag combinations selected by [`SUBMARINE_CABLE_QUERY`]. A way matches if
/// it carries every tag of any one entry.
pub const CABLE_TAG_FILTERS: [&[(&str, &str)]; 3] = [
    &[("power", "cable"), ("location", "underwater")],
    &[("communication", "line"), ("location", "underwater")],
    &[("seamark:type", "cable_submarine")],
];

/// Whether a way's tags match [`CABLE_TAG_FILTERS`]. `lookup` returns the
/// value stored under a key.
pub fn is_submarine_cable<F, S>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<S>,
    S: AsRef<str>,
{
    CABLE_TAG_FILTERS.iter().any(|filter| {
        filter
            .iter()
            .all(|&(key, value)| lookup(key).map(|v| v.as_ref() == value).unwrap_or(false))
    })
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct Element {
    #[serde(rename = "type")]
    kind: String,
    id: CableId,
    #[serde(default)]
    tags: BTreeMap<String, String>,
    // Overpass emits `null` for member nodes clipped by a bounding box.
    #[serde(default)]
    geometry: Vec<Option<GeoPoint>>,
}

/// Parses an Overpass response body into cable polylines.
///
/// Non-way elements and ways without geometry are dropped. Degenerate
/// single-vertex ways are kept; the router ignores them.
pub fn parse_cables(body: &str) -> Result<Vec<CablePolyline>> {
    let response: Response = serde_json::from_str(body)?;
    let total = response.elements.len();

    let cables: Vec<CablePolyline> = response
        .elements
        .into_iter()
        .filter(|e| e.kind == "way")
        .filter_map(|e| {
            let geometry: Vec<GeoPoint> = e.geometry.into_iter().flatten().collect();
            if geometry.is_empty() {
                warn!("way {} has no geometry, skipping", e.id);
                return None;
            }
            Some(CablePolyline {
                id: e.id,
                tags: e.tags,
                geometry,
            })
        })
        .collect();

    info!("Loaded {} cables from {} overpass elements", cables.len(), total);
    Ok(cables)
}

pub fn load_cables<P: AsRef<Path>>(path: P) -> Result<Vec<CablePolyline>> {
    let body = fs::read_to_string(path)?;
    parse_cables(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "version": 0.6,
        "generator": "Overpass API",
        "elements": [
            {
                "type": "way",
                "id": 101,
                "bounds": {"minlat": 50.0, "minlon": -20.0, "maxlat": 50.8, "maxlon": -4.5},
                "nodes": [1, 2],
                "geometry": [{"lat": 50.8, "lon": -4.5}, {"lat": 50.0, "lon": -20.0}],
                "tags": {"communication": "line", "location": "underwater", "name": "TAT-14"}
            },
            {
                "type": "way",
                "id": 102,
                "geometry": [null, {"lat": 36.0, "lon": -5.5}, {"lat": 35.0, "lon": -30.0}]
            },
            {
                "type": "way",
                "id": 103,
                "tags": {"power": "cable"}
            },
            {
                "type": "node",
                "id": 5,
                "lat": 1.0,
                "lon": 2.0
            }
        ]
    }"#;

    #[test]
    fn parses_ways_with_geometry() {
        let cables = parse_cables(SAMPLE).unwrap();
        assert_eq!(cables.len(), 2);

        assert_eq!(cables[0].id, 101);
        assert_eq!(cables[0].name(), Some("TAT-14"));
        assert_eq!(cables[0].geometry[1], GeoPoint::new(50.0, -20.0));

        assert_eq!(cables[1].id, 102);
        assert!(cables[1].tags.is_empty());
        assert_eq!(cables[1].geometry, vec![GeoPoint::new(36.0, -5.5), GeoPoint::new(35.0, -30.0)]);
    }

    #[test]
    fn empty_and_invalid_bodies() {
        assert!(parse_cables(r#"{"elements": []}"#).unwrap().is_empty());
        assert!(parse_cables("{}").unwrap().is_empty());
        assert!(parse_cables("<html>rate limited</html>").is_err());
    }

    #[test]
    fn tag_filter() {
        let tags = |pairs: &[(&str, &str)]| -> BTreeMap<String, String> {
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
        };
        let matches = |t: &BTreeMap<String, String>| is_submarine_cable(|k: &str| t.get(k));

        assert!(matches(&tags(&[("power", "cable"), ("location", "underwater")])));
        assert!(matches(&tags(&[("communication", "line"), ("location", "underwater")])));
        assert!(matches(&tags(&[("seamark:type", "cable_submarine")])));

        assert!(!matches(&tags(&[("power", "cable")])));
        assert!(!matches(&tags(&[("power", "line"), ("location", "underwater")])));
        assert!(!matches(&tags(&[("communication", "line"), ("location", "underground")])));
        assert!(!matches(&tags(&[])));
    }

    #[test]
    fn query_covers_every_filter() {
        for filter in CABLE_TAG_FILTERS {
            for (key, value) in filter {
                assert!(SUBMARINE_CABLE_QUERY.contains(&format!("[\"{}\"=\"{}\"]", key, value)));
            }
        }
    }
}
