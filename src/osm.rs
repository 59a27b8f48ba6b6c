//! Submarine cables from an `.osm.pbf` extract.

use crate::cable::CablePolyline;
use crate::error::Result;
use crate::geo::GeoPoint;
use crate::overpass::is_submarine_cable;
use fnv::FnvHashMap;
use hashbrown::HashSet;
use osmpbfreader::{NodeId, OsmObj, OsmPbfReader, Tags, WayId};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::{info, warn};

#[derive(Clone, Debug)]
struct WayLite {
    id: WayId,
    nodes: Vec<NodeId>,
    tags: Tags,
}

fn is_cable_way(tags: &Tags) -> bool {
    is_submarine_cable(|key: &str| tags.get(key))
}

fn tags_to_map(tags: &Tags) -> BTreeMap<String, String> {
    tags.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Reads cable ways from a PBF file. The file is scanned twice, once for the
/// ways and once for the coordinates of the nodes they reference.
pub fn load_cables_from_pbf<P: AsRef<Path>>(path: P) -> Result<Vec<CablePolyline>> {
    let mut pbf = OsmPbfReader::new(File::open(path)?);
    read_cables(&mut pbf)
}

pub fn read_cables<R: Read + Seek>(pbf: &mut OsmPbfReader<R>) -> Result<Vec<CablePolyline>> {
    // Pass 1: collect cable ways and the set of node ids they reference
    let mut needed_nodes: HashSet<NodeId> = HashSet::new();
    let mut ways: Vec<WayLite> = Vec::new();

    for obj in pbf.iter() {
        if let OsmObj::Way(w) = obj? {
            if is_cable_way(&w.tags) {
                needed_nodes.extend(w.nodes.iter().copied());
                ways.push(WayLite {
                    id: w.id,
                    nodes: w.nodes.clone(),
                    tags: w.tags.clone(),
                });
            }
        }
    }

    info!(
        "Collected {} cable ways; {} unique node refs",
        ways.len(),
        needed_nodes.len()
    );

    // Pass 2: read coordinates for needed nodes
    pbf.rewind()?;
    let mut coords: FnvHashMap<NodeId, GeoPoint> = FnvHashMap::default();
    for obj in pbf.iter() {
        if let OsmObj::Node(n) = obj? {
            if needed_nodes.contains(&n.id) {
                coords.insert(n.id, GeoPoint::new(n.lat(), n.lon()));
            }
        }
    }

    info!("Loaded coordinates for {} nodes actually present", coords.len());

    Ok(assemble(ways, &coords))
}

fn assemble(ways: Vec<WayLite>, coords: &FnvHashMap<NodeId, GeoPoint>) -> Vec<CablePolyline> {
    ways.into_iter()
        .filter_map(|w| {
            let geometry: Vec<GeoPoint> = w
                .nodes
                .iter()
                .filter_map(|n| coords.get(n).copied())
                .collect();
            if geometry.len() < w.nodes.len() {
                warn!(
                    "way {} references {} nodes missing from the extract",
                    w.id.0,
                    w.nodes.len() - geometry.len()
                );
            }
            if geometry.is_empty() {
                return None;
            }
            Some(CablePolyline {
                id: w.id.0,
                tags: tags_to_map(&w.tags),
                geometry,
            })
        })
        .collect()
}
