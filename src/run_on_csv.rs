use anyhow::{Context, Result};
use cable_ping::cli::{init_tracing, CableArgs, ModelArgs};
use cable_ping::{format_latency, CablePolyline, GeoPoint, PingReport, PropagationModel};
use clap::Parser;
use csv::{ReaderBuilder, Writer};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "batch")]
#[command(about = "Direct and cable ping for each lat1,lon1,lat2,lon2 CSV row.", long_about = None)]
struct Cli {
    /// Path to the input .csv file
    #[arg(short, long)]
    csv: String,

    /// Output CSV. If omitted, rows are written to stdout.
    #[arg(short, long)]
    out: Option<String>,

    /// Order output rows by direct round-trip time, fastest first
    #[arg(long, default_value_t = false)]
    sort: bool,

    #[command(flatten)]
    cables: CableArgs,

    #[command(flatten)]
    model: ModelArgs,
}

#[derive(Debug, Deserialize)]
struct PairRow {
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
}

#[derive(Debug, Serialize, PartialEq)]
struct LatencyRow {
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
    distance_km: f64,
    rtt_ms: f64,
    rtt: String,
    cable_distance_km: Option<f64>,
    cable_rtt_ms: Option<f64>,
    cable_rtt: Option<String>,
}

impl LatencyRow {
    fn from_report(report: &PingReport) -> Self {
        Self {
            lat1: report.start.lat,
            lon1: report.start.lon,
            lat2: report.end.lat,
            lon2: report.end.lon,
            distance_km: report.direct.distance_km,
            rtt_ms: report.direct.rtt_ms,
            rtt: format_latency(report.direct.rtt_ms),
            cable_distance_km: report.cable.as_ref().map(|c| c.estimate.total_distance_km),
            cable_rtt_ms: report.cable.as_ref().map(|c| c.rtt_ms),
            cable_rtt: report.cable.as_ref().map(|c| format_latency(c.rtt_ms)),
        }
    }
}

fn read_pairs<R: Read>(reader: R) -> Result<Vec<(GeoPoint, GeoPoint)>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut pairs = Vec::new();
    for (line, result) in rdr.deserialize::<PairRow>().enumerate() {
        let row = result.with_context(|| format!("parsing row {}", line + 1))?;
        let start = GeoPoint::new(row.lat1, row.lon1);
        let end = GeoPoint::new(row.lat2, row.lon2);
        if start.validated().is_err() || end.validated().is_err() {
            warn!("Row {} has coordinates out of range, skipping", line + 1);
            continue;
        }
        pairs.push((start, end));
    }
    Ok(pairs)
}

fn compute_rows(
    pairs: &[(GeoPoint, GeoPoint)],
    cables: &[CablePolyline],
    model: PropagationModel,
    sort: bool,
) -> Vec<LatencyRow> {
    let mut rows: Vec<LatencyRow> = pairs
        .iter()
        .map(|&(start, end)| {
            LatencyRow::from_report(&PingReport::compute(start, end, cables, model))
        })
        .collect();
    if sort {
        rows.sort_by_key(|r| OrderedFloat(r.rtt_ms));
    }
    rows
}

fn write_rows<W: Write>(writer: W, rows: &[LatencyRow]) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let model = cli.model.model()?;
    let cables = cli.cables.load().context("loading cable data")?;

    let file = std::fs::File::open(&cli.csv).with_context(|| format!("opening {}", &cli.csv))?;
    let pairs = read_pairs(file)?;
    info!("Read {} point pairs from {}", pairs.len(), &cli.csv);

    let rows = compute_rows(&pairs, &cables, model, cli.sort);
    let with_cable = rows.iter().filter(|r| r.cable_rtt_ms.is_some()).count();

    if let Some(out_path) = cli.out {
        let file = std::fs::File::create(&out_path)
            .with_context(|| format!("creating CSV {}", &out_path))?;
        write_rows(file, &rows)?;
        println!(
            "Wrote latencies for {} pairs ({} with a cable estimate) to {}",
            rows.len(),
            with_cable,
            out_path
        );
    } else {
        write_rows(std::io::stdout().lock(), &rows)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    const INPUT: &str = "lat1,lon1,lat2,lon2
51.5074,-0.1278,40.7128,-74.0060
48.8566, 2.3522, 52.5200, 13.4050
95.0,0.0,0.0,0.0
";

    #[test]
    fn reads_valid_pairs() {
        let pairs = read_pairs(INPUT.as_bytes()).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].0, GeoPoint::new(48.8566, 2.3522));
    }

    #[test]
    fn malformed_row_is_an_error() {
        assert!(read_pairs("lat1,lon1,lat2,lon2\n1,2,three,4\n".as_bytes()).is_err());
    }

    #[test]
    fn cable_columns_blank_without_cables() {
        let pairs = read_pairs(INPUT.as_bytes()).unwrap();
        let rows = compute_rows(&pairs, &[], PropagationModel::FIBER, false);
        assert!(rows.iter().all(|r| r.cable_rtt_ms.is_none()));

        let mut out = Vec::new();
        write_rows(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        let header = "lat1,lon1,lat2,lon2,distance_km,rtt_ms,rtt,\
                      cable_distance_km,cable_rtt_ms,cable_rtt";
        assert_eq!(lines.next(), Some(header));
        assert!(lines.next().unwrap().ends_with(",54.65 ms,,,"));
    }

    #[test]
    fn sorted_by_direct_rtt() {
        let pairs = read_pairs(INPUT.as_bytes()).unwrap();
        let cables = vec![CablePolyline {
            id: 1,
            tags: BTreeMap::new(),
            geometry: vec![GeoPoint::new(50.8, -4.5), GeoPoint::new(40.5, -73.0)],
        }];
        let rows = compute_rows(&pairs, &cables, PropagationModel::FIBER, true);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].rtt_ms < rows[1].rtt_ms);
        assert_eq!(rows[0].lat1, 48.8566);
        assert!(rows.iter().all(|r| r.cable_rtt.is_some()));
    }
}
