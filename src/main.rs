use anyhow::{Context, Result};
use cable_ping::cli::{init_tracing, parse_point, CableArgs, ModelArgs};
use cable_ping::{GeoPoint, PingReport, RouteEndpoints};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "ping")]
#[command(about = "Minimum ping, direct and via submarine cables.", long_about = None)]
struct Cli {
    /// Points as "lat,lon". Each new point replaces the oldest of the last two,
    /// and a report is printed whenever two points are selected.
    #[arg(required = true, num_args = 2.., value_parser = parse_point, allow_hyphen_values = true)]
    points: Vec<GeoPoint>,

    #[command(flatten)]
    cables: CableArgs,

    #[command(flatten)]
    model: ModelArgs,

    /// Write the last route, cable route and label point as GeoJSON
    #[arg(long)]
    geojson: Option<String>,
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let model = cli.model.model()?;
    let cables = cli.cables.load().context("loading cable data")?;
    info!(
        "Using speed factor {} with {} cables",
        model.speed_factor(),
        cables.len()
    );

    let mut endpoints = RouteEndpoints::new();
    let mut last_report: Option<PingReport> = None;

    for point in cli.points {
        if let Some(evicted) = endpoints.select(point) {
            debug!("Dropped selection #{} at {}", evicted.ordinal, evicted.point);
        }
        if let Some((start, end)) = endpoints.pair() {
            let report = PingReport::compute(start, end, &cables, model);
            println!("{} -> {}", start, end);
            println!("{}", report);
            println!();
            last_report = Some(report);
        }
    }

    if let (Some(out_path), Some(report)) = (cli.geojson, last_report) {
        let file = File::create(&out_path).with_context(|| format!("creating {}", &out_path))?;
        let geojson = report.to_geojson_with_markers(&endpoints);
        serde_json::to_writer_pretty(BufWriter::new(file), &geojson)
            .with_context(|| format!("writing GeoJSON to {}", &out_path))?;
        println!("Wrote route GeoJSON to {}", out_path);
    }

    Ok(())
}
