//! Arguments shared by the `ping` and `batch` binaries.

use crate::cable::CablePolyline;
use crate::error::Result;
use crate::geo::{GeoPoint, PropagationModel};
use crate::{osm, overpass};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parses and range-checks a `lat,lon` argument.
pub fn parse_point(s: &str) -> std::result::Result<GeoPoint, String> {
    s.parse::<GeoPoint>()
        .and_then(GeoPoint::validated)
        .map_err(|e| e.to_string())
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Medium {
    /// Optical fiber, 0.68 c
    Fiber,
    /// Free space, 1.0 c
    Vacuum,
}

#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Transmission medium used to turn distance into latency
    #[arg(long, value_enum, default_value_t = Medium::Fiber)]
    pub medium: Medium,

    /// Custom fraction of the speed of light, overrides --medium
    #[arg(long)]
    pub speed_factor: Option<f64>,
}

impl ModelArgs {
    pub fn model(&self) -> Result<PropagationModel> {
        match self.speed_factor {
            Some(factor) => PropagationModel::new(factor),
            None => Ok(match self.medium {
                Medium::Fiber => PropagationModel::FIBER,
                Medium::Vacuum => PropagationModel::VACUUM,
            }),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CableArgs {
    /// Overpass API JSON response with submarine cable ways
    #[arg(long, conflicts_with = "pbf")]
    pub cables: Option<PathBuf>,

    /// OSM .pbf extract to read submarine cable ways from
    #[arg(long)]
    pub pbf: Option<PathBuf>,
}

impl CableArgs {
    /// Loads the configured cable source, or nothing if none was given.
    pub fn load(&self) -> Result<Vec<CablePolyline>> {
        let cables = match (&self.cables, &self.pbf) {
            (Some(path), _) => overpass::load_cables(path)?,
            (None, Some(path)) => osm::load_cables_from_pbf(path)?,
            (None, None) => {
                info!("No cable data given, cable estimates will be unavailable");
                Vec::new()
            }
        };
        Ok(cables)
    }
}

/// Installs the fmt subscriber. `RUST_LOG` overrides the default `cable_ping=info`.
pub fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cable_ping=info")),
        )
        .try_init()?;
    Ok(())
}
