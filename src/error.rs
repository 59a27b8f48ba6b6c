use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid overpass response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reading pbf: {0}")]
    Pbf(#[from] osmpbfreader::Error),

    #[error("invalid point {0:?}, expected \"lat,lon\"")]
    InvalidPoint(String),

    #[error("point ({lat}, {lon}) is outside the valid latitude/longitude range")]
    OutOfRange { lat: f64, lon: f64 },

    #[error("propagation speed factor must be in (0, 1], got {0}")]
    InvalidFactor(f64),
}

pub type Result<T> = std::result::Result<T, Error>;
