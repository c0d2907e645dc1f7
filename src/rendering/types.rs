use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A validated poster request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosterRequest {
    pub city: String,
    pub country: String,
    pub theme: String,
    /// Map radius in meters, always positive.
    pub distance: u64,
}

/// A geocoded point in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Everything the renderer needs for one poster.
///
/// `output` is the suggested destination; a renderer may write elsewhere and
/// report the actual path it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub request: PosterRequest,
    pub coordinates: Coordinates,
    pub output: PathBuf,
}

/// A finished poster as seen by API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPoster {
    pub filename: String,
    pub path: String,
}
