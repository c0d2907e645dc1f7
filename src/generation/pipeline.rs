use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use log::info;

use crate::clock::Clock;
use crate::error_handling::types::{GenerationError, RenderError};
use crate::rendering::geocoder::{lookup, Geocoder};
use crate::rendering::renderer::{output_path, PosterRenderer};
use crate::rendering::types::{GeneratedPoster, PosterRequest, RenderJob};
use crate::storage::StorageArea;

/// Geocodes a request and renders it into the posters directory.
///
/// Shared by background jobs and the synchronous form path.
pub struct PosterPipeline {
    geocoder: Arc<dyn Geocoder>,
    renderer: Arc<dyn PosterRenderer>,
    posters_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl PosterPipeline {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        renderer: Arc<dyn PosterRenderer>,
        posters_dir: PathBuf,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            geocoder,
            renderer,
            posters_dir,
            clock,
        }
    }

    pub async fn produce(&self, request: &PosterRequest) -> Result<GeneratedPoster, GenerationError> {
        let coordinates = lookup(self.geocoder.as_ref(), &request.city, &request.country).await?;

        fs::create_dir_all(&self.posters_dir).map_err(GenerationError::OutputDir)?;
        let job = RenderJob {
            request: request.clone(),
            coordinates,
            output: output_path(&self.posters_dir, &request.city, &request.theme, &self.clock),
        };
        let written = self.renderer.render(&job).await?;

        let filename = written
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_owned)
            .ok_or_else(|| RenderError::MissingOutput(written.clone()))?;
        info!("Poster ready: {}", filename);
        Ok(GeneratedPoster {
            path: StorageArea::Active.public_path(&filename),
            filename,
        })
    }
}
