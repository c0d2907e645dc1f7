use std::fs;
use std::path::PathBuf;

use log::info;
use serde::Serialize;

use crate::error_handling::types::GenerationError;
use crate::rendering::geocoder::{lookup, Geocoder};
use crate::rendering::renderer::PosterRenderer;
use crate::rendering::slug::slugify;
use crate::rendering::themes::ThemeCatalog;
use crate::rendering::types::{PosterRequest, RenderJob};
use crate::storage::StorageArea;

/// Place the example gallery is rendered for.
pub const EXAMPLE_CITY: &str = "Råcksta";
pub const EXAMPLE_COUNTRY: &str = "Stockholm";
pub const EXAMPLE_DISTANCE: u64 = 1000;
pub const EXAMPLE_PREFIX: &str = "racksta_1000m";

/// One gallery tile: the example poster expected for a theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExamplePoster {
    pub theme: String,
    pub filename: String,
    pub path: String,
}

/// Gallery entries for every theme, whether or not the file exists yet.
pub fn gallery(themes: &dyn ThemeCatalog) -> Vec<ExamplePoster> {
    themes
        .themes()
        .into_iter()
        .map(|theme| {
            let filename = format!("{EXAMPLE_PREFIX}_{theme}.png");
            ExamplePoster {
                path: StorageArea::Example.public_path(&filename),
                filename,
                theme,
            }
        })
        .collect()
}

/// Parameters of a `generate-examples` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleBatch {
    pub city: String,
    pub country: String,
    pub distance: u64,
    pub output_dir: PathBuf,
    /// Defaults to `<slug(city)>_<distance>m`.
    pub prefix: Option<String>,
}

impl ExampleBatch {
    pub fn prefix(&self) -> String {
        match self.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => prefix.to_string(),
            _ => format!("{}_{}m", slugify(&self.city), self.distance),
        }
    }
}

/// Renders one poster per theme into `batch.output_dir`.
///
/// The place is geocoded once and reused for every theme.
pub async fn generate_examples(
    geocoder: &dyn Geocoder,
    renderer: &dyn PosterRenderer,
    themes: &dyn ThemeCatalog,
    batch: &ExampleBatch,
) -> Result<Vec<PathBuf>, GenerationError> {
    fs::create_dir_all(&batch.output_dir).map_err(GenerationError::OutputDir)?;
    let themes = themes.themes();
    if themes.is_empty() {
        return Err(GenerationError::NoThemes);
    }

    let coordinates = lookup(geocoder, &batch.city, &batch.country).await?;
    let prefix = batch.prefix();

    let mut written = Vec::with_capacity(themes.len());
    for theme in themes {
        let job = RenderJob {
            request: PosterRequest {
                city: batch.city.clone(),
                country: batch.country.clone(),
                theme: theme.clone(),
                distance: batch.distance,
            },
            coordinates,
            output: batch.output_dir.join(format!("{prefix}_{theme}.png")),
        };
        let path = renderer.render(&job).await?;
        info!("Saved {}", path.display());
        written.push(path);
    }
    Ok(written)
}
