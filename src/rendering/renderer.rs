//! Poster renderer boundary.
//!
//! The cartography pipeline itself lives outside this crate. [`CommandRenderer`]
//! drives it as a child process, passing the request as command-line flags:
//!
//! ```text
//! <program> <args...> --city <CITY> --country <COUNTRY> --theme <THEME>
//!     --distance <METERS> --latitude <LAT> --longitude <LON> --output <FILE>
//! ```
//!
//! The process must exit successfully and leave a file at `--output`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use tokio::process::Command;

use crate::clock::Clock;
use crate::error_handling::types::RenderError;
use crate::rendering::slug::slugify;
use crate::rendering::types::RenderJob;

/// Produces a poster image for a render job.
#[async_trait]
pub trait PosterRenderer: Send + Sync {
    /// Renders the poster and returns the path of the written file.
    async fn render(&self, job: &RenderJob) -> Result<PathBuf, RenderError>;
}

/// Name of a freshly generated poster: `<city-slug>_<theme>_<YYYYmmdd_HHMMSS>.png`.
pub fn output_filename(city: &str, theme: &str, at: DateTime<Utc>) -> String {
    format!("{}_{}_{}.png", slugify(city), theme, at.format("%Y%m%d_%H%M%S"))
}

/// Suggested destination for a new poster inside `dir`.
pub fn output_path(dir: &Path, city: &str, theme: &str, clock: &Arc<dyn Clock>) -> PathBuf {
    dir.join(output_filename(city, theme, clock.now()))
}

/// Runs an external rendering program for every poster.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn command(&self, job: &RenderJob) -> Command {
        let request = &job.request;
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--city")
            .arg(&request.city)
            .arg("--country")
            .arg(&request.country)
            .arg("--theme")
            .arg(&request.theme)
            .arg("--distance")
            .arg(request.distance.to_string())
            .arg("--latitude")
            .arg(job.coordinates.latitude.to_string())
            .arg("--longitude")
            .arg(job.coordinates.longitude.to_string())
            .arg("--output")
            .arg(&job.output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl PosterRenderer for CommandRenderer {
    async fn render(&self, job: &RenderJob) -> Result<PathBuf, RenderError> {
        debug!(
            "Rendering {} ({}) with theme {} into {}",
            job.request.city,
            job.request.country,
            job.request.theme,
            job.output.display()
        );
        let output = self
            .command(job)
            .output()
            .await
            .map_err(RenderError::Spawn)?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!("[renderer][stdout] {}", line);
        }
        if !output.status.success() {
            return Err(RenderError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if !job.output.is_file() {
            return Err(RenderError::MissingOutput(job.output.clone()));
        }
        info!("Rendered {}", job.output.display());
        Ok(job.output.clone())
    }
}
