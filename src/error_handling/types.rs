use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlError(String),
    #[error("IP formatting error: {0}")]
    BadIPFormatting(String),
    #[error("Value out of range: {0}")]
    NotInRange(String),
}

/// Rejections raised before any job or file is created.
///
/// The `Display` strings are shown verbatim to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("City and country are required.")]
    MissingLocation,
    #[error("Theme not found.")]
    UnknownTheme,
    #[error("Distance must be positive.")]
    NonPositiveDistance,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Invalid filename.")]
    InvalidName,
    #[error("Poster not found.")]
    NotFound,
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Enter a city or address to search.")]
    EmptyQuery,
    #[error("Location not found.")]
    NotFound,
    #[error("Geocoding request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        GeocodeError::Request(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Renderer could not be started: {0}")]
    Spawn(std::io::Error),
    #[error("Renderer failed ({status}): {stderr}")]
    Failed { status: String, stderr: String },
    #[error("Renderer did not produce {}", .0.display())]
    MissingOutput(PathBuf),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("No themes found in themes/")]
    NoThemes,
    #[error("Output directory error: {0}")]
    OutputDir(std::io::Error),
    #[error("Job queue is closed")]
    QueueClosed,
}

impl GenerationError {
    /// True when the failure came from the geocoder or the renderer.
    pub fn is_upstream(&self) -> bool {
        matches!(self, GenerationError::Geocode(_) | GenerationError::Render(_))
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("Storage error: {0}")]
    Storage(#[from] LifecycleError),
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_user_facing() {
        assert_eq!(
            ValidationError::MissingLocation.to_string(),
            "City and country are required."
        );
        assert_eq!(ValidationError::UnknownTheme.to_string(), "Theme not found.");
        assert_eq!(
            ValidationError::NonPositiveDistance.to_string(),
            "Distance must be positive."
        );
    }

    #[test]
    fn generation_error_is_transparent_over_causes() {
        let err = GenerationError::from(GeocodeError::NotFound);
        assert_eq!(err.to_string(), "Location not found.");
        assert!(err.is_upstream());

        let err = GenerationError::from(ValidationError::UnknownTheme);
        assert!(!err.is_upstream());
    }

    #[test]
    fn render_failure_mentions_missing_file() {
        let err = RenderError::MissingOutput(PathBuf::from("posters/x.png"));
        assert!(err.to_string().contains("posters/x.png"));
    }
}
