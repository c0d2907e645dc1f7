//! Collaborators at the edge of poster generation.
//!
//! The renderer, the geocoder and the theme list are external systems; this
//! module defines the traits the rest of the crate talks to and the adapters
//! used in production.

pub mod geocoder;
pub mod renderer;
pub mod slug;
pub mod themes;
pub mod types;

pub use geocoder::{Geocoder, NominatimGeocoder, Throttled};
pub use renderer::{CommandRenderer, PosterRenderer};
pub use themes::{DirectoryThemeCatalog, StaticThemeCatalog, ThemeCatalog};
pub use types::{Coordinates, GeneratedPoster, PosterRequest, RenderJob};
