use std::sync::Arc;

use crate::generation::generation_service::GenerationService;
use crate::rendering::geocoder::Geocoder;
use crate::rendering::themes::ThemeCatalog;
use crate::storage::FileLifecycleManager;

/// Shared services handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub generation: Arc<GenerationService>,
    pub files: Arc<FileLifecycleManager>,
    /// Throttled geocoder used by the lookup endpoint.
    pub geocoder: Arc<dyn Geocoder>,
    pub themes: Arc<dyn ThemeCatalog>,
}
