use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info};

use crate::clock::{Clock, SystemClock};
use crate::configuration::config::Config;
use crate::controller::app_state::AppState;
use crate::error_handling::types::*;
use crate::generation::examples::{generate_examples, ExampleBatch};
use crate::generation::generation_service::GenerationService;
use crate::generation::pipeline::PosterPipeline;
use crate::job_management::{JobRunner, JobStore, WorkerPool};
use crate::rendering::geocoder::{Geocoder, NominatimGeocoder, Throttled};
use crate::rendering::renderer::{CommandRenderer, PosterRenderer};
use crate::rendering::themes::{DirectoryThemeCatalog, ThemeCatalog};
use crate::storage::FileLifecycleManager;
use crate::web_interface::WebServer;

/// Wires the configured collaborators together and runs the commands.
pub struct Controller {
    pub config: Config,
    clock: Arc<dyn Clock>,
    geocoder: Arc<dyn Geocoder>,
    renderer: Arc<dyn PosterRenderer>,
    themes: Arc<dyn ThemeCatalog>,
}

impl Controller {
    pub fn new(config: Config) -> Result<Self, ControllerError> {
        config.validate()?;

        let nominatim = NominatimGeocoder::new(&config.geocoder.base_url, &config.geocoder.user_agent)
            .map_err(|e| {
                error!("Unable to build the geocoding client: {}", e);
                ControllerError::InitializationFailed(e.to_string())
            })?;
        let geocoder: Arc<dyn Geocoder> =
            Arc::new(Throttled::new(nominatim, config.geocoder.throttle()));
        let renderer: Arc<dyn PosterRenderer> = Arc::new(CommandRenderer::new(
            config.renderer.program.clone(),
            config.renderer.args.clone(),
        ));
        let themes: Arc<dyn ThemeCatalog> =
            Arc::new(DirectoryThemeCatalog::new(&config.storage.themes_dir));

        Ok(Self {
            config,
            clock: Arc::new(SystemClock),
            geocoder,
            renderer,
            themes,
        })
    }

    /// Builds the services behind the web interface and spawns the workers.
    pub fn app_state(&self) -> Result<AppState, ControllerError> {
        let layout = self.config.storage.layout();
        let files = Arc::new(FileLifecycleManager::new(layout.clone(), self.clock.clone())?);

        let store = Arc::new(JobStore::new(self.config.jobs.ttl(), self.clock.clone()));
        let pipeline = Arc::new(PosterPipeline::new(
            self.geocoder.clone(),
            self.renderer.clone(),
            layout.active,
            self.clock.clone(),
        ));
        let runner = Arc::new(JobRunner::new(store.clone(), pipeline.clone()));
        let pool = Arc::new(WorkerPool::spawn(self.config.jobs.workers, runner));

        Ok(AppState {
            generation: Arc::new(GenerationService::new(
                self.themes.clone(),
                store,
                pool,
                pipeline,
            )),
            files,
            geocoder: self.geocoder.clone(),
            themes: self.themes.clone(),
        })
    }

    /// Serves the web interface until Ctrl-C, then drains the workers.
    pub async fn run(&self) -> Result<(), ControllerError> {
        let addr = self.config.socket_addr()?;
        let state = self.app_state()?;
        let pool = state.generation.pool().clone();
        info!(
            "{} theme(s) available in {}",
            self.themes.themes().len(),
            self.config.storage.themes_dir.display()
        );

        let server = WebServer::new(state);
        tokio::select! {
            _ = server.start(addr) => {}
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!("Unable to listen for shutdown signal: {}", e);
                }
                info!("Shutdown requested");
            }
        }

        pool.shutdown_and_join().await;
        Ok(())
    }

    /// Renders the example gallery for every theme.
    pub async fn generate_examples(
        &self,
        batch: &ExampleBatch,
    ) -> Result<Vec<PathBuf>, ControllerError> {
        info!(
            "Generating examples for {} ({}) into {}",
            batch.city,
            batch.country,
            batch.output_dir.display()
        );
        let written = generate_examples(
            self.geocoder.as_ref(),
            self.renderer.as_ref(),
            self.themes.as_ref(),
            batch,
        )
        .await?;
        info!("Generated {} example poster(s)", written.len());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.storage.posters_dir = dir.path().join("posters");
        config.storage.trash_dir = dir.path().join("trashcan");
        config.storage.examples_dir = dir.path().join("examples");
        config.storage.themes_dir = dir.path().join("themes");
        config.geocoder.throttle_ms = 0;
        config
    }

    #[test]
    fn new_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.jobs.workers = 0;
        assert!(matches!(
            Controller::new(config),
            Err(ControllerError::Configuration(ConfigError::NotInRange(_)))
        ));
    }

    #[tokio::test]
    async fn app_state_creates_storage_areas() {
        let dir = TempDir::new().unwrap();
        let controller = Controller::new(config(&dir)).unwrap();
        let state = controller.app_state().unwrap();

        assert!(dir.path().join("posters").is_dir());
        assert!(dir.path().join("trashcan").is_dir());
        assert!(dir.path().join("examples").is_dir());
        assert!(state.themes.themes().is_empty());
        state.generation.pool().shutdown_and_join().await;
    }

    #[tokio::test]
    async fn generate_examples_without_themes_fails() {
        let dir = TempDir::new().unwrap();
        let controller = Controller::new(config(&dir)).unwrap();
        let batch = ExampleBatch {
            city: "Råcksta".into(),
            country: "Stockholm".into(),
            distance: 1000,
            output_dir: dir.path().join("examples"),
            prefix: None,
        };
        let err = controller.generate_examples(&batch).await.unwrap_err();
        assert_eq!(err.to_string(), "Generation error: No themes found in themes/");
    }
}
