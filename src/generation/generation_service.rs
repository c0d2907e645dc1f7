use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Deserializer};

use crate::error_handling::types::{GenerationError, ValidationError};
use crate::generation::pipeline::PosterPipeline;
use crate::job_management::job::{JobId, JobRecord, JobState};
use crate::job_management::job_store::JobStore;
use crate::job_management::worker_pool::WorkerPool;
use crate::rendering::themes::ThemeCatalog;
use crate::rendering::types::{GeneratedPoster, PosterRequest};

/// Theme used when a form leaves it out.
pub const DEFAULT_THEME: &str = "feature_based";
/// Map radius in meters used when a form leaves it out.
pub const DEFAULT_DISTANCE: i64 = 29000;

/// A poster request as submitted, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_distance", deserialize_with = "form_distance")]
    pub distance: i64,
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

fn default_distance() -> i64 {
    DEFAULT_DISTANCE
}

/// Accepts the distance as a number or as form text.
///
/// Blank text means the default. Text that is not a whole number maps to 0 so
/// validation reports it instead of the body failing to decode.
fn form_distance<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(distance) => distance,
        Raw::Text(text) if text.trim().is_empty() => DEFAULT_DISTANCE,
        Raw::Text(text) => text.trim().parse().unwrap_or(0),
    })
}

/// Entry point for poster generation, both queued and inline.
pub struct GenerationService {
    themes: Arc<dyn ThemeCatalog>,
    store: Arc<JobStore>,
    pool: Arc<WorkerPool>,
    pipeline: Arc<PosterPipeline>,
}

impl GenerationService {
    pub fn new(
        themes: Arc<dyn ThemeCatalog>,
        store: Arc<JobStore>,
        pool: Arc<WorkerPool>,
        pipeline: Arc<PosterPipeline>,
    ) -> Self {
        Self {
            themes,
            store,
            pool,
            pipeline,
        }
    }

    /// Checks a request in order: location, theme, distance.
    pub fn validate(&self, request: &GenerationRequest) -> Result<PosterRequest, ValidationError> {
        let city = request.city.trim();
        let country = request.country.trim();
        if city.is_empty() || country.is_empty() {
            return Err(ValidationError::MissingLocation);
        }
        if !self.themes.contains(&request.theme) {
            return Err(ValidationError::UnknownTheme);
        }
        if request.distance <= 0 {
            return Err(ValidationError::NonPositiveDistance);
        }
        Ok(PosterRequest {
            city: city.to_string(),
            country: country.to_string(),
            theme: request.theme.clone(),
            distance: request.distance as u64,
        })
    }

    /// Validates and queues a job; returns as soon as the job is `queued`.
    pub fn submit(&self, request: &GenerationRequest) -> Result<JobId, GenerationError> {
        let poster = self.validate(request)?;
        let id = JobId::new();
        self.store.create(id.clone(), JobState::Queued);

        if let Err(e) = self.pool.submit(id.clone(), poster.clone()) {
            warn!("Job {} could not be queued: {}", id, e);
            self.store.update(&id, JobState::failed(&e));
            return Err(e);
        }
        info!(
            "Job {} queued: {} ({}), theme {}, {} m",
            id, poster.city, poster.country, poster.theme, poster.distance
        );
        Ok(id)
    }

    /// Validates and renders inline.
    pub async fn generate_now(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedPoster, GenerationError> {
        let poster = self.validate(request)?;
        self.pipeline.produce(&poster).await
    }

    pub fn job(&self, id: &str) -> Option<JobRecord> {
        self.store.get(&JobId::from(id))
    }

    pub fn themes(&self) -> Vec<String> {
        self.themes.themes()
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::generation::pipeline::test_support::*;
    use crate::job_management::job_runner::JobRunner;
    use crate::rendering::themes::StaticThemeCatalog;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        service: GenerationService,
        renderer: Arc<FileRenderer>,
        _dir: TempDir,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap(),
        ));
        let store = Arc::new(JobStore::new(Duration::from_secs(3600), clock.clone()));
        let renderer = Arc::new(FileRenderer::default());
        let pipeline = Arc::new(PosterPipeline::new(
            Arc::new(FixedGeocoder::at(RACKSTA)),
            renderer.clone(),
            dir.path().to_path_buf(),
            clock,
        ));
        let runner = Arc::new(JobRunner::new(store.clone(), pipeline.clone()));
        let pool = Arc::new(WorkerPool::spawn(1, runner));
        let themes = Arc::new(StaticThemeCatalog::new(["feature_based", "noir"]));
        Fixture {
            service: GenerationService::new(themes, store, pool, pipeline),
            renderer,
            _dir: dir,
        }
    }

    fn form(city: &str, country: &str, theme: &str, distance: i64) -> GenerationRequest {
        GenerationRequest {
            city: city.into(),
            country: country.into(),
            theme: theme.into(),
            distance,
        }
    }

    #[rstest]
    #[case(form("", "Sweden", "noir", 1000), ValidationError::MissingLocation)]
    #[case(form("Lund", "   ", "noir", 1000), ValidationError::MissingLocation)]
    #[case(form("  ", "", "nope", -1), ValidationError::MissingLocation)]
    #[case(form("Lund", "Sweden", "nope", 0), ValidationError::UnknownTheme)]
    #[case(form("Lund", "Sweden", "noir", 0), ValidationError::NonPositiveDistance)]
    #[case(form("Lund", "Sweden", "noir", -5), ValidationError::NonPositiveDistance)]
    #[tokio::test]
    async fn validation_order(#[case] request: GenerationRequest, #[case] expected: ValidationError) {
        let fixture = fixture();
        assert_eq!(fixture.service.validate(&request).unwrap_err(), expected);
    }

    #[tokio::test]
    async fn validation_trims_location() {
        let fixture = fixture();
        let poster = fixture
            .service
            .validate(&form("  Lund ", " Sweden", "noir", 1000))
            .unwrap();
        assert_eq!(poster.city, "Lund");
        assert_eq!(poster.country, "Sweden");
        assert_eq!(poster.distance, 1000);
    }

    #[tokio::test]
    async fn rejected_submission_creates_no_job() {
        let fixture = fixture();
        let err = fixture
            .service
            .submit(&form("Lund", "Sweden", "nope", 1000))
            .unwrap_err();
        assert_eq!(err.to_string(), "Theme not found.");
        assert!(fixture.service.store.is_empty());
    }

    #[tokio::test]
    async fn submit_returns_a_queued_job() {
        let fixture = fixture();
        let id = fixture
            .service
            .submit(&form("Lund", "Sweden", "noir", 1000))
            .unwrap();
        let record = fixture.service.job(id.as_str()).unwrap();
        assert_eq!(record.job_id, id);
        assert!(matches!(
            record.state,
            JobState::Queued | JobState::Running | JobState::Done { .. }
        ));
    }

    #[tokio::test]
    async fn submit_after_shutdown_reports_closed_queue() {
        let fixture = fixture();
        fixture.service.pool().shutdown_and_join().await;

        let err = fixture
            .service
            .submit(&form("Lund", "Sweden", "noir", 1000))
            .unwrap_err();
        assert!(matches!(err, GenerationError::QueueClosed));
        assert_eq!(fixture.service.store.len(), 1);
    }

    #[tokio::test]
    async fn generate_now_renders_inline() {
        let fixture = fixture();
        let poster = fixture
            .service
            .generate_now(&form("Lund", "Sweden", "noir", 1000))
            .await
            .unwrap();
        assert_eq!(poster.filename, "lund_noir_20240901_120000.png");
        assert_eq!(poster.path, "/posters/lund_noir_20240901_120000.png");
        assert_eq!(fixture.renderer.jobs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn generate_now_validates_first() {
        let fixture = fixture();
        let err = fixture
            .service
            .generate_now(&form("Lund", "", "noir", 1000))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "City and country are required.");
        assert!(fixture.renderer.jobs.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_location_fields_deserialize_empty() {
        let request: GenerationRequest = serde_json::from_str(r#"{"theme":"noir"}"#).unwrap();
        assert_eq!(request.city, "");
        assert_eq!(request.country, "");
    }

    #[test]
    fn form_defaults_apply_when_fields_are_missing() {
        let request: GenerationRequest =
            serde_json::from_str(r#"{"city":"Lund","country":"Sweden"}"#).unwrap();
        assert_eq!(request.theme, DEFAULT_THEME);
        assert_eq!(request.distance, DEFAULT_DISTANCE);
    }

    #[rstest]
    #[case(r#"{"distance":1500}"#, 1500)]
    #[case(r#"{"distance":"1500"}"#, 1500)]
    #[case(r#"{"distance":" 750 "}"#, 750)]
    #[case(r#"{"distance":""}"#, DEFAULT_DISTANCE)]
    #[case(r#"{"distance":"far"}"#, 0)]
    #[case(r#"{"distance":"12.5"}"#, 0)]
    fn distance_accepts_form_text(#[case] body: &str, #[case] expected: i64) {
        let request: GenerationRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.distance, expected);
    }

    #[tokio::test]
    async fn unknown_job_is_none() {
        let fixture = fixture();
        assert!(fixture.service.job("0123456789abcdef0123456789abcdef").is_none());
    }
}
