//! Request handlers.
//!
//! Each handler is a plain function over [`AppState`] returning a typed
//! payload; `routes` turns the payloads into warp replies.

use log::{debug, warn};
use percent_encoding::percent_decode_str;

use crate::controller::app_state::AppState;
use crate::error_handling::types::LifecycleError;
use crate::generation::examples::gallery;
use crate::generation::generation_service::GenerationRequest;
use crate::rendering::geocoder::lookup;
use crate::storage::filename::sanitize;
use crate::storage::{PosterFile, StorageArea};
use crate::web_interface::page::{IndexPage, Outcome};
use crate::web_interface::types::{
    ApiError, FileResponse, FilenameForm, GeocodeQuery, GeocodeResponse, StatusResponse,
    SubmitResponse,
};

pub const JOB_NOT_FOUND: &str = "Job not found.";

/// Files of an area for display; a listing failure shows as an empty list.
///
/// Directory reads and metadata decoding run on the blocking pool.
pub async fn listing(state: &AppState, area: StorageArea) -> Vec<PosterFile> {
    let files = state.files.clone();
    match tokio::task::spawn_blocking(move || files.list(area)).await {
        Ok(Ok(listed)) => listed,
        Ok(Err(e)) => {
            warn!("Cannot list {} area: {}", area, e);
            Vec::new()
        }
        Err(e) => {
            warn!("Listing task for {} area failed: {}", area, e);
            Vec::new()
        }
    }
}

async fn page(state: &AppState, values: GenerationRequest, outcome: Outcome) -> String {
    IndexPage {
        themes: state.themes.themes(),
        examples: gallery(state.themes.as_ref()),
        posters: listing(state, StorageArea::Active).await,
        trash: listing(state, StorageArea::Trash).await,
        values,
        outcome,
    }
    .render()
}

/// `GET /`
pub async fn index(state: &AppState) -> String {
    page(state, IndexPage::default_values(), Outcome::Empty).await
}

/// `POST /generate`: renders inline and shows the result on the page.
pub async fn generate_page(state: &AppState, form: GenerationRequest) -> String {
    let outcome = match state.generation.generate_now(&form).await {
        Ok(poster) => Outcome::Generated(poster),
        Err(e) => {
            warn!("Inline generation failed: {}", e);
            Outcome::Failed(e.to_string())
        }
    };
    let values = GenerationRequest {
        city: form.city.trim().to_string(),
        country: form.country.trim().to_string(),
        ..form
    };
    page(state, values, outcome).await
}

/// `POST /api/generate`
pub fn submit_job(state: &AppState, form: &GenerationRequest) -> SubmitResponse {
    match state.generation.submit(form) {
        Ok(job_id) => SubmitResponse::Queued { job_id },
        Err(e) => SubmitResponse::Error {
            error: e.to_string(),
        },
    }
}

/// `GET /api/status/{job_id}`
pub fn job_status(state: &AppState, job_id: &str) -> StatusResponse {
    match state.generation.job(job_id) {
        Some(record) => StatusResponse::Found(record),
        None => StatusResponse::Missing(ApiError::new(JOB_NOT_FOUND)),
    }
}

/// `GET /api/geocode`
pub async fn geocode(state: &AppState, query: &GeocodeQuery) -> GeocodeResponse {
    match lookup(state.geocoder.as_ref(), &query.query, &query.country).await {
        Ok(coordinates) => GeocodeResponse::Ok {
            lat: coordinates.latitude,
            lon: coordinates.longitude,
        },
        Err(e) => GeocodeResponse::Error {
            error: e.to_string(),
        },
    }
}

fn file_reply(action: &str, filename: &str, result: Result<String, LifecycleError>) -> FileResponse {
    match result {
        Ok(stored) => {
            debug!("{} {} -> {}", action, filename, stored);
            FileResponse::Ok { filename: stored }
        }
        Err(e) => {
            warn!("{} {} rejected: {}", action, filename, e);
            FileResponse::Error {
                error: e.to_string(),
            }
        }
    }
}

/// `POST /api/posters/delete`
pub fn delete_poster(state: &AppState, form: &FilenameForm) -> FileResponse {
    file_reply("Delete", &form.filename, state.files.delete(&form.filename))
}

/// `POST /api/posters/restore`
pub fn restore_poster(state: &AppState, form: &FilenameForm) -> FileResponse {
    file_reply("Restore", &form.filename, state.files.restore(&form.filename))
}

/// `POST /api/posters/purge`
pub fn purge_poster(state: &AppState, form: &FilenameForm) -> FileResponse {
    file_reply("Purge", &form.filename, state.files.purge(&form.filename))
}

/// Bytes and content type of an artifact, or `None` when it cannot be served.
///
/// `segment` is the raw URL path segment; it is percent-decoded before the
/// filename check, so an encoded separator is still rejected.
pub async fn artifact(
    state: &AppState,
    area: StorageArea,
    segment: &str,
) -> Option<(Vec<u8>, String)> {
    let decoded = percent_decode_str(segment).decode_utf8().ok()?;
    let name = sanitize(&decoded).ok()?;
    let path = state.files.layout().dir(area).join(name);
    let bytes = tokio::fs::read(&path).await.ok()?;
    let mime = mime_guess::from_path(&path).first_or_octet_stream().to_string();
    Some((bytes, mime))
}


#[cfg(test)]
mod tests {
    use super::test_support::app_state;
    use super::*;
    use crate::job_management::JobState;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn form(city: &str, country: &str, theme: &str, distance: i64) -> GenerationRequest {
        GenerationRequest {
            city: city.into(),
            country: country.into(),
            theme: theme.into(),
            distance,
        }
    }

    fn filename(name: &str) -> FilenameForm {
        FilenameForm {
            filename: name.into(),
        }
    }

    #[tokio::test]
    async fn index_shows_defaults_and_gallery() {
        let dir = TempDir::new().unwrap();
        let state = app_state(&dir);
        fs::write(state.files.layout().active.join("oslo.png"), b"png").unwrap();

        let html = index(&state).await;
        assert!(html.contains(r#"value="29000""#));
        assert!(html.contains(r#"<option value="feature_based" selected>"#));
        assert!(html.contains("/examples/racksta_1000m_noir.png"));
        assert!(html.contains("/posters/oslo.png"));
    }

    #[tokio::test]
    async fn generate_page_reports_validation_error() {
        let dir = TempDir::new().unwrap();
        let state = app_state(&dir);
        let html = generate_page(&state, form(" Lund ", "", "noir", 1000)).await;
        assert!(html.contains("City and country are required."));
        assert!(html.contains(r#"value="Lund""#));
    }

    #[tokio::test]
    async fn generate_page_links_the_new_poster() {
        let dir = TempDir::new().unwrap();
        let state = app_state(&dir);
        let html = generate_page(&state, form("Lund", "Sweden", "noir", 1000)).await;
        assert!(html.contains("/posters/lund_noir_20240714_184500.png"));
        assert!(state
            .files
            .layout()
            .active
            .join("lund_noir_20240714_184500.png")
            .is_file());
    }

    #[tokio::test]
    async fn submit_and_poll() {
        let dir = TempDir::new().unwrap();
        let state = app_state(&dir);

        let SubmitResponse::Queued { job_id } =
            submit_job(&state, &form("Lund", "Sweden", "noir", 1000))
        else {
            panic!("expected queued");
        };

        let mut last = None;
        for _ in 0..500 {
            if let StatusResponse::Found(record) = job_status(&state, job_id.as_str()) {
                if record.state.is_terminal() {
                    last = Some(record.state);
                    break;
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(
            last,
            Some(JobState::Done {
                filename: "lund_noir_20240714_184500.png".into(),
                path: "/posters/lund_noir_20240714_184500.png".into(),
            })
        );
    }

    #[tokio::test]
    async fn submit_reports_validation_error() {
        let dir = TempDir::new().unwrap();
        let state = app_state(&dir);
        let reply = submit_job(&state, &form("Lund", "Sweden", "noir", 0));
        assert_eq!(
            serde_json::to_value(reply).unwrap(),
            json!({"status": "error", "error": "Distance must be positive."})
        );
    }

    #[tokio::test]
    async fn unknown_job_status() {
        let dir = TempDir::new().unwrap();
        let state = app_state(&dir);
        assert_eq!(
            serde_json::to_value(job_status(&state, "nope")).unwrap(),
            json!({"status": "error", "error": "Job not found."})
        );
    }

    #[tokio::test]
    async fn geocode_endpoint_messages() {
        let dir = TempDir::new().unwrap();
        let state = app_state(&dir);

        let empty = geocode(
            &state,
            &GeocodeQuery {
                query: "  ".into(),
                country: "Sweden".into(),
            },
        )
        .await;
        assert_eq!(
            empty,
            GeocodeResponse::Error {
                error: "Enter a city or address to search.".into()
            }
        );

        let found = geocode(
            &state,
            &GeocodeQuery {
                query: "Råcksta".into(),
                country: String::new(),
            },
        )
        .await;
        assert_eq!(
            found,
            GeocodeResponse::Ok {
                lat: 59.3408,
                lon: 17.8817
            }
        );
    }

    #[tokio::test]
    async fn lifecycle_endpoints_round_trip() {
        let dir = TempDir::new().unwrap();
        let state = app_state(&dir);
        fs::write(state.files.layout().active.join("oslo.png"), b"png").unwrap();

        assert_eq!(
            delete_poster(&state, &filename("oslo.png")),
            FileResponse::Ok {
                filename: "oslo.png".into()
            }
        );
        assert_eq!(
            restore_poster(&state, &filename("oslo.png")),
            FileResponse::Ok {
                filename: "oslo.png".into()
            }
        );
        assert_eq!(
            delete_poster(&state, &filename("oslo.png")),
            FileResponse::Ok {
                filename: "oslo.png".into()
            }
        );
        assert_eq!(
            purge_poster(&state, &filename("oslo.png")),
            FileResponse::Ok {
                filename: "oslo.png".into()
            }
        );
        assert_eq!(
            purge_poster(&state, &filename("oslo.png")),
            FileResponse::Error {
                error: "Poster not found.".into()
            }
        );
    }

    #[tokio::test]
    async fn lifecycle_endpoints_reject_bad_names() {
        let dir = TempDir::new().unwrap();
        let state = app_state(&dir);
        for name in ["../secret.png", "notes.txt", ""] {
            assert_eq!(
                delete_poster(&state, &filename(name)),
                FileResponse::Error {
                    error: "Invalid filename.".into()
                }
            );
        }
    }

    #[tokio::test]
    async fn artifacts_are_served_with_content_type() {
        let dir = TempDir::new().unwrap();
        let state = app_state(&dir);
        fs::write(state.files.layout().examples.join("racksta_1000m_noir.png"), b"png").unwrap();

        let (bytes, mime) = artifact(&state, StorageArea::Example, "racksta_1000m_noir.png")
            .await
            .unwrap();
        assert_eq!(bytes, b"png");
        assert_eq!(mime, "image/png");

        assert!(artifact(&state, StorageArea::Example, "missing.png").await.is_none());
        assert!(artifact(&state, StorageArea::Active, "../trashcan/x.png").await.is_none());
    }

    #[tokio::test]
    async fn artifact_segments_are_percent_decoded() {
        let dir = TempDir::new().unwrap();
        let state = app_state(&dir);
        fs::write(state.files.layout().active.join("gamla stan.png"), b"a").unwrap();
        fs::write(state.files.layout().active.join("råcksta.png"), b"b").unwrap();
        fs::write(state.files.layout().trash.join("x.png"), b"c").unwrap();

        let (bytes, _) = artifact(&state, StorageArea::Active, "gamla%20stan.png").await.unwrap();
        assert_eq!(bytes, b"a");
        let (bytes, _) = artifact(&state, StorageArea::Active, "r%C3%A5cksta.png").await.unwrap();
        assert_eq!(bytes, b"b");

        assert!(artifact(&state, StorageArea::Active, "..%2Ftrashcan%2Fx.png").await.is_none());
        assert!(artifact(&state, StorageArea::Active, "%FF.png").await.is_none());
    }

    #[tokio::test]
    async fn listing_reports_area_files() {
        let dir = TempDir::new().unwrap();
        let state = app_state(&dir);
        fs::write(state.files.layout().trash.join("bergen.png"), b"png").unwrap();

        assert!(listing(&state, StorageArea::Active).await.is_empty());
        let trash = listing(&state, StorageArea::Trash).await;
        assert_eq!(trash.len(), 1);
        assert_eq!(trash[0].path, "/trashcan/bergen.png");
    }
}
