//! GraphQL facade over the same handlers as the HTTP forms.
//!
//! Mutations answer with the `status`/`error` payloads of the JSON API
//! instead of GraphQL errors, so both surfaces report failures the same way.

use async_graphql::{Context, EmptySubscription, Object, Result, Schema, SimpleObject};

use crate::controller::app_state::AppState;
use crate::generation::examples::{gallery, ExamplePoster};
use crate::generation::generation_service::{GenerationRequest, DEFAULT_DISTANCE, DEFAULT_THEME};
use crate::job_management::job::JobState;
use crate::storage::{PosterFile, StorageArea};
use crate::web_interface::handlers;
use crate::web_interface::types::{
    FileResponse, FilenameForm, GeocodeQuery, GeocodeResponse, StatusResponse, SubmitResponse,
};

pub type PosterSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(state: AppState) -> PosterSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(state)
        .finish()
}

#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct MetaEntry {
    pub key: String,
    pub value: String,
}

#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct Poster {
    pub filename: String,
    pub path: String,
    pub meta: Vec<MetaEntry>,
}

impl From<PosterFile> for Poster {
    fn from(file: PosterFile) -> Self {
        Poster {
            filename: file.filename,
            path: file.path,
            meta: file
                .meta
                .into_iter()
                .map(|(key, value)| MetaEntry { key, value })
                .collect(),
        }
    }
}

#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub theme: String,
    pub filename: String,
    pub path: String,
}

impl From<ExamplePoster> for Example {
    fn from(example: ExamplePoster) -> Self {
        Example {
            theme: example.theme,
            filename: example.filename,
            path: example.path,
        }
    }
}

/// Job submission and status payload.
#[derive(SimpleObject, Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPayload {
    pub status: String,
    pub job_id: Option<String>,
    pub filename: Option<String>,
    pub path: Option<String>,
    pub error: Option<String>,
    pub updated_at: Option<String>,
}

impl From<SubmitResponse> for JobPayload {
    fn from(reply: SubmitResponse) -> Self {
        match reply {
            SubmitResponse::Queued { job_id } => JobPayload {
                status: "queued".into(),
                job_id: Some(job_id.to_string()),
                ..Default::default()
            },
            SubmitResponse::Error { error } => JobPayload {
                status: "error".into(),
                error: Some(error),
                ..Default::default()
            },
        }
    }
}

impl From<StatusResponse> for JobPayload {
    fn from(reply: StatusResponse) -> Self {
        match reply {
            StatusResponse::Found(record) => {
                let mut payload = JobPayload {
                    status: record.state.label().into(),
                    job_id: Some(record.job_id.to_string()),
                    updated_at: Some(record.updated_at.to_rfc3339()),
                    ..Default::default()
                };
                match record.state {
                    JobState::Done { filename, path } => {
                        payload.filename = Some(filename);
                        payload.path = Some(path);
                    }
                    JobState::Error { error } => payload.error = Some(error),
                    JobState::Queued | JobState::Running => {}
                }
                payload
            }
            StatusResponse::Missing(err) => JobPayload {
                status: "error".into(),
                error: Some(err.error),
                ..Default::default()
            },
        }
    }
}

#[derive(SimpleObject, Debug, Clone, Default, PartialEq)]
pub struct GeocodePayload {
    pub status: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub error: Option<String>,
}

impl From<GeocodeResponse> for GeocodePayload {
    fn from(reply: GeocodeResponse) -> Self {
        match reply {
            GeocodeResponse::Ok { lat, lon } => GeocodePayload {
                status: "ok".into(),
                lat: Some(lat),
                lon: Some(lon),
                error: None,
            },
            GeocodeResponse::Error { error } => GeocodePayload {
                status: "error".into(),
                error: Some(error),
                ..Default::default()
            },
        }
    }
}

#[derive(SimpleObject, Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePayload {
    pub status: String,
    pub filename: Option<String>,
    pub error: Option<String>,
}

impl From<FileResponse> for FilePayload {
    fn from(reply: FileResponse) -> Self {
        match reply {
            FileResponse::Ok { filename } => FilePayload {
                status: "ok".into(),
                filename: Some(filename),
                error: None,
            },
            FileResponse::Error { error } => FilePayload {
                status: "error".into(),
                filename: None,
                error: Some(error),
            },
        }
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn themes(&self, ctx: &Context<'_>) -> Result<Vec<String>> {
        Ok(ctx.data::<AppState>()?.themes.themes())
    }

    async fn examples(&self, ctx: &Context<'_>) -> Result<Vec<Example>> {
        let state = ctx.data::<AppState>()?;
        Ok(gallery(state.themes.as_ref()).into_iter().map(Example::from).collect())
    }

    async fn posters(&self, ctx: &Context<'_>) -> Result<Vec<Poster>> {
        let state = ctx.data::<AppState>()?;
        Ok(handlers::listing(state, StorageArea::Active)
            .await
            .into_iter()
            .map(Poster::from)
            .collect())
    }

    async fn trash(&self, ctx: &Context<'_>) -> Result<Vec<Poster>> {
        let state = ctx.data::<AppState>()?;
        Ok(handlers::listing(state, StorageArea::Trash)
            .await
            .into_iter()
            .map(Poster::from)
            .collect())
    }

    async fn job(&self, ctx: &Context<'_>, id: String) -> Result<JobPayload> {
        let state = ctx.data::<AppState>()?;
        Ok(handlers::job_status(state, &id).into())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn geocode(
        &self,
        ctx: &Context<'_>,
        query: String,
        #[graphql(default)] country: String,
    ) -> Result<GeocodePayload> {
        let state = ctx.data::<AppState>()?;
        Ok(handlers::geocode(state, &GeocodeQuery { query, country }).await.into())
    }

    async fn generate(
        &self,
        ctx: &Context<'_>,
        city: String,
        country: String,
        #[graphql(default_with = "DEFAULT_THEME.to_string()")] theme: String,
        #[graphql(default_with = "DEFAULT_DISTANCE")] distance: i64,
    ) -> Result<JobPayload> {
        let state = ctx.data::<AppState>()?;
        let request = GenerationRequest {
            city,
            country,
            theme,
            distance,
        };
        Ok(handlers::submit_job(state, &request).into())
    }

    async fn delete_poster(&self, ctx: &Context<'_>, filename: String) -> Result<FilePayload> {
        let state = ctx.data::<AppState>()?;
        Ok(handlers::delete_poster(state, &FilenameForm { filename }).into())
    }

    async fn restore_poster(&self, ctx: &Context<'_>, filename: String) -> Result<FilePayload> {
        let state = ctx.data::<AppState>()?;
        Ok(handlers::restore_poster(state, &FilenameForm { filename }).into())
    }

    async fn purge_poster(&self, ctx: &Context<'_>, filename: String) -> Result<FilePayload> {
        let state = ctx.data::<AppState>()?;
        Ok(handlers::purge_poster(state, &FilenameForm { filename }).into())
    }
}
