use std::convert::Infallible;

use warp::{path::Tail, reply, Filter, Rejection, Reply};

use crate::controller::app_state::AppState;
use crate::generation::generation_service::GenerationRequest;
use crate::storage::StorageArea;
use crate::web_interface::graphql::PosterSchema;
use crate::web_interface::handlers;
use crate::web_interface::page::Assets;
use crate::web_interface::types::{FileResponse, FilenameForm, GeocodeQuery};

/// Largest accepted form body.
const FORM_LIMIT: u64 = 16 * 1024;
/// Largest accepted GraphQL request body.
const GRAPHQL_LIMIT: u64 = 64 * 1024;

type LifecycleHandler = fn(&AppState, &FilenameForm) -> FileResponse;

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// Every route of the web interface.
pub fn routes(
    state: AppState,
    schema: PosterSchema,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    index_route(state.clone())
        .or(generate_page_route(state.clone()))
        .or(submit_route(state.clone()))
        .or(status_route(state.clone()))
        .or(geocode_route(state.clone()))
        .or(lifecycle_route("delete", handlers::delete_poster, state.clone()))
        .or(lifecycle_route("restore", handlers::restore_poster, state.clone()))
        .or(lifecycle_route("purge", handlers::purge_poster, state.clone()))
        .or(graphql_route(schema))
        .or(artifact_route(StorageArea::Active, state.clone()))
        .or(artifact_route(StorageArea::Trash, state.clone()))
        .or(artifact_route(StorageArea::Example, state))
        .or(static_route())
}

/// GET /
pub fn index_route(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path::end()
        .and(warp::get())
        .and(with_state(state))
        .and_then(|state: AppState| async move {
            Ok::<_, Rejection>(reply::html(handlers::index(&state).await))
        })
}

/// POST /generate
pub fn generate_page_route(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("generate")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(FORM_LIMIT))
        .and(warp::body::form())
        .and(with_state(state))
        .and_then(|form: GenerationRequest, state: AppState| async move {
            Ok::<_, Rejection>(reply::html(handlers::generate_page(&state, form).await))
        })
}

/// POST /api/generate
pub fn submit_route(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "generate")
        .and(warp::post())
        .and(warp::body::content_length_limit(FORM_LIMIT))
        .and(warp::body::form())
        .and(with_state(state))
        .and_then(|form: GenerationRequest, state: AppState| async move {
            Ok::<_, Rejection>(reply::json(&handlers::submit_job(&state, &form)))
        })
}

/// GET /api/status/:job_id
pub fn status_route(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "status" / String)
        .and(warp::get())
        .and(with_state(state))
        .and_then(|job_id: String, state: AppState| async move {
            Ok::<_, Rejection>(reply::json(&handlers::job_status(&state, &job_id)))
        })
}

/// GET /api/geocode?query=&country=
pub fn geocode_route(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "geocode")
        .and(warp::get())
        .and(warp::query::<GeocodeQuery>())
        .and(with_state(state))
        .and_then(|query: GeocodeQuery, state: AppState| async move {
            Ok::<_, Rejection>(reply::json(&handlers::geocode(&state, &query).await))
        })
}

/// POST /api/posters/{delete,restore,purge}
pub fn lifecycle_route(
    action: &'static str,
    handler: LifecycleHandler,
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("api")
        .and(warp::path("posters"))
        .and(warp::path(action))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(FORM_LIMIT))
        .and(warp::body::form())
        .and(with_state(state))
        .and_then(move |form: FilenameForm, state: AppState| async move {
            Ok::<_, Rejection>(reply::json(&handler(&state, &form)))
        })
}

/// POST /graphql
pub fn graphql_route(
    schema: PosterSchema,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("graphql")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(GRAPHQL_LIMIT))
        .and(warp::body::json())
        .and(warp::any().map(move || schema.clone()))
        .and_then(|request: async_graphql::Request, schema: PosterSchema| async move {
            Ok::<_, Rejection>(reply::json(&schema.execute(request).await))
        })
}

/// GET /posters/:name, /trashcan/:name, /examples/:name
pub fn artifact_route(
    area: StorageArea,
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path(area.url_prefix().trim_start_matches('/'))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state))
        .and_then(move |name: String, state: AppState| async move {
            match handlers::artifact(&state, area, &name).await {
                Some((bytes, mime)) => Ok(reply::with_header(bytes, "Content-Type", mime)),
                None => Err(warp::reject::not_found()),
            }
        })
}

/// GET /static/*
pub fn static_route() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("static")
        .and(warp::path::tail())
        .and(warp::get())
        .and_then(|tail: Tail| async move {
            let path = format!("static/{}", tail.as_str());
            match Assets::get(&path) {
                Some(file) => {
                    let mime = mime_guess::from_path(&path).first_or_octet_stream().to_string();
                    Ok(reply::with_header(file.data.into_owned(), "Content-Type", mime))
                }
                None => Err(warp::reject::not_found()),
            }
        })
}
