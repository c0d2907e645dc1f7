use serde::{Deserialize, Serialize};

use crate::job_management::job::{JobId, JobRecord};

/// Error payload shared by every JSON endpoint: `{"status": "error", "error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiError {
    status: &'static str,
    pub error: String,
}

impl ApiError {
    pub fn new(error: impl ToString) -> Self {
        Self {
            status: "error",
            error: error.to_string(),
        }
    }
}

/// Body of the lifecycle endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilenameForm {
    pub filename: String,
}

/// Query string of `/api/geocode`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeocodeQuery {
    pub query: String,
    pub country: String,
}

/// Reply of `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitResponse {
    Queued { job_id: JobId },
    Error { error: String },
}

/// Reply of `GET /api/status/{job_id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatusResponse {
    Found(JobRecord),
    Missing(ApiError),
}

/// Reply of `GET /api/geocode`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GeocodeResponse {
    Ok { lat: f64, lon: f64 },
    Error { error: String },
}

/// Reply of the delete, restore and purge endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileResponse {
    Ok { filename: String },
    Error { error: String },
}
