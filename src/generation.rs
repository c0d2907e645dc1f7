//! Poster generation
//!
//! - `generation_service`: request validation, job submission and the inline path.
//! - `pipeline`: geocode then render, shared by jobs and the inline path.
//! - `examples`: the example gallery and the batch command that fills it.

pub mod examples;
pub mod generation_service;
pub mod pipeline;

pub use generation_service::{GenerationRequest, GenerationService};
pub use pipeline::PosterPipeline;
