pub mod clock;
pub mod configuration;
pub mod controller;
pub mod error_handling;
pub mod generation;
pub mod job_management;
pub mod rendering;
pub mod storage;
pub mod web_interface;

pub use controller::Controller;
pub use error_handling::types::*;
