pub mod app_state;
pub mod controller_handler;

pub use app_state::AppState;
pub use controller_handler::Controller;
