// Web Interface module root
pub mod graphql;
pub mod handlers;
pub mod page;
pub mod routes;
pub mod types;
pub mod web_server;

pub use graphql::{build_schema, PosterSchema};
pub use routes::routes;
pub use web_server::WebServer;
