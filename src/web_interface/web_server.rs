use std::net::SocketAddr;

use log::info;

use crate::controller::app_state::AppState;
use crate::web_interface::graphql::{build_schema, PosterSchema};
use crate::web_interface::routes::routes;

/// Web server for the HTML page, the JSON API and GraphQL.
pub struct WebServer {
    state: AppState,
    schema: PosterSchema,
}

impl WebServer {
    pub fn new(state: AppState) -> Self {
        let schema = build_schema(state.clone());
        Self { state, schema }
    }

    /// Serve until the future is dropped.
    pub async fn start(&self, addr: SocketAddr) {
        info!("Web interface listening on http://{}", addr);
        warp::serve(routes(self.state.clone(), self.schema.clone()))
            .run(addr)
            .await;
    }
}
