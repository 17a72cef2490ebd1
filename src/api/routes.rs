//! API route configuration.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use super::state::AppState;

/// Create the API router.
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/run", post(handlers::run))
        .route("/listhosts", get(handlers::list_hosts))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiConfig;
    use crate::runner::LocalRunner;

    #[test]
    fn test_router_creation() {
        let state = Arc::new(AppState::new(
            &ApiConfig::default(),
            Arc::new(LocalRunner::new()),
        ));
        let _router = api_routes(state);
    }
}
