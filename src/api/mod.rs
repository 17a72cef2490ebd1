//! HTTP API over the ansible command-line tool.
//!
//! # Routes
//!
//! - `POST /run`: run an ad-hoc module, answer with per-host results
//! - `GET /listhosts?hosts=<pattern>`: list the hosts matching a pattern
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ansible_api::api::{ApiConfig, ApiServer};
//! use ansible_api::runner::LocalRunner;
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = ApiServer::new(ApiConfig::default(), Arc::new(LocalRunner::new()));
//!     server.run().await.unwrap();
//! }
//! ```

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use state::AppState;

use crate::command::DEFAULT_ANSIBLE_BIN;
use crate::runner::CommandRunner;

/// Configuration for the API server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address to bind the server to
    pub bind_address: SocketAddr,
    /// Program invoked for every request
    pub ansible_bin: String,
    /// Whether to enable CORS
    pub enable_cors: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            ansible_bin: DEFAULT_ANSIBLE_BIN.to_string(),
            enable_cors: false,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

impl ApiConfig {
    /// Set the bind address.
    pub fn with_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set the ansible program.
    pub fn with_ansible_bin(mut self, program: impl Into<String>) -> Self {
        self.ansible_bin = program.into();
        self
    }

    /// Enable or disable permissive CORS.
    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.enable_cors = enabled;
        self
    }

    /// Set the maximum request body size.
    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }
}

/// The main API server.
pub struct ApiServer {
    config: ApiConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server executing commands through `runner`.
    pub fn new(config: ApiConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let state = Arc::new(AppState::new(&config, runner));
        Self { config, state }
    }

    /// Build the router with all routes.
    pub fn router(&self) -> Router {
        let mut app = routes::api_routes(self.state.clone())
            .layer(DefaultBodyLimit::max(self.config.max_body_size));

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        app.layer(TraceLayer::new_for_http())
    }

    /// Run the API server.
    pub async fn run(self) -> Result<(), std::io::Error> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Run the server until `shutdown` completes.
    pub async fn run_with_shutdown(
        self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let addr = self.config.bind_address;
        let router = self.router();

        let listener = TcpListener::bind(addr).await?;
        info!(address = %listener.local_addr()?, ansible = %self.config.ansible_bin, "Starting ansible API server");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
    }

    /// Get a reference to the application state.
    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }
}
