//! # xpanel API Server
//!
//! HTTP surface of the panel management core. Every operation answers with
//! an `Outcome` JSON body `{ success, msg, obj }`.
//!
//! ## Endpoints
//!
//! - `POST /server/status` - Last collected engine status
//! - `POST /server/versions/:kind` - Available versions of `engine`, `geoip` or `geosite`
//! - `POST /server/install/:kind/:version` - Install a version
//! - `POST /server/stop` / `POST /server/restart` - Engine control
//! - `POST /server/logs/:count` - Engine log tail
//! - `GET /server/database` - Database download
//! - `POST /server/config` - Engine config
//! - `GET /health` - Liveness
//!
//! ## Example
//!
//! ```rust,ignore
//! use xpanel_api::{ApiServer, ApiConfig};
//!
//! let server = ApiServer::new(ApiConfig::from_env(), panel);
//! server.run().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod handlers;
mod routes;
mod state;

pub use dto::HealthResponse;
pub use error::ApiError;
pub use routes::create_router;
pub use state::{ApiConfig, AppState, DEFAULT_PORT};

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use xpanel_service::ServerPanel;

/// API server for the panel.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new API server around `panel`.
    pub fn new(config: ApiConfig, panel: Arc<ServerPanel>) -> Self {
        Self {
            state: Arc::new(AppState::new(config, panel)),
        }
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let router = create_router(self.state.clone());

        let router = if self.state.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router.layer(cors)
        } else {
            router
        };

        router.layer(TraceLayer::new_for_http())
    }

    /// Runs the server until the process is killed.
    pub async fn run(self) -> std::io::Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the server until `shutdown` resolves, then drains open connections.
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.state.config.socket_addr();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("xpanel API server listening on {}", addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }
}
