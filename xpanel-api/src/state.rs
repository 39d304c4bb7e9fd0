//! App state: the panel and server settings.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use xpanel_service::ServerPanel;

/// Default listen port of the panel.
pub const DEFAULT_PORT: u16 = 54321;

/// HTTP server settings.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Bind address
    pub host: IpAddr,
    /// Listen port
    pub port: u16,
    /// Whether to answer cross-origin requests
    pub enable_cors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            enable_cors: true,
        }
    }
}

impl ApiConfig {
    /// Reads `XPANEL_HOST`, `XPANEL_PORT` and `XPANEL_CORS`, keeping defaults
    /// for unset or unparsable values.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        Self {
            host: std::env::var("XPANEL_HOST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.host),
            port: std::env::var("XPANEL_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            enable_cors: std::env::var("XPANEL_CORS")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.enable_cors),
        }
    }

    /// Address to bind.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Shared handler state.
pub struct AppState {
    /// Server settings
    pub config: ApiConfig,
    /// The management core
    pub panel: Arc<ServerPanel>,
    /// When the server state was created
    pub started_at: Instant,
}

impl AppState {
    /// Creates handler state around `panel`.
    pub fn new(config: ApiConfig, panel: Arc<ServerPanel>) -> Self {
        Self {
            config,
            panel,
            started_at: Instant::now(),
        }
    }
}
