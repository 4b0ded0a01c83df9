//! Web server for satchel.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{Config, WebConfig};
use crate::{Result, SatchelError};

use super::handlers::AppState;
use super::router::create_app;

/// HTTP server for the upload service.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Web configuration.
    web_config: WebConfig,
}

impl WebServer {
    /// Create a new web server from configuration.
    ///
    /// Creates the storage root and loads the homepage template.
    pub fn new(config: &Config) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse::<SocketAddr>()
            .map_err(|e| {
                SatchelError::Config(format!(
                    "invalid server address {}:{}: {e}",
                    config.server.host, config.server.port
                ))
            })?;

        let app_state = AppState::from_config(config)?;
        tracing::info!(
            "File storage initialized at: {}",
            app_state.storage.root().display()
        );

        Ok(Self::with_state(addr, app_state, config.web.clone()))
    }

    /// Create a web server from prepared state.
    pub fn with_state(addr: SocketAddr, app_state: AppState, web_config: WebConfig) -> Self {
        Self {
            addr,
            app_state: Arc::new(app_state),
            web_config,
        }
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let router = create_app(self.app_state, &self.web_config);

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let router = create_app(self.app_state, &self.web_config);

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
