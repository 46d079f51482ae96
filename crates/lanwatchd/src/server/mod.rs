//! HTTP server for the lanwatch daemon.
//!
//! The server:
//! - Serves the JSON API over axum
//! - Routes registry requests through the `RegistryHandle`
//! - Runs a probe round per status request
//! - Supports graceful shutdown via CancellationToken
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HttpServer    │
//! │  TcpListener    │
//! └───────┬─────────┘
//!         │ axum::serve
//!         ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │    handlers     │────▶│  RegistryHandle  │
//! │  (per request)  │     └──────────────────┘
//! └───────┬─────────┘
//!         │ GET /api/status
//!         ▼
//! ┌─────────────────┐
//! │ProbeCoordinator │
//! └─────────────────┘
//! ```

mod error;
mod handlers;

pub use error::ApiError;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{delete, get};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use lanwatch_protocol::routes;

use crate::coordinator::ProbeCoordinator;
use crate::registry::RegistryHandle;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: RegistryHandle,
    pub coordinator: Arc<ProbeCoordinator>,
}

impl AppState {
    pub fn new(registry: RegistryHandle, coordinator: ProbeCoordinator) -> Self {
        Self {
            registry,
            coordinator: Arc::new(coordinator),
        }
    }
}

/// Builds the router with all API routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            routes::DEVICES,
            get(handlers::list_devices).post(handlers::create_device),
        )
        .route(routes::DEVICE, delete(handlers::delete_device))
        .route(routes::STATUS, get(handlers::status))
        .route(routes::HEALTH, get(handlers::healthz))
        .route(routes::DEVICES_FILE, get(handlers::devices_file))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP server bound to a TCP address.
pub struct HttpServer {
    listener: TcpListener,
    state: AppState,
    cancel_token: CancellationToken,
}

impl HttpServer {
    /// Binds the listener. Port 0 picks a free port.
    pub async fn bind(
        addr: SocketAddr,
        state: AppState,
        cancel_token: CancellationToken,
    ) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        Ok(Self {
            listener,
            state,
            cancel_token,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr().map_err(ServerError::Io)
    }

    /// Serves requests until the cancellation token is triggered.
    ///
    /// In-flight requests are allowed to finish before this returns.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.local_addr()?;
        info!(addr = %addr, "HTTP server listening");

        let cancel_token = self.cancel_token.clone();
        axum::serve(self.listener, create_router(self.state))
            .with_graceful_shutdown(async move {
                cancel_token.cancelled().await;
                info!("Server shutdown requested");
            })
            .await
            .map_err(ServerError::Io)?;

        info!("HTTP server stopped");
        Ok(())
    }
}

/// Errors that can occur in server operations.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server I/O error: {0}")]
    Io(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display() {
        let err = ServerError::Bind {
            addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        };
        assert!(err.to_string().contains("127.0.0.1:5000"));
    }
}
