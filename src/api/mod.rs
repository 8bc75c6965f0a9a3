//! HTTP API server for the voice skill

pub mod health;
pub mod skill;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::skill::IntentHandler;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub handler: Arc<IntentHandler>,
}

impl ApiState {
    #[must_use]
    pub const fn new(handler: Arc<IntentHandler>) -> Self {
        Self { handler }
    }
}

/// Build the router with all routes
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(skill::router(state.clone()))
        .merge(health::router())
        .merge(health::ready_router(state))
        .layer(TraceLayer::new_for_http())
}

/// HTTP server exposing the skill endpoint
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    #[must_use]
    pub fn new(handler: Arc<IntentHandler>, port: u16) -> Self {
        Self {
            state: Arc::new(ApiState::new(handler)),
            port,
        }
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
