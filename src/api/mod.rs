//! Stateless JSON API over the calculation core.
//!
//! Provides four POST endpoints:
//! - `/prices/summary` - grouped statistics of an uploaded price CSV
//! - `/annual-cost` - deterministic or Monte Carlo annual cost
//! - `/contracts/compare` - fixed versus dynamic contract
//! - `/battery` - battery payback scenarios

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::post;
use tracing::info;

pub use handlers::ApiError;
pub use types::ErrorResponse;

/// Default cap on Monte Carlo iterations per request.
pub const DEFAULT_MAX_ITERATIONS: usize = 100_000;

/// Limits shared by all request handlers.
///
/// Requests carry all their data; nothing computed is kept between them.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Largest accepted `monteCarlo.iterations`.
    pub max_iterations: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/prices/summary", post(handlers::summarize_prices))
        .route("/annual-cost", post(handlers::annual_cost))
        .route("/contracts/compare", post(handlers::compare))
        .route("/battery", post(handlers::battery))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
