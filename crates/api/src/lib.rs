//! # Agenda API
//!
//! The HTTP surface of the scheduling engine. The UI collaborator moves
//! sessions, reads conflict state and toggles extensions and pins here;
//! every change is applied to the in-memory agenda first and then mirrored
//! to the backend.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Lock the agenda, run one engine operation, sync the result
//! - **Middleware**: Error mapping from engine errors to HTTP responses
//! - **Config**: Handle environment and server configuration

/// Configuration module for API settings
pub mod config;
/// Request handlers that drive the engine
pub mod handlers;
/// Middleware for error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use agenda_engine::{ScheduleLoader, SharedAgenda};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use eyre::Result;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
///
/// The agenda holds the engine state behind an async lock; the loader owns
/// the backend connection used to mirror changes.
pub struct ApiState {
    /// In-memory schedule and conflict state
    pub agenda: SharedAgenda,
    /// Backend synchronisation and lazy fetches
    pub loader: Arc<ScheduleLoader>,
}

/// Installs the global tracing subscriber at the given level.
pub fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Builds the application router with every route attached to `state`.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Conflict state reads
        .merge(routes::conflicts::routes())
        // Session moves
        .merge(routes::moves::routes())
        // Extensions and pins
        .merge(routes::assignments::routes())
        // Whole-schedule operations
        .merge(routes::schedule::routes())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(allowed)
}

/// Starts the API server with the provided configuration and state
///
/// # Arguments
///
/// * `config` - API configuration including host, port, and other settings
/// * `state` - Loaded agenda and the loader that keeps the backend in sync
pub async fn start_server(config: config::ApiConfig, state: Arc<ApiState>) -> Result<()> {
    let app = build_router(state);

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)),
        None => app,
    };

    // Add request tracing and timeout middleware
    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout)));

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
