use axum::{Router, routing::get};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/conflicts", get(handlers::conflicts::get_conflicts))
        .route(
            "/api/conflicts/events",
            get(handlers::conflicts::conflict_events),
        )
        .route(
            "/api/sessions/:id/conflicts",
            get(handlers::conflicts::get_session_conflicts),
        )
}
