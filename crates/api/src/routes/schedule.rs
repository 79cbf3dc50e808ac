use axum::{Router, routing::post};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/recalculate", post(handlers::schedule::recalculate))
        .route("/api/unschedule", post(handlers::schedule::unschedule_all))
}
