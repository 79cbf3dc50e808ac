use axum::{
    Router,
    routing::{post, put},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/sessions/:id/extension",
            post(handlers::assignments::extend_session)
                .delete(handlers::assignments::clear_extension),
        )
        .route(
            "/api/assignments/:id/pin",
            put(handlers::assignments::set_pin),
        )
}
