//! # Error Handling Middleware
//!
//! Maps engine errors to HTTP status codes and JSON error bodies so every
//! handler reports failures the same way.
//!
//! | Error | Status |
//! |---|---|
//! | `NotFound` | 404 |
//! | `Validation` | 400 |
//! | `SlotOccupied` | 409 |
//! | `Fetch` | 502 |
//! | `Timeout` | 504 |
//! | `Internal` | 500 |

use agenda_core::errors::AgendaError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use agenda_api::middleware::error_handling::AppError;
/// use agenda_core::errors::AgendaError;
///
/// fn lookup(found: bool) -> Result<u32, AppError> {
///     if !found {
///         return Err(AgendaError::NotFound("session#7 not found".into()).into());
///     }
///     Ok(7)
/// }
/// # fn main() { assert!(lookup(false).is_err()); }
/// ```
#[derive(Debug)]
pub struct AppError(pub AgendaError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AgendaError::NotFound(_) => StatusCode::NOT_FOUND,
            AgendaError::Validation(_) => StatusCode::BAD_REQUEST,
            AgendaError::SlotOccupied(_) => StatusCode::CONFLICT,
            AgendaError::Fetch(_) => StatusCode::BAD_GATEWAY,
            AgendaError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AgendaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:#}", self.0);
        }

        let message = self.0.to_string();
        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

impl From<AgendaError> for AppError {
    fn from(err: AgendaError) -> Self {
        AppError(err)
    }
}

/// Backend I/O failures surface as bad-gateway responses.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(AgendaError::Fetch(err))
    }
}

/// Maps an AgendaError directly to an HTTP response
pub fn map_error(err: AgendaError) -> Response {
    AppError(err).into_response()
}
