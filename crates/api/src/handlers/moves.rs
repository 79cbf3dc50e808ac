use std::sync::Arc;

use agenda_core::models::responses::{MoveRequest, MoveResponse, MoveStatus};
use agenda_engine::{MoveOptions, MoveOutcome};
use axum::{Json, extract::State};
use tracing::debug;

use crate::{ApiState, middleware::error_handling::AppError};

/// Moves a session between slots or to the unassigned bucket.
///
/// A too-small or occupied destination comes back as `needs_confirmation`
/// with nothing changed; the client re-sends with `confirmed` set once the
/// operator agrees. Applied moves are mirrored to the backend before the
/// response is sent.
#[axum::debug_handler]
pub async fn move_session(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, AppError> {
    let outcome = state.agenda.write().await.move_session(
        request.session_id,
        request.from,
        request.to,
        MoveOptions {
            confirmed: request.confirmed,
        },
    )?;

    let response = match outcome {
        MoveOutcome::Applied(report) => {
            state.loader.sync_change(&state.agenda, &report.change).await?;
            MoveResponse {
                status: MoveStatus::Applied,
                too_small: report.check.too_small,
                occupied: report.check.occupied,
                recomputed: report.recomputed.into_iter().collect(),
                revision: report.revision,
            }
        }
        MoveOutcome::NeedsConfirmation(check) => {
            debug!("{} move needs confirmation", request.session_id);
            MoveResponse {
                status: MoveStatus::NeedsConfirmation,
                too_small: check.too_small,
                occupied: check.occupied,
                recomputed: Vec::new(),
                revision: state.agenda.read().await.revision(),
            }
        }
        MoveOutcome::Unchanged => MoveResponse {
            status: MoveStatus::Unchanged,
            too_small: false,
            occupied: false,
            recomputed: Vec::new(),
            revision: state.agenda.read().await.revision(),
        },
    };

    Ok(Json(response))
}
