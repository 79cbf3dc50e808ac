use std::sync::Arc;

use agenda_core::models::{
    ids::{AssignmentId, SessionId},
    responses::{ExtensionResponse, PinRequest, PinResponse},
};
use agenda_engine::MoveReport;
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{ApiState, middleware::error_handling::AppError};

async fn extension_response(
    state: &ApiState,
    session: SessionId,
    report: MoveReport,
) -> Result<Json<ExtensionResponse>, AppError> {
    state.loader.sync_change(&state.agenda, &report.change).await?;

    let agenda = state.agenda.read().await;
    let assignments = agenda.table().for_session(session);
    Ok(Json(ExtensionResponse {
        session_id: session,
        extended: assignments.iter().any(|assignment| assignment.is_extension()),
        timeslots: assignments.iter().map(|assignment| assignment.timeslot).collect(),
        revision: report.revision,
    }))
}

/// Makes a session double-wide. Fails with 409 when the following slot in
/// the same room is taken.
#[axum::debug_handler]
pub async fn extend_session(
    State(state): State<Arc<ApiState>>,
    Path(session): Path<SessionId>,
) -> Result<Json<ExtensionResponse>, AppError> {
    let report = state.agenda.write().await.extend_session(session)?;
    extension_response(&state, session, report).await
}

#[axum::debug_handler]
pub async fn clear_extension(
    State(state): State<Arc<ApiState>>,
    Path(session): Path<SessionId>,
) -> Result<Json<ExtensionResponse>, AppError> {
    let report = state.agenda.write().await.clear_extension(session)?;
    extension_response(&state, session, report).await
}

#[axum::debug_handler]
pub async fn set_pin(
    State(state): State<Arc<ApiState>>,
    Path(assignment): Path<AssignmentId>,
    Json(request): Json<PinRequest>,
) -> Result<Json<PinResponse>, AppError> {
    let updated = state
        .agenda
        .write()
        .await
        .set_pinned(assignment, request.pinned)?;
    state
        .loader
        .sync_pin(&state.agenda, assignment, updated.pinned)
        .await?;

    Ok(Json(PinResponse {
        assignment_id: updated.id,
        pinned: updated.pinned,
    }))
}
