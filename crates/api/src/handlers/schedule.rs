use std::collections::BTreeSet;
use std::sync::Arc;

use agenda_core::models::{
    ids::SessionId,
    responses::{ConflictSnapshotResponse, UnscheduleResponse},
};
use axum::{Json, extract::State};
use tracing::info;

use crate::{ApiState, middleware::error_handling::AppError};

/// Full recompute of every session's conflict state.
#[axum::debug_handler]
pub async fn recalculate(State(state): State<Arc<ApiState>>) -> Json<ConflictSnapshotResponse> {
    let mut agenda = state.agenda.write().await;
    let revision = agenda.recalculate_all();
    info!("Full recalculation requested, now at revision {}", revision);
    Json(agenda.conflict_snapshot())
}

/// Moves every session without a pinned assignment to the bucket.
#[axum::debug_handler]
pub async fn unschedule_all(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<UnscheduleResponse>, AppError> {
    let report = state.agenda.write().await.unschedule_all();
    state.loader.sync_change(&state.agenda, &report.change).await?;

    let unscheduled: BTreeSet<SessionId> = report
        .change
        .removed
        .iter()
        .map(|assignment| assignment.session)
        .collect();
    Ok(Json(UnscheduleResponse {
        unscheduled: unscheduled.into_iter().collect(),
        revision: report.revision,
    }))
}
