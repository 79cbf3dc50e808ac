use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use agenda_core::models::{
    ids::SessionId,
    responses::{ConflictSnapshotResponse, ConflictStateResponse},
};
use agenda_engine::ConflictsChanged;
use axum::{
    Json,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

use crate::{ApiState, middleware::error_handling::AppError};

/// Every session's conflict state, tagged with the current revision.
#[axum::debug_handler]
pub async fn get_conflicts(State(state): State<Arc<ApiState>>) -> Json<ConflictSnapshotResponse> {
    Json(state.agenda.read().await.conflict_snapshot())
}

#[axum::debug_handler]
pub async fn get_session_conflicts(
    State(state): State<Arc<ApiState>>,
    Path(session): Path<SessionId>,
) -> Result<Json<ConflictStateResponse>, AppError> {
    let conflicts = state.agenda.read().await.conflict_state(session)?;
    Ok(Json(conflicts))
}

/// Redraw notifications as they are broadcast.
///
/// A subscriber that falls behind skips the missed events; the next event's
/// revision tells it to refetch the snapshot. Ends when the agenda is dropped.
pub fn change_stream(
    mut receiver: broadcast::Receiver<ConflictsChanged>,
) -> impl Stream<Item = ConflictsChanged> {
    async_stream::stream! {
        loop {
            match receiver.recv().await {
                Ok(change) => yield change,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Conflict subscriber lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}

/// GET /api/conflicts/events
///
/// Streams `ConflictsChanged` events via Server-Sent Events (SSE).
pub async fn conflict_events(
    State(state): State<Arc<ApiState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let changes = change_stream(state.agenda.read().await.subscribe());
    let stream = async_stream::stream! {
        for await change in changes {
            let data = serde_json::to_string(&change).unwrap_or_default();
            yield Ok(Event::default().event("conflicts").data(data));
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
