//! Registry API routes.

use crate::app::Orchestrator;
use crate::registry::{MeetingType, Participant};
use axum::{extract::State, response::Json, routing::get, Router};

pub fn router(orchestrator: Orchestrator) -> Router {
    Router::new()
        .route("/participants", get(list_participants))
        .route("/meeting-types", get(list_meeting_types))
        .with_state(orchestrator)
}

/// GET /participants - Every registered participant, in catalogue order.
async fn list_participants(State(orchestrator): State<Orchestrator>) -> Json<Vec<Participant>> {
    Json(orchestrator.registry().participants().to_vec())
}

/// GET /meeting-types
async fn list_meeting_types(State(orchestrator): State<Orchestrator>) -> Json<Vec<MeetingType>> {
    Json(orchestrator.registry().meeting_types().to_vec())
}
