//! Decision log API routes.

use super::blocking;
use crate::api::error::{ApiError, ApiResult};
use crate::app::Orchestrator;
use crate::decisions::{Decision, DecisionQuery, DecisionStatus, NewDecision};
use crate::error::DecisionError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use tracing::info;

/// Query parameters for GET /decisions.
#[derive(Debug, Deserialize, Default)]
pub struct DecisionQueryParams {
    /// Case-insensitive substring of the topic
    pub topic: Option<String>,
    /// pending, in_progress or completed
    pub status: Option<String>,
    /// Case-insensitive substring of the owner
    pub owner: Option<String>,
    pub limit: Option<usize>,
}

impl DecisionQueryParams {
    fn into_query(self) -> Result<DecisionQuery, DecisionError> {
        Ok(DecisionQuery {
            topic: self.topic.filter(|t| !t.is_empty()),
            status: self
                .status
                .filter(|s| !s.is_empty())
                .map(|s| DecisionStatus::parse(&s))
                .transpose()?,
            owner: self.owner.filter(|o| !o.is_empty()),
            limit: self.limit,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

pub fn router(orchestrator: Orchestrator) -> Router {
    Router::new()
        .route("/", get(list_decisions).post(create_decision))
        .route("/:id", get(get_decision))
        .route("/:id/status", put(update_status))
        .with_state(orchestrator)
}

/// GET /decisions - Filtered decisions, newest first.
async fn list_decisions(
    State(orchestrator): State<Orchestrator>,
    Query(params): Query<DecisionQueryParams>,
) -> ApiResult<Json<Vec<Decision>>> {
    let query = params.into_query()?;
    let log = orchestrator.decision_log();
    let decisions = blocking(move || log.query(&query)).await?;
    Ok(Json(decisions))
}

/// POST /decisions - Record a decision with status pending.
async fn create_decision(
    State(orchestrator): State<Orchestrator>,
    Json(body): Json<NewDecision>,
) -> ApiResult<(StatusCode, Json<Decision>)> {
    if body.topic.trim().is_empty() || body.text.trim().is_empty() {
        return Err(ApiError::bad_request("topic and text are required"));
    }

    let log = orchestrator.decision_log();
    let decision = blocking(move || log.append(body)).await?;
    info!("Decision {} recorded via API", decision.id);
    Ok((StatusCode::CREATED, Json(decision)))
}

/// GET /decisions/:id
async fn get_decision(
    State(orchestrator): State<Orchestrator>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Decision>> {
    let log = orchestrator.decision_log();
    let decision = blocking(move || log.get(id)).await?;
    Ok(Json(decision))
}

/// PUT /decisions/:id/status - Advance a decision one step.
async fn update_status(
    State(orchestrator): State<Orchestrator>,
    Path(id): Path<i64>,
    Json(body): Json<StatusUpdate>,
) -> ApiResult<Json<Decision>> {
    let status = DecisionStatus::parse(&body.status)?;
    let log = orchestrator.decision_log();
    let decision = blocking(move || log.update_status(id, status)).await?;
    Ok(Json(decision))
}
