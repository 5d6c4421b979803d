//! Feature request API routes.

use super::blocking;
use crate::api::error::ApiResult;
use crate::app::Orchestrator;
use crate::error::FeatureRequestError;
use crate::feature_requests::{
    FeatureRequest, FeatureRequestFilter, FeatureRequestStatus, NewFeatureRequest, VoteStance,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct RequestQueryParams {
    pub status: Option<String>,
    pub submitter: Option<String>,
    pub limit: Option<usize>,
}

impl RequestQueryParams {
    fn into_filter(self) -> Result<FeatureRequestFilter, FeatureRequestError> {
        Ok(FeatureRequestFilter {
            status: self
                .status
                .filter(|s| !s.is_empty())
                .map(|s| FeatureRequestStatus::parse(&s))
                .transpose()?,
            submitter_id: self.submitter.filter(|s| !s.is_empty()),
            limit: self.limit,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct VoteBody {
    pub participant_id: String,
    pub stance: String,
}

pub fn router(orchestrator: Orchestrator) -> Router {
    Router::new()
        .route("/", get(list_requests).post(submit_request))
        .route("/:id", get(get_request))
        .route("/:id/status", put(update_status))
        .route("/:id/votes", post(vote))
        .with_state(orchestrator)
}

/// GET /requests
async fn list_requests(
    State(orchestrator): State<Orchestrator>,
    Query(params): Query<RequestQueryParams>,
) -> ApiResult<Json<Vec<FeatureRequest>>> {
    let filter = params.into_filter()?;
    let requests = orchestrator.feature_requests();
    Ok(Json(blocking(move || requests.list(&filter)).await?))
}

/// POST /requests
async fn submit_request(
    State(orchestrator): State<Orchestrator>,
    Json(body): Json<NewFeatureRequest>,
) -> ApiResult<(StatusCode, Json<FeatureRequest>)> {
    let requests = orchestrator.feature_requests();
    let created = blocking(move || requests.submit(body)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /requests/:id
async fn get_request(
    State(orchestrator): State<Orchestrator>,
    Path(id): Path<i64>,
) -> ApiResult<Json<FeatureRequest>> {
    let requests = orchestrator.feature_requests();
    Ok(Json(blocking(move || requests.get(id)).await?))
}

/// PUT /requests/:id/status
async fn update_status(
    State(orchestrator): State<Orchestrator>,
    Path(id): Path<i64>,
    Json(body): Json<StatusUpdate>,
) -> ApiResult<Json<FeatureRequest>> {
    let status = FeatureRequestStatus::parse(&body.status)?;
    let requests = orchestrator.feature_requests();
    Ok(Json(blocking(move || requests.update_status(id, status)).await?))
}

/// POST /requests/:id/votes
async fn vote(
    State(orchestrator): State<Orchestrator>,
    Path(id): Path<i64>,
    Json(body): Json<VoteBody>,
) -> ApiResult<Json<FeatureRequest>> {
    let stance = VoteStance::parse(&body.stance)?;
    let requests = orchestrator.feature_requests();
    Ok(Json(
        blocking(move || requests.vote(id, &body.participant_id, stance)).await?,
    ))
}
