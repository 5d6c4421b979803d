//! Meeting API endpoints.
//!
//! Provides HTTP endpoints for:
//! - Running a meeting (POST /meetings)
//! - Getting the current meeting phase (GET /meetings/status)
//! - Listing transcripts (GET /meetings)
//! - Getting a specific transcript (GET /meetings/:id)

use super::blocking;
use crate::api::error::{ApiError, ApiResult};
use crate::app::Orchestrator;
use crate::db::TranscriptSummary;
use crate::meeting::archive::DEFAULT_LIST_LIMIT;
use crate::meeting::{
    render_markdown, Lineup, MeetingOutcome, MeetingRequest, MeetingState, DEFAULT_AD_HOC_TEMPLATE,
};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Request body for POST /meetings.
///
/// Either `meeting_type` alone, or `participants` for an ad hoc meeting (with
/// `meeting_type` naming the template, `custom` by default).
#[derive(Debug, Default, Deserialize)]
pub struct RunMeetingBody {
    pub meeting_type: Option<String>,
    pub participants: Option<Vec<String>>,
    pub facilitator: Option<String>,
    pub synthesis: Option<bool>,
    pub topic: String,
    pub prompt: Option<String>,
    pub extra_context: Option<String>,
}

impl RunMeetingBody {
    fn into_request(self) -> ApiResult<MeetingRequest> {
        if self.topic.trim().is_empty() {
            return Err(ApiError::bad_request("topic must not be empty"));
        }

        let lineup = match (self.participants, self.meeting_type) {
            (Some(participants), template) => Lineup::AdHoc {
                template: template.unwrap_or_else(|| DEFAULT_AD_HOC_TEMPLATE.to_string()),
                participants,
                facilitator: self.facilitator,
                synthesis: self.synthesis,
            },
            (None, Some(meeting_type)) => Lineup::MeetingType(meeting_type),
            (None, None) => {
                return Err(ApiError::bad_request(
                    "either meeting_type or participants is required",
                ))
            }
        };

        Ok(MeetingRequest {
            lineup,
            topic: self.topic,
            prompt: self.prompt,
            extra_context: self.extra_context,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
    #[serde(rename = "type")]
    pub meeting_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShowParams {
    pub format: Option<String>,
}

pub fn router(orchestrator: Orchestrator) -> Router {
    Router::new()
        .route("/", get(list_meetings).post(run_meeting))
        .route("/status", get(meeting_status))
        .route("/:id", get(get_meeting))
        .with_state(orchestrator)
}

/// POST /meetings - Run a meeting to completion and return its transcript.
///
/// The run happens on its own task; if the client goes away the run is
/// cancelled and its partial transcript is stored as failed.
async fn run_meeting(
    State(orchestrator): State<Orchestrator>,
    Json(body): Json<RunMeetingBody>,
) -> ApiResult<(StatusCode, Json<MeetingOutcome>)> {
    let request = body.into_request()?;
    info!("Meeting requested via API: {:?}", request.lineup);

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let task = tokio::spawn(async move { orchestrator.run_meeting(request, &cancel).await });

    let outcome = task
        .await
        .map_err(|e| ApiError::internal(format!("Meeting task failed: {}", e)))??;

    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /meetings/status - Phase of the most recent meeting run by this server.
///
/// Runs share one status slot; with concurrent meetings this reports
/// whichever run updated it last.
async fn meeting_status(State(orchestrator): State<Orchestrator>) -> Json<serde_json::Value> {
    let state: MeetingState = orchestrator.status().get().await;
    let elapsed = state.elapsed_seconds();
    let mut value = serde_json::to_value(&state).unwrap_or_default();
    if let Some(map) = value.as_object_mut() {
        map.insert("elapsed_seconds".to_string(), serde_json::json!(elapsed));
        map.insert(
            "running".to_string(),
            serde_json::json!(!state.phase.is_terminal()),
        );
    }
    Json(value)
}

/// GET /meetings - List stored transcripts, newest first.
async fn list_meetings(
    State(orchestrator): State<Orchestrator>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<TranscriptSummary>>> {
    let archive = orchestrator.transcripts();
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let summaries =
        blocking(move || archive.list(limit, params.meeting_type.as_deref())).await?;
    Ok(Json(summaries))
}

/// GET /meetings/:id - A single transcript, as JSON or `?format=markdown`.
async fn get_meeting(
    State(orchestrator): State<Orchestrator>,
    Path(id): Path<String>,
    Query(params): Query<ShowParams>,
) -> ApiResult<Response> {
    let archive = orchestrator.transcripts();
    let lookup = id.clone();
    let transcript = blocking(move || archive.get(&lookup))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Meeting {} not found", id)))?;

    match params.format.as_deref() {
        Some("markdown") => Ok((
            [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
            render_markdown(&transcript),
        )
            .into_response()),
        Some("json") | None => Ok(Json(transcript).into_response()),
        Some(other) => Err(ApiError::bad_request(format!(
            "Unknown format '{}' (expected json or markdown)",
            other
        ))),
    }
}
