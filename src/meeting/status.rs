//! Meeting phase and shared state handle.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Phase of a meeting run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingPhase {
    Idle,
    Initialized,
    ComposingContext,
    Dispatching,
    AwaitingResponse,
    Appended,
    Synthesizing,
    Persisting,
    Complete,
    Failed,
}

impl MeetingPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Initialized => "initialized",
            Self::ComposingContext => "composing_context",
            Self::Dispatching => "dispatching",
            Self::AwaitingResponse => "awaiting_response",
            Self::Appended => "appended",
            Self::Synthesizing => "synthesizing",
            Self::Persisting => "persisting",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }

    /// Whether a run in this phase has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Idle | Self::Complete | Self::Failed)
    }
}

/// Current run state, readable by API handlers.
#[derive(Debug, Clone, Serialize)]
pub struct MeetingState {
    pub phase: MeetingPhase,
    pub meeting_id: Option<String>,
    pub meeting_type: Option<String>,
    pub topic: Option<String>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub current_participant: Option<String>,
    pub turn_index: Option<usize>,
    pub exchanges_completed: usize,
    pub last_error: Option<String>,
}

impl Default for MeetingState {
    fn default() -> Self {
        Self {
            phase: MeetingPhase::Idle,
            meeting_id: None,
            meeting_type: None,
            topic: None,
            started_at: None,
            current_participant: None,
            turn_index: None,
            exchanges_completed: 0,
            last_error: None,
        }
    }
}

impl MeetingState {
    /// Seconds since the run started.
    pub fn elapsed_seconds(&self) -> Option<u64> {
        self.started_at.map(|started| {
            let elapsed = chrono::Utc::now() - started;
            elapsed.num_seconds().max(0) as u64
        })
    }
}

/// Thread-safe handle shared between a meeting run and API handlers.
#[derive(Clone, Default)]
pub struct MeetingStatusHandle {
    inner: Arc<Mutex<MeetingState>>,
}

impl MeetingStatusHandle {
    pub async fn get(&self) -> MeetingState {
        self.inner.lock().await.clone()
    }

    pub async fn start(&self, meeting_id: &str, meeting_type: &str, topic: &str) {
        let mut state = self.inner.lock().await;
        *state = MeetingState {
            phase: MeetingPhase::Initialized,
            meeting_id: Some(meeting_id.to_string()),
            meeting_type: Some(meeting_type.to_string()),
            topic: Some(topic.to_string()),
            started_at: Some(chrono::Utc::now()),
            ..MeetingState::default()
        };
    }

    pub async fn set_phase(&self, phase: MeetingPhase) {
        let mut state = self.inner.lock().await;
        state.phase = phase;
    }

    pub async fn dispatching(&self, participant: &str, turn_index: usize) {
        let mut state = self.inner.lock().await;
        state.phase = MeetingPhase::Dispatching;
        state.current_participant = Some(participant.to_string());
        state.turn_index = Some(turn_index);
    }

    pub async fn appended(&self, exchanges_completed: usize) {
        let mut state = self.inner.lock().await;
        state.phase = MeetingPhase::Appended;
        state.exchanges_completed = exchanges_completed;
    }

    pub async fn set_error(&self, error: String) {
        let mut state = self.inner.lock().await;
        state.phase = MeetingPhase::Failed;
        state.last_error = Some(error);
    }

    pub async fn complete(&self) {
        let mut state = self.inner.lock().await;
        state.phase = MeetingPhase::Complete;
        state.current_participant = None;
    }

    pub async fn reset(&self) {
        let mut state = self.inner.lock().await;
        *state = MeetingState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meeting_phase_as_str_matches_serde() {
        for phase in [
            MeetingPhase::Idle,
            MeetingPhase::ComposingContext,
            MeetingPhase::AwaitingResponse,
            MeetingPhase::Complete,
            MeetingPhase::Failed,
        ] {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase.as_str()));
        }
    }

    #[test]
    fn test_meeting_state_default() {
        let state = MeetingState::default();
        assert_eq!(state.phase, MeetingPhase::Idle);
        assert!(state.meeting_id.is_none());
        assert!(state.elapsed_seconds().is_none());
        assert!(state.phase.is_terminal());
    }

    #[tokio::test]
    async fn test_status_handle_lifecycle() {
        let handle = MeetingStatusHandle::default();

        handle.start("m-1", "exec", "pricing").await;
        let state = handle.get().await;
        assert_eq!(state.phase, MeetingPhase::Initialized);
        assert_eq!(state.meeting_id.as_deref(), Some("m-1"));
        assert!(!state.phase.is_terminal());

        handle.set_phase(MeetingPhase::ComposingContext).await;
        handle.dispatching("cfo", 1).await;
        let state = handle.get().await;
        assert_eq!(state.phase, MeetingPhase::Dispatching);
        assert_eq!(state.current_participant.as_deref(), Some("cfo"));
        assert_eq!(state.turn_index, Some(1));

        handle.appended(2).await;
        assert_eq!(handle.get().await.exchanges_completed, 2);

        handle.complete().await;
        let state = handle.get().await;
        assert_eq!(state.phase, MeetingPhase::Complete);
        assert!(state.current_participant.is_none());
    }

    #[tokio::test]
    async fn test_status_handle_error_and_reset() {
        let handle = MeetingStatusHandle::default();
        handle.start("m-2", "standup", "daily").await;
        handle.set_error("cfo timed out".to_string()).await;

        let state = handle.get().await;
        assert_eq!(state.phase, MeetingPhase::Failed);
        assert_eq!(state.last_error.as_deref(), Some("cfo timed out"));

        handle.reset().await;
        assert_eq!(handle.get().await.phase, MeetingPhase::Idle);
    }
}
