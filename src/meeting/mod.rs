//! Meeting orchestration.
//!
//! Builds a transcript one participant turn at a time, optionally closes it
//! with a facilitator synthesis, persists it and runs post-meeting hooks.

pub mod archive;
pub mod hook;
pub mod prompts;
pub mod run;
pub mod status;
pub mod synthesis;
pub mod transcript;
pub mod turn;

pub use archive::TranscriptArchive;
pub use hook::{PostMeetingHook, ShellCommandHook};
pub use run::{Lineup, MeetingOutcome, MeetingRequest, MeetingRun, RunSettings, DEFAULT_AD_HOC_TEMPLATE};
pub use status::{MeetingPhase, MeetingState, MeetingStatusHandle};
pub use synthesis::{DecisionDraft, DecisionParser, SynthesisStage};
pub use transcript::{
    render_markdown, Exchange, ParticipantRef, Transcript, TranscriptAccumulator, TranscriptStatus,
};
pub use turn::TurnExecutor;
