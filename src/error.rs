//! Error taxonomy shared by the orchestrator and both front ends.
//!
//! Every variant names the entity it concerns (meeting, participant,
//! context key, decision id) so callers never have to guess what failed.

use crate::meeting::Transcript;
use thiserror::Error;

/// Static configuration problems. Always raised before any generation call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Unknown meeting type '{0}'")]
    UnknownMeetingType(String),

    #[error("Unknown participant '{0}'")]
    UnknownParticipant(String),

    #[error("Duplicate participant id '{0}'")]
    DuplicateParticipant(String),

    #[error("Meeting type '{0}' has no participants")]
    EmptyParticipantList(String),

    #[error("Unknown context key '{0}'")]
    InvalidContextKey(String),

    #[error("Context document '{key}' is missing or empty")]
    MissingContextDocument { key: String },

    #[error("Context document '{key}' could not be read: {reason}")]
    UnreadableContextDocument { key: String, reason: String },

    #[error("Participant '{participant}' reports to unknown participant '{reports_to}'")]
    UnknownReportingLine {
        participant: String,
        reports_to: String,
    },

    #[error("Meeting type '{0}' enables synthesis but has no facilitator")]
    MissingFacilitator(String),
}

/// Why a transient generation failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientKind {
    Timeout,
    RateLimited,
    Unavailable,
    Network,
}

impl TransientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::Unavailable => "unavailable",
            Self::Network => "network",
        }
    }
}

/// Why a permanent generation failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermanentKind {
    InvalidInput,
    Auth,
    MalformedResponse,
}

impl PermanentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::Auth => "auth",
            Self::MalformedResponse => "malformed_response",
        }
    }
}

/// Failure of one call to the text-generation service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("transient generation failure ({}): {message}", kind.as_str())]
    Transient { kind: TransientKind, message: String },

    #[error("permanent generation failure ({}): {message}", kind.as_str())]
    Permanent { kind: PermanentKind, message: String },

    #[error("generation cancelled")]
    Cancelled,
}

impl GenerationError {
    pub fn transient(kind: TransientKind, message: impl Into<String>) -> Self {
        Self::Transient {
            kind,
            message: message.into(),
        }
    }

    pub fn permanent(kind: PermanentKind, message: impl Into<String>) -> Self {
        Self::Permanent {
            kind,
            message: message.into(),
        }
    }

    /// Whether a caller may reasonably retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Outcome of a meeting that did not complete.
#[derive(Debug, Error)]
pub enum MeetingError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Meeting {} failed at participant '{participant}' (turn {turn_index}): {source}", partial.meeting_id)]
    Generation {
        participant: String,
        turn_index: usize,
        partial: Box<Transcript>,
        #[source]
        source: GenerationError,
    },

    #[error("Meeting {} was cancelled after {} exchange(s)", partial.meeting_id, partial.exchanges.len())]
    Cancelled { partial: Box<Transcript> },

    #[error("Meeting {} completed but could not be persisted: {source}", transcript.meeting_id)]
    Persistence {
        transcript: Box<Transcript>,
        #[source]
        source: anyhow::Error,
    },
}

impl MeetingError {
    /// The transcript built before the failure, if any turn ran.
    pub fn transcript(&self) -> Option<&Transcript> {
        match self {
            Self::Configuration(_) => None,
            Self::Generation { partial, .. } | Self::Cancelled { partial } => Some(partial),
            Self::Persistence { transcript, .. } => Some(transcript),
        }
    }
}

/// Decision Log failures.
#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("Decision {0} not found")]
    NotFound(i64),

    #[error("Decision {id} cannot move from {from} to {to}")]
    InvalidTransition { id: i64, from: String, to: String },

    #[error("Invalid decision status '{0}' (expected pending, in_progress or completed)")]
    InvalidStatus(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Feature request failures.
#[derive(Debug, Error)]
pub enum FeatureRequestError {
    #[error("Feature request {0} not found")]
    NotFound(i64),

    #[error("Feature request {id} cannot move from {from} to {to}")]
    InvalidTransition { id: i64, from: String, to: String },

    #[error("Invalid value '{value}' for {field}")]
    InvalidValue { field: &'static str, value: String },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
