//! Exchanges, transcripts and the per-meeting accumulator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One participant's contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub participant_id: String,
    pub participant_name: String,
    pub turn_index: usize,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptStatus {
    Complete,
    Failed,
}

impl TranscriptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "complete" => Some(Self::Complete),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub meeting_id: String,
    pub meeting_type: String,
    pub meeting_name: String,
    pub topic: String,
    pub participants: Vec<ParticipantRef>,
    pub facilitator: Option<ParticipantRef>,
    pub exchanges: Vec<Exchange>,
    pub synthesis: Option<Exchange>,
    pub status: TranscriptStatus,
    /// Set when `status` is failed.
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transcript {
    /// An empty transcript with a fresh meeting id.
    pub fn begin(
        meeting_type: impl Into<String>,
        meeting_name: impl Into<String>,
        topic: impl Into<String>,
        participants: Vec<ParticipantRef>,
        facilitator: Option<ParticipantRef>,
    ) -> Self {
        Self {
            meeting_id: uuid::Uuid::new_v4().to_string(),
            meeting_type: meeting_type.into(),
            meeting_name: meeting_name.into(),
            topic: topic.into(),
            participants,
            facilitator,
            exchanges: Vec::new(),
            synthesis: None,
            status: TranscriptStatus::Complete,
            error: None,
            created_at: Utc::now(),
        }
    }

    /// Number of generated turns including synthesis.
    pub fn turn_count(&self) -> usize {
        self.exchanges.len() + usize::from(self.synthesis.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccumulatorError {
    #[error("exchange for '{participant}' has turn_index {got}, expected {expected}")]
    OutOfOrder {
        participant: String,
        expected: usize,
        got: usize,
    },
}

/// Owns the growing exchange sequence of one meeting.
///
/// Only appends whose `turn_index` equals the current length are accepted,
/// which keeps indices contiguous from zero.
#[derive(Debug)]
pub struct TranscriptAccumulator {
    transcript: Transcript,
}

impl TranscriptAccumulator {
    pub fn new(transcript: Transcript) -> Self {
        Self { transcript }
    }

    pub fn meeting_id(&self) -> &str {
        &self.transcript.meeting_id
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.transcript.exchanges
    }

    pub fn len(&self) -> usize {
        self.transcript.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.exchanges.is_empty()
    }

    pub fn push(&mut self, exchange: Exchange) -> Result<(), AccumulatorError> {
        let expected = self.transcript.exchanges.len();
        if exchange.turn_index != expected {
            return Err(AccumulatorError::OutOfOrder {
                participant: exchange.participant_id,
                expected,
                got: exchange.turn_index,
            });
        }
        self.transcript.exchanges.push(exchange);
        Ok(())
    }

    pub fn set_synthesis(&mut self, exchange: Exchange) -> Result<(), AccumulatorError> {
        let expected = self.transcript.exchanges.len();
        if exchange.turn_index != expected {
            return Err(AccumulatorError::OutOfOrder {
                participant: exchange.participant_id,
                expected,
                got: exchange.turn_index,
            });
        }
        self.transcript.synthesis = Some(exchange);
        Ok(())
    }

    /// Snapshot of the transcript so far, marked failed.
    pub fn snapshot_failed(&self, error: impl Into<String>) -> Transcript {
        let mut transcript = self.transcript.clone();
        transcript.status = TranscriptStatus::Failed;
        transcript.error = Some(error.into());
        transcript
    }

    pub fn finish(self) -> Transcript {
        self.transcript
    }
}

/// Human-readable form used by `meetings show`, the markdown HTTP view and
/// the post-meeting hook.
pub fn render_markdown(transcript: &Transcript) -> String {
    let participants = transcript
        .participants
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec![
        format!("# {}: {}", transcript.meeting_name, transcript.topic),
        format!("**Date:** {}", transcript.created_at.format("%Y-%m-%d")),
        format!("**Meeting ID:** {}", transcript.meeting_id),
        format!("**Participants:** {}", participants),
    ];
    if let Some(facilitator) = &transcript.facilitator {
        lines.push(format!("**Facilitator:** {}", facilitator.name));
    }
    if transcript.status == TranscriptStatus::Failed {
        lines.push(format!(
            "**Status:** failed ({})",
            transcript.error.as_deref().unwrap_or("unknown error")
        ));
    }

    lines.extend([
        String::new(),
        "---".to_string(),
        String::new(),
        "## Agenda".to_string(),
        transcript.topic.clone(),
        String::new(),
        "---".to_string(),
        String::new(),
        "## Discussion".to_string(),
        String::new(),
    ]);

    for exchange in &transcript.exchanges {
        lines.push(format!("### {}", exchange.participant_name));
        lines.push(exchange.text.clone());
        lines.push(String::new());
    }

    if let Some(synthesis) = &transcript.synthesis {
        lines.extend([
            "---".to_string(),
            String::new(),
            format!("## Synthesis (by {})", synthesis.participant_name),
            synthesis.text.clone(),
            String::new(),
        ]);
    }

    lines.extend([
        "---".to_string(),
        String::new(),
        "*Meeting generated by Huddle*".to_string(),
    ]);

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(id: &str, turn_index: usize, text: &str) -> Exchange {
        Exchange {
            participant_id: id.to_string(),
            participant_name: id.to_uppercase(),
            turn_index,
            text: text.to_string(),
            timestamp: Utc::now(),
        }
    }

    fn refs(ids: &[&str]) -> Vec<ParticipantRef> {
        ids.iter()
            .map(|id| ParticipantRef {
                id: id.to_string(),
                name: id.to_uppercase(),
            })
            .collect()
    }

    #[test]
    fn test_begin_assigns_uuid() {
        let a = Transcript::begin("exec", "Executive Meeting", "pricing", vec![], None);
        let b = Transcript::begin("exec", "Executive Meeting", "pricing", vec![], None);
        assert_ne!(a.meeting_id, b.meeting_id);
        assert!(uuid::Uuid::parse_str(&a.meeting_id).is_ok());
    }

    #[test]
    fn test_accumulator_enforces_contiguity() {
        let mut acc =
            TranscriptAccumulator::new(Transcript::begin("exec", "Exec", "t", refs(&["ceo"]), None));

        acc.push(exchange("ceo", 0, "first")).unwrap();
        let err = acc.push(exchange("cfo", 2, "skipped")).unwrap_err();
        assert_eq!(
            err,
            AccumulatorError::OutOfOrder {
                participant: "cfo".to_string(),
                expected: 1,
                got: 2
            }
        );
        acc.push(exchange("cfo", 1, "second")).unwrap();

        let transcript = acc.finish();
        let indices: Vec<_> = transcript.exchanges.iter().map(|e| e.turn_index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_synthesis_index_follows_exchanges() {
        let mut acc =
            TranscriptAccumulator::new(Transcript::begin("strategy", "Strategy", "t", vec![], None));
        acc.push(exchange("cito", 0, "a")).unwrap();

        assert!(acc.set_synthesis(exchange("cito", 0, "s")).is_err());
        acc.set_synthesis(exchange("cito", 1, "s")).unwrap();
        assert_eq!(acc.finish().turn_count(), 2);
    }

    #[test]
    fn test_failed_snapshot_keeps_exchanges() {
        let mut acc =
            TranscriptAccumulator::new(Transcript::begin("exec", "Exec", "t", vec![], None));
        acc.push(exchange("ceo", 0, "a")).unwrap();

        let snapshot = acc.snapshot_failed("cfo timed out");
        assert_eq!(snapshot.status, TranscriptStatus::Failed);
        assert_eq!(snapshot.exchanges.len(), 1);
        assert_eq!(snapshot.error.as_deref(), Some("cfo timed out"));
    }

    #[test]
    fn test_render_markdown_layout() {
        let mut transcript = Transcript::begin(
            "strategy",
            "Strategy Session",
            "Q3 roadmap",
            refs(&["cito", "pm"]),
            refs(&["cito"]).pop(),
        );
        transcript.exchanges.push(exchange("cito", 0, "Ship the API."));
        transcript.exchanges.push(exchange("pm", 1, "Timeline is tight."));
        transcript.synthesis = Some(exchange("cito", 2, "## Summary\nAgreed."));

        let md = render_markdown(&transcript);
        assert!(md.starts_with("# Strategy Session: Q3 roadmap\n**Date:** "));
        assert!(md.contains("**Participants:** CITO, PM"));
        assert!(md.contains("**Facilitator:** CITO"));
        assert!(md.contains("## Discussion\n\n### CITO\nShip the API.\n\n### PM\nTimeline is tight."));
        assert!(md.contains("## Synthesis (by CITO)\n## Summary\nAgreed."));
        assert!(md.ends_with("*Meeting generated by Huddle*"));
        assert!(!md.contains("**Status:**"));
    }
}
