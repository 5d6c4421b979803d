//! Synthesis Stage: the facilitator's closing turn over the whole transcript.

use super::prompts;
use super::transcript::Exchange;
use super::turn::TurnExecutor;
use crate::error::GenerationError;
use crate::registry::Participant;
use anyhow::Result;
use regex::Regex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A decision parsed out of synthesis text, not yet in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionDraft {
    pub text: String,
    pub rationale: String,
    pub owner: String,
}

pub struct SynthesisStage;

impl SynthesisStage {
    /// One extra turn whose prior discussion is every exchange so far.
    pub async fn run(
        executor: &TurnExecutor,
        facilitator: &Participant,
        context: &str,
        transcript: &[Exchange],
        topic: &str,
        cancel: &CancellationToken,
    ) -> Result<Exchange, GenerationError> {
        debug!(
            "Synthesizing {} exchanges with facilitator '{}'",
            transcript.len(),
            facilitator.id
        );
        executor
            .execute(
                facilitator,
                context,
                transcript,
                &prompts::synthesis(topic),
                cancel,
            )
            .await
    }
}

fn clean(value: &str) -> String {
    value
        .trim()
        .trim_start_matches(['-', '*'])
        .trim()
        .trim_matches(|c| c == '[' || c == ']')
        .trim()
        .to_string()
}

/// Parses the `## Decisions` section of a synthesis.
pub struct DecisionParser {
    field: Regex,
    heading: Regex,
}

impl DecisionParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            field: Regex::new(r"\*\*(Decision|Rationale|Owner):\*\*\s*")?,
            heading: Regex::new(r"^#{1,3}\s+(.+?)\s*$")?,
        })
    }

    /// Fields may sit on one line or on nested bullet lines. Decisions
    /// without text are skipped; a missing rationale or owner stays empty.
    pub fn parse(&self, text: &str) -> Vec<DecisionDraft> {
        let mut drafts: Vec<DecisionDraft> = Vec::new();
        let mut in_section = false;

        for line in text.lines() {
            if let Some(caps) = self.heading.captures(line.trim()) {
                in_section = caps[1].eq_ignore_ascii_case("decisions");
                continue;
            }
            if !in_section {
                continue;
            }

            let markers: Vec<_> = self.field.captures_iter(line).collect();
            for (i, caps) in markers.iter().enumerate() {
                let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let end = markers
                    .get(i + 1)
                    .and_then(|next| next.get(0))
                    .map(|m| m.start())
                    .unwrap_or(line.len());
                let value = clean(&line[whole.end()..end]);

                match name.as_str() {
                    "Decision" => drafts.push(DecisionDraft {
                        text: value,
                        rationale: String::new(),
                        owner: String::new(),
                    }),
                    "Rationale" => {
                        if let Some(draft) = drafts.last_mut() {
                            draft.rationale = value;
                        }
                    }
                    _ => {
                        if let Some(draft) = drafts.last_mut() {
                            draft.owner = value;
                        }
                    }
                }
            }
        }

        drafts.retain(|d| !d.text.is_empty());
        drafts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_decisions(text: &str) -> Vec<DecisionDraft> {
        DecisionParser::new().unwrap().parse(text)
    }

    #[test]
    fn test_extracts_nested_decisions() {
        let text = "## Summary
We talked.

## Decisions
- **Decision:** Raise prices by 10%
  - **Rationale:** Costs went up
  - **Owner:** CFO
- **Decision:** Freeze hiring
  - **Owner:** CEO

## Action Items
- [ ] @CFO: **Decision:** not a decision";

        let drafts = extract_decisions(text);
        assert_eq!(
            drafts,
            vec![
                DecisionDraft {
                    text: "Raise prices by 10%".to_string(),
                    rationale: "Costs went up".to_string(),
                    owner: "CFO".to_string(),
                },
                DecisionDraft {
                    text: "Freeze hiring".to_string(),
                    rationale: String::new(),
                    owner: "CEO".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_extracts_single_line_decision() {
        let text = "## Decisions\n- **Decision:** Ship v2 **Rationale:** Users asked **Owner:** PM\n";
        let drafts = extract_decisions(text);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].text, "Ship v2");
        assert_eq!(drafts[0].rationale, "Users asked");
        assert_eq!(drafts[0].owner, "PM");
    }

    #[test]
    fn test_no_decisions_section() {
        assert!(extract_decisions("## Summary\nNothing decided.").is_empty());
    }

    #[test]
    fn test_placeholder_brackets_are_stripped() {
        let text = "## Decisions\n- **Decision:** [Adopt Rust]\n  - **Owner:** [DevLead]";
        let drafts = extract_decisions(text);
        assert_eq!(drafts[0].text, "Adopt Rust");
        assert_eq!(drafts[0].owner, "DevLead");
    }
}
