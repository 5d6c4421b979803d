//! Turn Executor: one participant, one generation call.

use super::prompts::{CONTEXT_HEADER, PRIOR_DISCUSSION_HEADER};
use super::transcript::Exchange;
use crate::error::{GenerationError, TransientKind};
use crate::generation::{GenerationRequest, TextGenerator};
use crate::registry::Participant;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Persona followed by the assembled context.
pub fn build_instruction(participant: &Participant, context: &str) -> String {
    if context.is_empty() {
        return participant.persona.clone();
    }
    format!("{}\n\n{}\n\n{}", participant.persona, CONTEXT_HEADER, context)
}

/// Every earlier exchange in order, then the turn prompt.
pub fn build_message(prior: &[Exchange], prompt: &str) -> String {
    if prior.is_empty() {
        return prompt.to_string();
    }

    let discussion = prior
        .iter()
        .map(|e| format!("### {}\n{}", e.participant_name, e.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{}\n\n{}\n\n---\n\n{}",
        PRIOR_DISCUSSION_HEADER, discussion, prompt
    )
}

#[derive(Clone)]
pub struct TurnExecutor {
    generator: Arc<dyn TextGenerator>,
    max_tokens: u32,
    timeout: Duration,
}

impl TurnExecutor {
    pub fn new(generator: Arc<dyn TextGenerator>, max_tokens: u32, timeout: Duration) -> Self {
        Self {
            generator,
            max_tokens,
            timeout,
        }
    }

    /// Run one turn. Makes exactly one generator call and never retries.
    ///
    /// The returned exchange has `turn_index == prior.len()`.
    pub async fn execute(
        &self,
        participant: &Participant,
        context: &str,
        prior: &[Exchange],
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<Exchange, GenerationError> {
        let turn_index = prior.len();
        let request = GenerationRequest {
            instruction: build_instruction(participant, context),
            message: build_message(prior, prompt),
            max_tokens: self.max_tokens,
        };

        debug!(
            "Turn {} for '{}' via {} ({} prior exchanges)",
            turn_index,
            participant.id,
            self.generator.name(),
            prior.len()
        );

        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        let call = tokio::time::timeout(self.timeout, self.generator.generate(request));
        let text = tokio::select! {
            _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
            result = call => match result {
                Ok(inner) => inner?,
                Err(_) => {
                    return Err(GenerationError::transient(
                        TransientKind::Timeout,
                        format!("no response within {}s", self.timeout.as_secs()),
                    ))
                }
            },
        };

        info!(
            "Turn {} complete: {} replied with {} chars",
            turn_index,
            participant.display_name,
            text.len()
        );

        Ok(Exchange {
            participant_id: participant.id.clone(),
            participant_name: participant.display_name.clone(),
            turn_index,
            text,
            timestamp: Utc::now(),
        })
    }
}
