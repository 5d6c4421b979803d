use super::{GenerationRequest, TextGenerator};
use crate::error::GenerationError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// A request as seen by [`ScriptedGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub instruction: String,
    pub message: String,
}

/// Offline generator that replays queued replies in call order.
///
/// Once the queue is empty it answers `"Reply <n>"` where `n` is the 1-based
/// call count. Every request is recorded for inspection.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Option<Duration>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let generator = Self::new();
        for reply in replies {
            generator.push_reply(reply);
        }
        generator
    }

    /// Sleep before answering, so callers can race a timeout or cancellation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Ok(reply.into()));
        }
    }

    pub fn push_failure(&self, error: GenerationError) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Err(error));
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let call_number = match self.calls.lock() {
            Ok(mut calls) => {
                calls.push(RecordedCall {
                    instruction: request.instruction,
                    message: request.message,
                });
                calls.len()
            }
            Err(_) => 0,
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        next.unwrap_or_else(|| Ok(format!("Reply {}", call_number)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransientKind;

    fn request(message: &str) -> GenerationRequest {
        GenerationRequest {
            instruction: "persona".to_string(),
            message: message.to_string(),
            max_tokens: 100,
        }
    }

    #[tokio::test]
    async fn test_replays_queue_then_falls_back() {
        let generator = ScriptedGenerator::with_replies(["first"]);
        generator.push_failure(GenerationError::transient(TransientKind::Timeout, "slow"));

        assert_eq!(generator.generate(request("a")).await.unwrap(), "first");
        assert!(generator.generate(request("b")).await.is_err());
        assert_eq!(generator.generate(request("c")).await.unwrap(), "Reply 3");

        let calls = generator.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].message, "b");
    }
}
