//! Text-generation client contract.
//!
//! The orchestrator never generates text itself. Each turn makes exactly one
//! call through [`TextGenerator`]; failures come back typed so the caller can
//! tell a retryable hiccup from a request that will never succeed.

pub mod anthropic;
pub mod scripted;

pub use anthropic::AnthropicGenerator;
pub use scripted::{RecordedCall, ScriptedGenerator};

use crate::error::GenerationError;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// System-level text: persona plus assembled context.
    pub instruction: String,
    /// The single user message: prior discussion plus the turn prompt.
    pub message: String,
    pub max_tokens: u32,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}
