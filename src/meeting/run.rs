//! Meeting Run: the lifecycle of one meeting.
//!
//! resolve lineup → compose context → turns in order → [synthesis] →
//! persist → hook → done
//!
//! Turns run strictly one after another; each exchange is appended before
//! the next participant is called. The database is only touched after the
//! last generation call returns.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::context::ContextComposer;
use crate::db::{DecisionRepository, Store, TranscriptRepository};
use crate::decisions::{Decision, NewDecision};
use crate::error::{ConfigurationError, GenerationError, MeetingError, PermanentKind};
use crate::registry::{MeetingType, Participant, Registry};

use super::hook::PostMeetingHook;
use super::prompts;
use super::status::{MeetingPhase, MeetingStatusHandle};
use super::synthesis::{DecisionParser, SynthesisStage};
use super::transcript::{Exchange, ParticipantRef, Transcript, TranscriptAccumulator};
use super::turn::TurnExecutor;

/// Meeting type used as the template for ad hoc lineups when none is named.
pub const DEFAULT_AD_HOC_TEMPLATE: &str = "custom";

/// Who attends a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lineup {
    /// A registered meeting type exactly as configured.
    MeetingType(String),
    /// An explicit participant list. Name, context keys and prompt style
    /// come from the `template` meeting type, as do the facilitator and the
    /// synthesis flag unless given here.
    AdHoc {
        template: String,
        participants: Vec<String>,
        facilitator: Option<String>,
        synthesis: Option<bool>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRequest {
    pub lineup: Lineup,
    pub topic: String,
    /// Replaces the meeting type's default turn prompt.
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub extra_context: Option<String>,
}

impl MeetingRequest {
    pub fn for_type(meeting_type: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            lineup: Lineup::MeetingType(meeting_type.into()),
            topic: topic.into(),
            prompt: None,
            extra_context: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MeetingOutcome {
    pub transcript: Transcript,
    /// Decisions appended from the synthesis, if that is enabled.
    pub decisions: Vec<Decision>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunSettings {
    pub synthesis_creates_decisions: bool,
}

/// A lineup resolved against the registry.
struct Plan<'a> {
    meeting_type: MeetingType,
    participants: Vec<&'a Participant>,
    facilitator: Option<&'a Participant>,
}

impl Plan<'_> {
    fn synthesis(&self) -> Option<&Participant> {
        if self.meeting_type.synthesis {
            self.facilitator
        } else {
            None
        }
    }
}

fn participant_ref(participant: &Participant) -> ParticipantRef {
    ParticipantRef {
        id: participant.id.clone(),
        name: participant.display_name.clone(),
    }
}

pub struct MeetingRun {
    registry: Arc<Registry>,
    composer: ContextComposer,
    executor: TurnExecutor,
    store: Store,
    hook: Option<Arc<dyn PostMeetingHook>>,
    status: MeetingStatusHandle,
    parser: DecisionParser,
    settings: RunSettings,
}

impl MeetingRun {
    pub fn new(
        registry: Arc<Registry>,
        composer: ContextComposer,
        executor: TurnExecutor,
        store: Store,
        hook: Option<Arc<dyn PostMeetingHook>>,
        status: MeetingStatusHandle,
        settings: RunSettings,
    ) -> Result<Self> {
        Ok(Self {
            registry,
            composer,
            executor,
            store,
            hook,
            status,
            parser: DecisionParser::new()?,
            settings,
        })
    }

    pub fn status(&self) -> &MeetingStatusHandle {
        &self.status
    }

    fn plan(&self, lineup: &Lineup) -> Result<Plan<'_>, ConfigurationError> {
        let (meeting_type, ids) = match lineup {
            Lineup::MeetingType(id) => {
                let meeting_type = self.registry.meeting_type(id)?.clone();
                let ids = meeting_type.participants.clone();
                (meeting_type, ids)
            }
            Lineup::AdHoc {
                template,
                participants,
                facilitator,
                synthesis,
            } => {
                let mut meeting_type = self.registry.meeting_type(template)?.clone();
                meeting_type.participants = participants.clone();
                if facilitator.is_some() {
                    meeting_type.facilitator = facilitator.clone();
                }
                if let Some(synthesis) = synthesis {
                    meeting_type.synthesis = *synthesis;
                }
                (meeting_type, participants.clone())
            }
        };

        if ids.is_empty() {
            return Err(ConfigurationError::EmptyParticipantList(
                meeting_type.id.clone(),
            ));
        }
        let participants = self.registry.resolve_lineup(&ids)?;

        let facilitator = meeting_type
            .facilitator
            .as_deref()
            .map(|id| self.registry.participant(id))
            .transpose()?;
        if meeting_type.synthesis && facilitator.is_none() {
            return Err(ConfigurationError::MissingFacilitator(
                meeting_type.id.clone(),
            ));
        }

        Ok(Plan {
            meeting_type,
            participants,
            facilitator,
        })
    }

    /// Run one meeting to completion or to its first failure.
    ///
    /// Configuration problems are reported before any generation call. A
    /// failed or cancelled meeting keeps the exchanges produced so far and
    /// stores them with status `failed`.
    pub async fn execute(
        &self,
        request: MeetingRequest,
        cancel: &CancellationToken,
    ) -> Result<MeetingOutcome, MeetingError> {
        let plan = match self.plan(&request.lineup) {
            Ok(plan) => plan,
            Err(e) => {
                self.status.set_error(e.to_string()).await;
                return Err(e.into());
            }
        };

        let mut accumulator = TranscriptAccumulator::new(Transcript::begin(
            plan.meeting_type.id.clone(),
            plan.meeting_type.name.clone(),
            request.topic.clone(),
            plan.participants.iter().map(|p| participant_ref(p)).collect(),
            plan.synthesis().map(participant_ref),
        ));
        let meeting_id = accumulator.meeting_id().to_string();

        self.status
            .start(&meeting_id, &plan.meeting_type.id, &request.topic)
            .await;
        info!(
            "Meeting {} ({}) started: '{}' with {} participant(s)",
            meeting_id,
            plan.meeting_type.id,
            request.topic,
            plan.participants.len()
        );

        self.status.set_phase(MeetingPhase::ComposingContext).await;
        let context = match self
            .composer
            .compose(&plan.meeting_type, request.extra_context.as_deref())
        {
            Ok(context) => context,
            Err(e) => {
                error!("Meeting {}: {}", meeting_id, e);
                self.status.set_error(e.to_string()).await;
                return Err(e.into());
            }
        };

        let prompt = request
            .prompt
            .clone()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| prompts::default_for(&plan.meeting_type, &request.topic));

        for participant in &plan.participants {
            let turn_index = accumulator.len();
            self.status.dispatching(&participant.id, turn_index).await;
            info!(
                "Meeting {}: dispatching turn {} to '{}'",
                meeting_id, turn_index, participant.id
            );

            self.status.set_phase(MeetingPhase::AwaitingResponse).await;
            let result = self
                .executor
                .execute(participant, &context, accumulator.exchanges(), &prompt, cancel)
                .await;

            if let Err(e) = result.and_then(|exchange| append(&mut accumulator, exchange)) {
                return Err(self.abort(&accumulator, participant, turn_index, e).await);
            }

            self.status.appended(accumulator.len()).await;
        }

        if let Some(facilitator) = plan.synthesis() {
            let turn_index = accumulator.len();
            self.status.set_phase(MeetingPhase::Synthesizing).await;
            info!(
                "Meeting {}: synthesis by '{}' over {} exchange(s)",
                meeting_id,
                facilitator.id,
                accumulator.len()
            );

            let result = SynthesisStage::run(
                &self.executor,
                facilitator,
                &context,
                accumulator.exchanges(),
                &request.topic,
                cancel,
            )
            .await;

            let result = result.and_then(|exchange| {
                accumulator
                    .set_synthesis(exchange)
                    .map_err(|e| GenerationError::permanent(PermanentKind::MalformedResponse, e.to_string()))
            });
            if let Err(e) = result {
                return Err(self.abort(&accumulator, facilitator, turn_index, e).await);
            }
        }

        let transcript = accumulator.finish();
        let drafts = self.decision_drafts(&transcript);

        self.status.set_phase(MeetingPhase::Persisting).await;
        let record = transcript.clone();
        let persisted = self
            .store
            .write_async(move |tx| {
                TranscriptRepository::insert(tx, &record)?;
                let now = chrono::Utc::now();
                drafts
                    .iter()
                    .map(|draft| DecisionRepository::insert(tx, draft, now))
                    .collect::<Result<Vec<_>>>()
            })
            .await;

        let decisions = match persisted {
            Ok(decisions) => decisions,
            Err(e) => {
                error!("Meeting {}: failed to persist transcript: {:#}", meeting_id, e);
                self.status.set_error(format!("{:#}", e)).await;
                return Err(MeetingError::Persistence {
                    transcript: Box::new(transcript),
                    source: e,
                });
            }
        };

        self.status.complete().await;
        info!(
            "Meeting {} complete: {} exchange(s), synthesis: {}, {} decision(s) logged",
            meeting_id,
            transcript.exchanges.len(),
            transcript.synthesis.is_some(),
            decisions.len()
        );

        if let Some(hook) = &self.hook {
            if let Err(e) = hook.execute(&transcript).await {
                warn!("Post-meeting hook failed for meeting {}: {:#}", meeting_id, e);
            }
        }

        Ok(MeetingOutcome {
            transcript,
            decisions,
        })
    }

    fn decision_drafts(&self, transcript: &Transcript) -> Vec<NewDecision> {
        if !self.settings.synthesis_creates_decisions {
            return Vec::new();
        }
        let Some(synthesis) = &transcript.synthesis else {
            return Vec::new();
        };

        self.parser
            .parse(&synthesis.text)
            .into_iter()
            .map(|draft| NewDecision {
                topic: transcript.topic.clone(),
                text: draft.text,
                rationale: draft.rationale,
                owner: draft.owner,
                meeting_id: Some(transcript.meeting_id.clone()),
            })
            .collect()
    }

    /// Stop the meeting, store what was produced and build the error.
    async fn abort(
        &self,
        accumulator: &TranscriptAccumulator,
        participant: &Participant,
        turn_index: usize,
        source: GenerationError,
    ) -> MeetingError {
        let meeting_id = accumulator.meeting_id();
        let partial = accumulator.snapshot_failed(format!(
            "'{}' (turn {}): {}",
            participant.id, turn_index, source
        ));

        match &source {
            GenerationError::Cancelled => warn!(
                "Meeting {} cancelled at '{}' (turn {})",
                meeting_id, participant.id, turn_index
            ),
            _ => error!(
                "Meeting {} failed at '{}' (turn {}): {}",
                meeting_id, participant.id, turn_index, source
            ),
        }
        self.status
            .set_error(partial.error.clone().unwrap_or_default())
            .await;

        let record = partial.clone();
        if let Err(e) = self
            .store
            .write_async(move |tx| TranscriptRepository::insert(tx, &record))
            .await
        {
            error!(
                "Meeting {}: failed to persist partial transcript: {:#}",
                meeting_id, e
            );
        }

        match source {
            GenerationError::Cancelled => MeetingError::Cancelled {
                partial: Box::new(partial),
            },
            source => MeetingError::Generation {
                participant: participant.id.clone(),
                turn_index,
                partial: Box::new(partial),
                source,
            },
        }
    }
}

fn append(accumulator: &mut TranscriptAccumulator, exchange: Exchange) -> Result<(), GenerationError> {
    accumulator
        .push(exchange)
        .map_err(|e| GenerationError::permanent(PermanentKind::MalformedResponse, e.to_string()))
}
