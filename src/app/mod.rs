use crate::api::ApiServer;
use crate::config::Config;
use crate::context::{ContextComposer, ContextStore, FsContextStore};
use crate::db::Store;
use crate::decisions::DecisionLog;
use crate::error::MeetingError;
use crate::feature_requests::FeatureRequests;
use crate::generation::{AnthropicGenerator, TextGenerator};
use crate::meeting::{
    MeetingOutcome, MeetingRequest, MeetingRun, MeetingStatusHandle, PostMeetingHook, RunSettings,
    ShellCommandHook, TranscriptArchive, TurnExecutor,
};
use crate::registry::Registry;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Extra time the outer turn timeout allows beyond the HTTP client timeout.
const TURN_TIMEOUT_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct Settings {
    pub max_tokens: u32,
    pub turn_timeout: Duration,
    pub synthesis_creates_decisions: bool,
    pub post_command: Option<String>,
    pub post_command_timeout_seconds: u64,
}

impl Settings {
    pub fn from_config(config: &Config) -> Self {
        let post_command = config.meeting.post_command.trim();
        Self {
            max_tokens: config.generation.max_tokens,
            turn_timeout: Duration::from_secs(config.generation.timeout_seconds) + TURN_TIMEOUT_GRACE,
            synthesis_creates_decisions: config.meeting.synthesis_creates_decisions,
            post_command: (!post_command.is_empty()).then(|| post_command.to_string()),
            post_command_timeout_seconds: config.meeting.post_command_timeout_seconds,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Everything a front end needs to run meetings and read their results.
///
/// Built once per process and passed explicitly; two orchestrators never
/// share state except through the database.
#[derive(Clone)]
pub struct Orchestrator {
    registry: Arc<Registry>,
    generator: Arc<dyn TextGenerator>,
    store: Store,
    status: MeetingStatusHandle,
    run: Arc<MeetingRun>,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<Registry>,
        context_store: Arc<dyn ContextStore>,
        generator: Arc<dyn TextGenerator>,
        store: Store,
        settings: Settings,
    ) -> Result<Self> {
        let status = MeetingStatusHandle::default();
        let hook = settings.post_command.as_ref().map(|command| {
            Arc::new(ShellCommandHook::new(
                command.clone(),
                settings.post_command_timeout_seconds,
            )) as Arc<dyn PostMeetingHook>
        });

        let run = MeetingRun::new(
            registry.clone(),
            ContextComposer::new(context_store),
            TurnExecutor::new(generator.clone(), settings.max_tokens, settings.turn_timeout),
            store.clone(),
            hook,
            status.clone(),
            RunSettings {
                synthesis_creates_decisions: settings.synthesis_creates_decisions,
            },
        )?;

        Ok(Self {
            registry,
            generator,
            store,
            status,
            run: Arc::new(run),
        })
    }

    /// Registry, context directory, database and generation client from
    /// configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = Arc::new(Registry::from_config(config)?);
        let context_store = Arc::new(FsContextStore::from_config(&config.context)?);
        let generator = Arc::new(AnthropicGenerator::new(&config.generation)?);
        let store = Store::from_config(&config.storage)?;

        info!(
            "Orchestrator ready: {} participants, {} meeting types, database {:?}",
            registry.participants().len(),
            registry.meeting_types().len(),
            store.path()
        );

        Self::new(
            registry,
            context_store,
            generator,
            store,
            Settings::from_config(config),
        )
    }

    pub async fn run_meeting(
        &self,
        request: MeetingRequest,
        cancel: &CancellationToken,
    ) -> Result<MeetingOutcome, MeetingError> {
        self.run.execute(request, cancel).await
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    pub fn status(&self) -> &MeetingStatusHandle {
        &self.status
    }

    pub fn transcripts(&self) -> TranscriptArchive {
        TranscriptArchive::new(self.store.clone())
    }

    pub fn decision_log(&self) -> DecisionLog {
        DecisionLog::new(self.store.clone())
    }

    pub fn feature_requests(&self) -> FeatureRequests {
        FeatureRequests::new(self.store.clone(), self.registry.clone())
    }
}

pub async fn run_server(config: Config) -> Result<()> {
    info!("Starting Huddle server");

    let orchestrator = Orchestrator::from_config(&config)?;
    info!("Generation via {}", orchestrator.generator_name());
    let server = ApiServer::new(orchestrator, &config.server);

    info!("Huddle is ready!");
    server.start().await
}
