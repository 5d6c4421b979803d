use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generation: GenerationConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub context: ContextConfig,
    pub meeting: MeetingConfig,
    /// Additional participants, or replacements for built-in ones with the same id.
    pub participants: Vec<ParticipantConfig>,
    /// Additional meeting types, or replacements for built-in ones with the same id.
    pub meeting_types: Vec<MeetingTypeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub endpoint: String,
    /// Falls back to the `ANTHROPIC_API_KEY` environment variable when unset.
    pub api_key: Option<String>,
    pub model: String,
    pub api_version: String,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            api_key: None,
            model: "claude-sonnet-4-20250514".to_string(),
            api_version: "2023-06-01".to_string(),
            max_tokens: 2048,
            timeout_seconds: 120,
        }
    }
}

impl GenerationConfig {
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: Option<PathBuf>,
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            busy_timeout_ms: 5000,
        }
    }
}

impl StorageConfig {
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => global::db_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub directory: Option<PathBuf>,
    pub company_file: String,
    pub active_projects_file: String,
    pub pending_ideas_file: String,
    pub directives_file: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            directory: None,
            company_file: "company.md".to_string(),
            active_projects_file: "active_projects.md".to_string(),
            pending_ideas_file: "pending_ideas.md".to_string(),
            directives_file: "directives.md".to_string(),
        }
    }
}

impl ContextConfig {
    pub fn directory(&self) -> Result<PathBuf> {
        match &self.directory {
            Some(dir) => Ok(dir.clone()),
            None => global::context_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingConfig {
    /// Append decisions parsed from a synthesis turn to the decision log.
    pub synthesis_creates_decisions: bool,
    /// Shell command to run after a meeting is persisted.
    /// Receives the markdown transcript via stdin.
    /// Env vars: HUDDLE_MEETING_ID, HUDDLE_MEETING_TYPE,
    /// HUDDLE_MEETING_TOPIC, HUDDLE_EXCHANGE_COUNT
    pub post_command: String,
    pub post_command_timeout_seconds: u64,
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            synthesis_creates_decisions: false,
            post_command: String::new(),
            post_command_timeout_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantConfig {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub persona: String,
    /// Read once at load time; takes precedence over `persona`.
    #[serde(default)]
    pub persona_file: Option<PathBuf>,
    #[serde(default = "default_team")]
    pub team: String,
    #[serde(default)]
    pub reports_to: Option<String>,
}

fn default_team() -> String {
    "operations".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingTypeConfig {
    pub id: String,
    pub name: String,
    /// standup, discussion, idea_review or retrospective; defaults to discussion.
    #[serde(default)]
    pub kind: Option<String>,
    pub participants: Vec<String>,
    #[serde(default)]
    pub context: Vec<String>,
    #[serde(default)]
    pub facilitator: Option<String>,
    #[serde(default)]
    pub synthesis: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = global::config_file()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }
}
