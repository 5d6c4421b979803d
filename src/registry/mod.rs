//! Role Registry and Meeting Type Registry.
//!
//! Built once from configuration and never mutated afterwards. The registry is
//! handed to the orchestrator explicitly, so several orchestrators (as in
//! tests) each carry their own catalogue.

mod builtin;

use crate::config::{Config, MeetingTypeConfig, ParticipantConfig};
use crate::context::ContextKind;
use crate::error::ConfigurationError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Executive,
    Technical,
    Operations,
}

impl Team {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Executive => "executive",
            Self::Technical => "technical",
            Self::Operations => "operations",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "executive" => Some(Self::Executive),
            "technical" => Some(Self::Technical),
            "operations" => Some(Self::Operations),
            _ => None,
        }
    }
}

/// Selects the turn prompt a meeting uses when the caller supplies none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingKind {
    Standup,
    Discussion,
    IdeaReview,
    Retrospective,
}

impl MeetingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standup => "standup",
            Self::Discussion => "discussion",
            Self::IdeaReview => "idea_review",
            Self::Retrospective => "retrospective",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "standup" => Some(Self::Standup),
            "discussion" => Some(Self::Discussion),
            "idea_review" => Some(Self::IdeaReview),
            "retrospective" | "retro" => Some(Self::Retrospective),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: String,
    pub display_name: String,
    pub title: String,
    /// Opaque instruction text handed to the generator.
    #[serde(skip)]
    pub persona: String,
    pub team: Team,
    pub reports_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeetingType {
    pub id: String,
    pub name: String,
    pub kind: MeetingKind,
    pub participants: Vec<String>,
    pub context: Vec<ContextKind>,
    pub facilitator: Option<String>,
    pub synthesis: bool,
}

#[derive(Debug, Clone)]
pub struct Registry {
    participants: Vec<Participant>,
    meeting_types: Vec<MeetingType>,
}

impl Registry {
    /// The default catalogue of twelve roles and six meeting types.
    pub fn builtin() -> Self {
        Self {
            participants: builtin::participants(),
            meeting_types: builtin::meeting_types(),
        }
    }

    /// Build and validate a registry from explicit lists.
    pub fn from_parts(
        participants: Vec<Participant>,
        meeting_types: Vec<MeetingType>,
    ) -> Result<Self, ConfigurationError> {
        let registry = Self {
            participants,
            meeting_types,
        };
        registry.validate()?;
        Ok(registry)
    }

    /// Built-in catalogue with configured entries added or replacing by id.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut participants = builtin::participants();
        let mut seen = HashSet::new();

        for entry in &config.participants {
            if !seen.insert(entry.id.clone()) {
                return Err(ConfigurationError::DuplicateParticipant(entry.id.clone()).into());
            }
            let participant = participant_from_config(entry)?;
            upsert(&mut participants, participant, |p| &p.id);
        }

        let mut meeting_types = builtin::meeting_types();
        for entry in &config.meeting_types {
            let meeting_type = meeting_type_from_config(entry)?;
            upsert(&mut meeting_types, meeting_type, |m| &m.id);
        }

        debug!(
            "Registry loaded: {} participants, {} meeting types",
            participants.len(),
            meeting_types.len()
        );

        Ok(Self::from_parts(participants, meeting_types)?)
    }

    /// Check every cross reference in the catalogue.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let mut ids = HashSet::new();
        for participant in &self.participants {
            if !ids.insert(participant.id.as_str()) {
                return Err(ConfigurationError::DuplicateParticipant(
                    participant.id.clone(),
                ));
            }
        }

        for participant in &self.participants {
            if let Some(boss) = &participant.reports_to {
                if !ids.contains(boss.as_str()) {
                    return Err(ConfigurationError::UnknownReportingLine {
                        participant: participant.id.clone(),
                        reports_to: boss.clone(),
                    });
                }
            }
        }

        for meeting_type in &self.meeting_types {
            if meeting_type.participants.is_empty() {
                return Err(ConfigurationError::EmptyParticipantList(
                    meeting_type.id.clone(),
                ));
            }
            for id in &meeting_type.participants {
                if !ids.contains(id.as_str()) {
                    return Err(ConfigurationError::UnknownParticipant(id.clone()));
                }
            }
            match &meeting_type.facilitator {
                Some(id) if !ids.contains(id.as_str()) => {
                    return Err(ConfigurationError::UnknownParticipant(id.clone()));
                }
                None if meeting_type.synthesis => {
                    return Err(ConfigurationError::MissingFacilitator(
                        meeting_type.id.clone(),
                    ));
                }
                _ => {}
            }
        }

        Ok(())
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn meeting_types(&self) -> &[MeetingType] {
        &self.meeting_types
    }

    pub fn participant(&self, id: &str) -> Result<&Participant, ConfigurationError> {
        self.participants
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ConfigurationError::UnknownParticipant(id.to_string()))
    }

    pub fn meeting_type(&self, id: &str) -> Result<&MeetingType, ConfigurationError> {
        self.meeting_types
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| ConfigurationError::UnknownMeetingType(id.to_string()))
    }

    /// Resolve an ordered id list; unknown or repeated ids are rejected.
    pub fn resolve_lineup<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<Vec<&Participant>, ConfigurationError> {
        let mut seen = HashSet::new();
        let mut lineup = Vec::with_capacity(ids.len());

        for id in ids {
            let id = id.as_ref();
            if !seen.insert(id) {
                return Err(ConfigurationError::DuplicateParticipant(id.to_string()));
            }
            lineup.push(self.participant(id)?);
        }

        Ok(lineup)
    }

    /// Participants grouped by team, in catalogue order.
    pub fn by_team(&self, team: Team) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(move |p| p.team == team)
    }
}

fn upsert<T>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> &String) {
    match items.iter().position(|existing| key(existing) == key(&item)) {
        Some(index) => items[index] = item,
        None => items.push(item),
    }
}

fn participant_from_config(entry: &ParticipantConfig) -> Result<Participant> {
    let persona = match &entry.persona_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read persona file {}", path.display()))?,
        None => entry.persona.clone(),
    };

    let team = Team::parse(&entry.team)
        .with_context(|| format!("Unknown team '{}' for participant '{}'", entry.team, entry.id))?;

    Ok(Participant {
        id: entry.id.clone(),
        display_name: entry.display_name.clone(),
        title: entry.display_name.clone(),
        persona,
        team,
        reports_to: entry.reports_to.clone(),
    })
}

fn meeting_type_from_config(entry: &MeetingTypeConfig) -> Result<MeetingType> {
    let kind = match entry.kind.as_deref() {
        Some(value) => MeetingKind::parse(value).with_context(|| {
            format!("Unknown kind '{}' for meeting type '{}'", value, entry.id)
        })?,
        None => MeetingKind::Discussion,
    };

    let context = entry
        .context
        .iter()
        .map(|key| ContextKind::parse(key))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MeetingType {
        id: entry.id.clone(),
        name: entry.name.clone(),
        kind,
        participants: entry.participants.clone(),
        context,
        facilitator: entry.facilitator.clone(),
        synthesis: entry.synthesis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalogue_is_valid() {
        let registry = Registry::builtin();
        registry.validate().unwrap();

        assert_eq!(registry.participants().len(), 12);
        assert_eq!(registry.meeting_types().len(), 6);
        assert_eq!(registry.by_team(Team::Technical).count(), 3);
    }

    #[test]
    fn test_exec_lineup() {
        let registry = Registry::builtin();
        let exec = registry.meeting_type("exec").unwrap();
        let lineup = registry.resolve_lineup(&exec.participants).unwrap();

        let names: Vec<_> = lineup.iter().map(|p| p.display_name.as_str()).collect();
        assert_eq!(names, vec!["CEO", "CFO", "CITO"]);
        assert!(!exec.synthesis);
    }

    #[test]
    fn test_unknown_lookups() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.meeting_type("board").unwrap_err(),
            ConfigurationError::UnknownMeetingType("board".to_string())
        );
        assert_eq!(
            registry.resolve_lineup(&["ceo", "cmo"]).unwrap_err(),
            ConfigurationError::UnknownParticipant("cmo".to_string())
        );
    }

    #[test]
    fn test_duplicate_in_lineup_rejected() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.resolve_lineup(&["pm", "pm"]).unwrap_err(),
            ConfigurationError::DuplicateParticipant("pm".to_string())
        );
    }

    #[test]
    fn test_dangling_reporting_line_rejected() {
        let mut participants = builtin::participants();
        participants[1].reports_to = Some("board".to_string());

        let err = Registry::from_parts(participants, builtin::meeting_types()).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownReportingLine {
                participant: "cfo".to_string(),
                reports_to: "board".to_string(),
            }
        );
    }

    #[test]
    fn test_synthesis_without_facilitator_rejected() {
        let mut types = builtin::meeting_types();
        types[1].facilitator = None;

        let err = Registry::from_parts(builtin::participants(), types).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MissingFacilitator("strategy".to_string())
        );
    }

    #[test]
    fn test_config_overrides_and_extends() {
        let dir = tempfile::tempdir().unwrap();
        let persona_path = dir.path().join("cfo.md");
        std::fs::write(&persona_path, "You count every penny.").unwrap();

        let config: Config = toml::from_str(&format!(
            r#"
            [[participants]]
            id = "cfo"
            display_name = "Finance"
            persona_file = "{}"
            team = "executive"
            reports_to = "ceo"

            [[participants]]
            id = "ops"
            display_name = "Ops"
            persona = "You keep the lights on."

            [[meeting_types]]
            id = "board"
            name = "Board Review"
            participants = ["ceo", "cfo", "ops"]
            context = ["company", "directives"]
            facilitator = "ceo"
            synthesis = true
            "#,
            persona_path.display()
        ))
        .unwrap();

        let registry = Registry::from_config(&config).unwrap();
        let cfo = registry.participant("cfo").unwrap();
        assert_eq!(cfo.display_name, "Finance");
        assert_eq!(cfo.persona, "You count every penny.");
        assert_eq!(registry.participant("ops").unwrap().team, Team::Operations);
        assert_eq!(registry.participants().len(), 13);

        let board = registry.meeting_type("board").unwrap();
        assert_eq!(board.context, vec![ContextKind::Company, ContextKind::Directives]);
        assert_eq!(board.kind, MeetingKind::Discussion);
    }

    #[test]
    fn test_config_with_unknown_context_key_fails() {
        let config: Config = toml::from_str(
            r#"
            [[meeting_types]]
            id = "board"
            name = "Board Review"
            participants = ["ceo"]
            context = ["roadmap"]
            "#,
        )
        .unwrap();

        let err = Registry::from_config(&config).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigurationError>(),
            Some(&ConfigurationError::InvalidContextKey("roadmap".to_string()))
        );
    }
}
