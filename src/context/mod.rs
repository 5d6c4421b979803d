//! Shared meeting context.
//!
//! Context documents are authored outside the orchestrator (company profile,
//! active initiatives, pending ideas, directives). They are read fresh on
//! every composition and never cached, since they change between runs.

pub mod composer;
pub mod store;

pub use composer::{ContextBlock, ContextComposer, CONTEXT_SEPARATOR, EXTRA_MATERIAL_HEADING};
pub use store::{ContextStore, FsContextStore, MemoryContextStore};

use crate::error::ConfigurationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The known kinds of context document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    Company,
    ActiveProjects,
    PendingIdeas,
    Directives,
}

impl ContextKind {
    pub const ALL: [ContextKind; 4] = [
        Self::Company,
        Self::ActiveProjects,
        Self::PendingIdeas,
        Self::Directives,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::ActiveProjects => "active_projects",
            Self::PendingIdeas => "pending_ideas",
            Self::Directives => "directives",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Company => "Company Profile",
            Self::ActiveProjects => "Active Projects",
            Self::PendingIdeas => "Pending Ideas",
            Self::Directives => "Directives",
        }
    }

    pub fn parse(key: &str) -> Result<Self, ConfigurationError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == key)
            .ok_or_else(|| ConfigurationError::InvalidContextKey(key.to_string()))
    }
}

/// One externally authored document as read at composition time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextDocument {
    pub kind: ContextKind,
    pub body: String,
    pub modified_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip() {
        for kind in ContextKind::ALL {
            assert_eq!(ContextKind::parse(kind.key()).unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_key_is_configuration_error() {
        assert_eq!(
            ContextKind::parse("roadmap"),
            Err(ConfigurationError::InvalidContextKey("roadmap".to_string()))
        );
    }
}
