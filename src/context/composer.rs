use super::{ContextDocument, ContextStore};
use crate::error::ConfigurationError;
use crate::registry::MeetingType;
use std::sync::Arc;
use tracing::debug;

/// Placed between consecutive blocks of the assembled context.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Heading for caller-supplied material appended after the documents.
pub const EXTRA_MATERIAL_HEADING: &str = "## Additional Material";

/// One piece of assembled context, in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextBlock {
    Document(ContextDocument),
    Extra { heading: String, body: String },
}

impl ContextBlock {
    fn render(&self) -> String {
        match self {
            Self::Document(doc) => doc.body.trim_end().to_string(),
            Self::Extra { heading, body } => format!("{}\n\n{}", heading, body.trim()),
        }
    }
}

/// Resolves a meeting type into one context blob.
#[derive(Clone)]
pub struct ContextComposer {
    store: Arc<dyn ContextStore>,
}

impl ContextComposer {
    pub fn new(store: Arc<dyn ContextStore>) -> Self {
        Self { store }
    }

    /// Load every document the meeting type declares, in declared order.
    pub fn blocks(
        &self,
        meeting_type: &MeetingType,
        extra: Option<&str>,
    ) -> Result<Vec<ContextBlock>, ConfigurationError> {
        let mut blocks = Vec::with_capacity(meeting_type.context.len() + 1);

        for kind in &meeting_type.context {
            let doc = self.store.load(*kind)?;
            debug!(
                "Loaded context '{}' ({} bytes) for meeting type '{}'",
                kind.key(),
                doc.body.len(),
                meeting_type.id
            );
            blocks.push(ContextBlock::Document(doc));
        }

        if let Some(extra) = extra.filter(|e| !e.trim().is_empty()) {
            blocks.push(ContextBlock::Extra {
                heading: EXTRA_MATERIAL_HEADING.to_string(),
                body: extra.to_string(),
            });
        }

        Ok(blocks)
    }

    pub fn compose(
        &self,
        meeting_type: &MeetingType,
        extra: Option<&str>,
    ) -> Result<String, ConfigurationError> {
        let blocks = self.blocks(meeting_type, extra)?;
        Ok(blocks
            .iter()
            .map(ContextBlock::render)
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextKind, MemoryContextStore};
    use crate::registry::MeetingKind;

    fn meeting_type(context: Vec<ContextKind>) -> MeetingType {
        MeetingType {
            id: "strategy".to_string(),
            name: "Strategy Session".to_string(),
            kind: MeetingKind::Discussion,
            participants: vec!["cito".to_string(), "pm".to_string()],
            context,
            facilitator: Some("cito".to_string()),
            synthesis: true,
        }
    }

    fn store() -> Arc<MemoryContextStore> {
        Arc::new(
            MemoryContextStore::new()
                .with(ContextKind::Company, "# Acme\nWe ship mobile apps.")
                .with(ContextKind::ActiveProjects, "# Projects\n- Atlas\n"),
        )
    }

    #[test]
    fn test_documents_joined_in_declared_order() {
        let composer = ContextComposer::new(store());
        let text = composer
            .compose(
                &meeting_type(vec![ContextKind::ActiveProjects, ContextKind::Company]),
                None,
            )
            .unwrap();

        assert_eq!(
            text,
            "# Projects\n- Atlas\n\n---\n\n# Acme\nWe ship mobile apps."
        );
    }

    #[test]
    fn test_extra_material_gets_its_own_heading() {
        let composer = ContextComposer::new(store());
        let text = composer
            .compose(&meeting_type(vec![ContextKind::Company]), Some("Budget is 10k"))
            .unwrap();

        assert!(text.ends_with("---\n\n## Additional Material\n\nBudget is 10k"));
    }

    #[test]
    fn test_blank_extra_is_ignored() {
        let composer = ContextComposer::new(store());
        let mt = meeting_type(vec![ContextKind::Company]);

        assert_eq!(
            composer.compose(&mt, Some("   ")).unwrap(),
            composer.compose(&mt, None).unwrap()
        );
    }

    #[test]
    fn test_missing_document_is_fatal() {
        let composer = ContextComposer::new(store());
        let err = composer
            .compose(
                &meeting_type(vec![ContextKind::Company, ContextKind::PendingIdeas]),
                None,
            )
            .unwrap_err();

        assert_eq!(
            err,
            ConfigurationError::MissingContextDocument {
                key: "pending_ideas".to_string()
            }
        );
    }

    #[test]
    fn test_compose_is_idempotent_and_reads_fresh() {
        let store = store();
        let composer = ContextComposer::new(store.clone());
        let mt = meeting_type(vec![ContextKind::Company]);

        let first = composer.compose(&mt, Some("extra")).unwrap();
        let second = composer.compose(&mt, Some("extra")).unwrap();
        assert_eq!(first, second);

        store.set(ContextKind::Company, "# Acme\nWe now ship web apps too.");
        let third = composer.compose(&mt, Some("extra")).unwrap();
        assert_ne!(first, third);
        assert!(third.contains("web apps"));
    }
}
