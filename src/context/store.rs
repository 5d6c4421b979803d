use super::{ContextDocument, ContextKind};
use crate::config::ContextConfig;
use crate::error::ConfigurationError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::{debug, warn};

/// Keyed read access to context documents.
///
/// A document that does not exist, or exists but is blank, is reported as
/// [`ConfigurationError::MissingContextDocument`]. Any other read failure is
/// [`ConfigurationError::UnreadableContextDocument`].
pub trait ContextStore: Send + Sync {
    fn load(&self, kind: ContextKind) -> Result<ContextDocument, ConfigurationError>;
}

/// Reads `<directory>/<file>` on every call.
pub struct FsContextStore {
    directory: PathBuf,
    files: HashMap<ContextKind, String>,
}

impl FsContextStore {
    pub fn new(directory: PathBuf) -> Self {
        Self::with_files(directory, &ContextConfig::default())
    }

    pub fn with_files(directory: PathBuf, config: &ContextConfig) -> Self {
        let files = HashMap::from([
            (ContextKind::Company, config.company_file.clone()),
            (ContextKind::ActiveProjects, config.active_projects_file.clone()),
            (ContextKind::PendingIdeas, config.pending_ideas_file.clone()),
            (ContextKind::Directives, config.directives_file.clone()),
        ]);
        Self { directory, files }
    }

    pub fn from_config(config: &ContextConfig) -> anyhow::Result<Self> {
        Ok(Self::with_files(config.directory()?, config))
    }

    pub fn path_for(&self, kind: ContextKind) -> PathBuf {
        let file = self
            .files
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| format!("{}.md", kind.key()));
        self.directory.join(file)
    }
}

impl ContextStore for FsContextStore {
    fn load(&self, kind: ContextKind) -> Result<ContextDocument, ConfigurationError> {
        let path = self.path_for(kind);
        let missing = || ConfigurationError::MissingContextDocument {
            key: kind.key().to_string(),
        };

        let body = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                debug!("Context document {:?} not found", path);
                missing()
            }
            _ => {
                warn!("Context document {:?} unreadable: {}", path, e);
                ConfigurationError::UnreadableContextDocument {
                    key: kind.key().to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        if body.trim().is_empty() {
            return Err(missing());
        }

        let modified_at = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        Ok(ContextDocument {
            kind,
            body,
            modified_at,
        })
    }
}

/// In-process store, mutable so callers can simulate external edits.
#[derive(Default)]
pub struct MemoryContextStore {
    documents: RwLock<HashMap<ContextKind, String>>,
}

impl MemoryContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, kind: ContextKind, body: impl Into<String>) -> Self {
        self.set(kind, body);
        self
    }

    pub fn set(&self, kind: ContextKind, body: impl Into<String>) {
        if let Ok(mut docs) = self.documents.write() {
            docs.insert(kind, body.into());
        }
    }

    pub fn remove(&self, kind: ContextKind) {
        if let Ok(mut docs) = self.documents.write() {
            docs.remove(&kind);
        }
    }
}

impl ContextStore for MemoryContextStore {
    fn load(&self, kind: ContextKind) -> Result<ContextDocument, ConfigurationError> {
        let body = self
            .documents
            .read()
            .ok()
            .and_then(|docs| docs.get(&kind).cloned())
            .filter(|body| !body.trim().is_empty())
            .ok_or_else(|| ConfigurationError::MissingContextDocument {
                key: kind.key().to_string(),
            })?;

        Ok(ContextDocument {
            kind,
            body,
            modified_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_store_reads_fresh_each_time() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsContextStore::new(dir.path().to_path_buf());
        let path = dir.path().join("company.md");

        std::fs::write(&path, "Version one").unwrap();
        assert_eq!(store.load(ContextKind::Company).unwrap().body, "Version one");

        std::fs::write(&path, "Version two").unwrap();
        let doc = store.load(ContextKind::Company).unwrap();
        assert_eq!(doc.body, "Version two");
        assert!(doc.modified_at.is_some());
    }

    #[test]
    fn test_fs_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsContextStore::new(dir.path().to_path_buf());

        assert_eq!(
            store.load(ContextKind::Directives),
            Err(ConfigurationError::MissingContextDocument {
                key: "directives".to_string()
            })
        );
    }

    #[test]
    fn test_fs_store_invalid_utf8_is_unreadable_not_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("company.md"), [0xff, 0xfe, b'a']).unwrap();
        let store = FsContextStore::new(dir.path().to_path_buf());

        match store.load(ContextKind::Company) {
            Err(ConfigurationError::UnreadableContextDocument { key, reason }) => {
                assert_eq!(key, "company");
                assert!(!reason.is_empty());
            }
            other => panic!("expected unreadable document, got {:?}", other),
        }
    }

    #[test]
    fn test_fs_store_directory_in_place_of_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("directives.md")).unwrap();
        let store = FsContextStore::new(dir.path().to_path_buf());

        assert!(matches!(
            store.load(ContextKind::Directives),
            Err(ConfigurationError::UnreadableContextDocument { .. })
        ));
    }

    #[test]
    fn test_fs_store_blank_file_counts_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pending_ideas.md"), "  \n\n").unwrap();
        let store = FsContextStore::new(dir.path().to_path_buf());

        assert!(store.load(ContextKind::PendingIdeas).is_err());
    }

    #[test]
    fn test_fs_store_custom_file_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("about-us.md"), "We build apps").unwrap();
        let config = ContextConfig {
            company_file: "about-us.md".to_string(),
            ..Default::default()
        };
        let store = FsContextStore::with_files(dir.path().to_path_buf(), &config);

        assert_eq!(store.load(ContextKind::Company).unwrap().body, "We build apps");
    }

    #[test]
    fn test_memory_store_set_and_remove() {
        let store = MemoryContextStore::new().with(ContextKind::Company, "Acme");
        assert_eq!(store.load(ContextKind::Company).unwrap().body, "Acme");

        store.remove(ContextKind::Company);
        assert!(store.load(ContextKind::Company).is_err());
    }
}
