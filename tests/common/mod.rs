//! Shared setup for integration tests: an orchestrator over a temporary
//! database, in-memory context documents and a scripted generator.

#![allow(dead_code)]

use huddle::app::{Orchestrator, Settings};
use huddle::context::{ContextKind, MemoryContextStore};
use huddle::db::Store;
use huddle::generation::ScriptedGenerator;
use huddle::registry::Registry;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub struct Harness {
    pub dir: tempfile::TempDir,
    pub generator: Arc<ScriptedGenerator>,
    pub orchestrator: Orchestrator,
}

pub fn full_context() -> MemoryContextStore {
    MemoryContextStore::new()
        .with(ContextKind::Company, "Acme builds rockets.")
        .with(ContextKind::ActiveProjects, "Project Falcon is in beta.")
        .with(ContextKind::PendingIdeas, "Reusable boosters.")
        .with(ContextKind::Directives, "Ship weekly.")
}

pub fn orchestrator_at(
    db_path: &Path,
    generator: Arc<ScriptedGenerator>,
    settings: Settings,
) -> Orchestrator {
    let store = Store::open(db_path, Duration::from_millis(5000)).unwrap();
    Orchestrator::new(
        Arc::new(Registry::builtin()),
        Arc::new(full_context()),
        generator,
        store,
        settings,
    )
    .unwrap()
}

pub fn harness_with(settings: Settings) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let generator = Arc::new(ScriptedGenerator::new());
    let orchestrator = orchestrator_at(&dir.path().join("huddle.db"), generator.clone(), settings);
    Harness {
        dir,
        generator,
        orchestrator,
    }
}

impl Harness {
    pub fn db_path(&self) -> std::path::PathBuf {
        self.dir.path().join("huddle.db")
    }

    /// Drop the exchanges table behind the orchestrator's back so the next
    /// transcript write fails.
    pub fn break_transcript_storage(&self) {
        let conn = rusqlite::Connection::open(self.db_path()).unwrap();
        conn.execute_batch("DROP TABLE exchanges;").unwrap();
    }
}

pub fn harness() -> Harness {
    harness_with(Settings::default())
}
