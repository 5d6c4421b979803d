//! Read access to stored transcripts.

use super::transcript::Transcript;
use crate::db::{Store, TranscriptRepository, TranscriptSummary};
use anyhow::Result;

pub const DEFAULT_LIST_LIMIT: usize = 20;

#[derive(Clone)]
pub struct TranscriptArchive {
    store: Store,
}

impl TranscriptArchive {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn get(&self, meeting_id: &str) -> Result<Option<Transcript>> {
        self.store
            .read(|conn| TranscriptRepository::get(conn, meeting_id))
    }

    /// Newest first.
    pub fn list(&self, limit: usize, meeting_type: Option<&str>) -> Result<Vec<TranscriptSummary>> {
        self.store
            .read(|conn| TranscriptRepository::list(conn, limit, meeting_type))
    }

    pub fn count(&self) -> Result<usize> {
        let count = self.store.read(TranscriptRepository::count)?;
        Ok(count.max(0) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::DEFAULT_BUSY_TIMEOUT;

    #[test]
    fn test_archive_reads_what_store_wrote() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("huddle.db"), DEFAULT_BUSY_TIMEOUT).unwrap();
        let transcript = Transcript::begin("exec", "Executive Meeting", "pricing", vec![], None);
        store
            .write(|tx| TranscriptRepository::insert(tx, &transcript))
            .unwrap();

        let archive = TranscriptArchive::new(store);
        let loaded = archive.get(&transcript.meeting_id).unwrap().unwrap();
        assert_eq!(loaded.topic, "pricing");
        assert!(archive.get("missing").unwrap().is_none());

        let listed = archive.list(DEFAULT_LIST_LIMIT, Some("exec")).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].exchange_count, 0);
        assert_eq!(archive.count().unwrap(), 1);
    }
}
