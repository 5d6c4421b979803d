use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Open the database at `path`, creating and migrating it if needed.
pub fn open(path: &Path, busy_timeout: Duration) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }

    let conn = connect(path, busy_timeout)?;
    migrate(&conn)?;

    Ok(conn)
}

/// Open an existing database with the durability pragmas applied.
pub fn connect(path: &Path, busy_timeout: Duration) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;

    conn.busy_timeout(busy_timeout)
        .context("Failed to set busy timeout")?;
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
        .context("Failed to enable WAL journal")?;
    conn.pragma_update(None, "synchronous", "FULL")
        .context("Failed to set synchronous mode")?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .context("Failed to enable foreign keys")?;

    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .context("Failed to enable foreign keys")?;
    migrate(&conn)?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS transcripts (
            meeting_id TEXT PRIMARY KEY,
            meeting_type TEXT NOT NULL,
            meeting_name TEXT NOT NULL,
            topic TEXT NOT NULL,
            participants TEXT NOT NULL,
            facilitator TEXT,
            status TEXT NOT NULL,
            error TEXT,
            created_at TEXT NOT NULL,
            completed_at TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create transcripts table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transcripts_created_at ON transcripts(created_at DESC)",
        [],
    )
    .context("Failed to create transcripts created_at index")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS exchanges (
            meeting_id TEXT NOT NULL REFERENCES transcripts(meeting_id),
            turn_index INTEGER NOT NULL,
            is_synthesis INTEGER NOT NULL DEFAULT 0,
            participant_id TEXT NOT NULL,
            participant_name TEXT NOT NULL,
            text TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            PRIMARY KEY (meeting_id, turn_index, is_synthesis)
        )",
        [],
    )
    .context("Failed to create exchanges table")?;

    // Ids are allocated explicitly as MAX(id) + 1 inside the write transaction.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS decisions (
            id INTEGER PRIMARY KEY,
            date TEXT NOT NULL,
            topic TEXT NOT NULL,
            text TEXT NOT NULL,
            rationale TEXT NOT NULL DEFAULT '',
            owner TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL DEFAULT 'pending',
            meeting_id TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create decisions table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_decisions_status ON decisions(status)",
        [],
    )
    .context("Failed to create decisions status index")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS feature_requests (
            id INTEGER PRIMARY KEY,
            submitter_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            priority TEXT NOT NULL DEFAULT 'medium',
            status TEXT NOT NULL DEFAULT 'submitted',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create feature_requests table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS feature_request_votes (
            request_id INTEGER NOT NULL REFERENCES feature_requests(id),
            participant_id TEXT NOT NULL,
            stance TEXT NOT NULL,
            voted_at TEXT NOT NULL,
            PRIMARY KEY (request_id, participant_id)
        )",
        [],
    )
    .context("Failed to create feature_request_votes table")?;

    Ok(())
}
