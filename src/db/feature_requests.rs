//! Feature request persistence.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{parse_timestamp, timestamp};
use crate::feature_requests::{
    FeatureRequest, FeatureRequestFilter, FeatureRequestStatus, NewFeatureRequest, Priority,
    VoteStance,
};

pub struct FeatureRequestRepository;

type Row = (i64, String, String, String, String, String, String, String);

impl FeatureRequestRepository {
    pub fn next_id(conn: &Connection) -> Result<i64> {
        conn.query_row(
            "SELECT COALESCE(MAX(id), 0) + 1 FROM feature_requests",
            [],
            |row| row.get(0),
        )
        .context("Failed to allocate feature request id")
    }

    pub fn insert(
        conn: &Connection,
        request: &NewFeatureRequest,
        now: DateTime<Utc>,
    ) -> Result<FeatureRequest> {
        let id = Self::next_id(conn)?;

        conn.execute(
            "INSERT INTO feature_requests (id, submitter_id, title, description, priority, status, \
             created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                id,
                request.submitter_id,
                request.title,
                request.description,
                request.priority.as_str(),
                FeatureRequestStatus::Submitted.as_str(),
                timestamp(&now),
            ],
        )
        .context("Failed to insert feature request")?;

        Ok(FeatureRequest {
            id,
            submitter_id: request.submitter_id.clone(),
            title: request.title.clone(),
            description: request.description.clone(),
            priority: request.priority,
            status: FeatureRequestStatus::Submitted,
            supporters: Vec::new(),
            opposers: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get(conn: &Connection, id: i64) -> Result<Option<FeatureRequest>> {
        let row = conn
            .query_row(
                "SELECT id, submitter_id, title, description, priority, status, created_at, \
                 updated_at FROM feature_requests WHERE id = ?1",
                params![id],
                map_row,
            )
            .optional()
            .context("Failed to query feature request")?;

        row.map(|row| hydrate(conn, row)).transpose()
    }

    /// Newest first.
    pub fn list(conn: &Connection, filter: &FeatureRequestFilter) -> Result<Vec<FeatureRequest>> {
        let mut stmt = conn
            .prepare(
                "SELECT id, submitter_id, title, description, priority, status, created_at, \
                 updated_at FROM feature_requests \
                 WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR submitter_id = ?2) \
                 ORDER BY id DESC LIMIT ?3",
            )
            .context("Failed to prepare feature request listing")?;

        let limit = filter.limit.filter(|l| *l > 0).map(|l| l as i64).unwrap_or(-1);
        let rows = stmt
            .query_map(
                params![
                    filter.status.map(|s| s.as_str()),
                    filter.submitter_id,
                    limit
                ],
                map_row,
            )
            .context("Failed to list feature requests")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to map feature requests")?;

        rows.into_iter().map(|row| hydrate(conn, row)).collect()
    }

    pub fn set_status(
        conn: &Connection,
        id: i64,
        status: FeatureRequestStatus,
        now: DateTime<Utc>,
    ) -> Result<()> {
        conn.execute(
            "UPDATE feature_requests SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), timestamp(&now), id],
        )
        .context("Failed to update feature request status")?;
        Ok(())
    }

    /// One vote per participant per request; a new stance replaces the old one.
    pub fn vote(
        conn: &Connection,
        id: i64,
        participant_id: &str,
        stance: VoteStance,
        now: DateTime<Utc>,
    ) -> Result<()> {
        conn.execute(
            "INSERT INTO feature_request_votes (request_id, participant_id, stance, voted_at) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(request_id, participant_id) DO UPDATE SET stance = excluded.stance, \
             voted_at = excluded.voted_at WHERE stance != excluded.stance",
            params![id, participant_id, stance.as_str(), timestamp(&now)],
        )
        .context("Failed to record vote")?;
        Ok(())
    }

    fn voters(conn: &Connection, id: i64, stance: VoteStance) -> Result<Vec<String>> {
        let mut stmt = conn
            .prepare(
                "SELECT participant_id FROM feature_request_votes \
                 WHERE request_id = ?1 AND stance = ?2 ORDER BY participant_id",
            )
            .context("Failed to prepare vote query")?;

        let voters = stmt
            .query_map(params![id, stance.as_str()], |row| row.get(0))
            .context("Failed to query votes")?
            .collect::<std::result::Result<Vec<String>, _>>()
            .context("Failed to map votes")?;
        Ok(voters)
    }
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Row> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn hydrate(conn: &Connection, row: Row) -> Result<FeatureRequest> {
    let (id, submitter_id, title, description, priority, status, created_at, updated_at) = row;

    Ok(FeatureRequest {
        id,
        submitter_id,
        title,
        description,
        priority: Priority::parse(&priority)?,
        status: FeatureRequestStatus::parse(&status)?,
        supporters: FeatureRequestRepository::voters(conn, id, VoteStance::Support)?,
        opposers: FeatureRequestRepository::voters(conn, id, VoteStance::Oppose)?,
        created_at: parse_timestamp(&created_at).context("Corrupt created_at")?,
        updated_at: parse_timestamp(&updated_at).context("Corrupt updated_at")?,
    })
}
