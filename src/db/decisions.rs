//! Decision record persistence.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};

use super::{parse_timestamp, timestamp};
use crate::decisions::{Decision, DecisionQuery, DecisionStatus, NewDecision};

const COLUMNS: &str =
    "id, date, topic, text, rationale, owner, status, meeting_id, created_at, updated_at";

pub struct DecisionRepository;

impl DecisionRepository {
    /// Next id to allocate. Only meaningful inside a write transaction.
    pub fn next_id(conn: &Connection) -> Result<i64> {
        conn.query_row("SELECT COALESCE(MAX(id), 0) + 1 FROM decisions", [], |row| {
            row.get(0)
        })
        .context("Failed to allocate decision id")
    }

    pub fn insert(conn: &Connection, decision: &NewDecision, now: DateTime<Utc>) -> Result<Decision> {
        let id = Self::next_id(conn)?;
        let date = now.date_naive();

        conn.execute(
            "INSERT INTO decisions (id, date, topic, text, rationale, owner, status, meeting_id, \
             created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                id,
                date.to_string(),
                decision.topic,
                decision.text,
                decision.rationale,
                decision.owner,
                DecisionStatus::Pending.as_str(),
                decision.meeting_id,
                timestamp(&now),
            ],
        )
        .context("Failed to insert decision")?;

        Ok(Decision {
            id,
            date,
            topic: decision.topic.clone(),
            text: decision.text.clone(),
            rationale: decision.rationale.clone(),
            owner: decision.owner.clone(),
            status: DecisionStatus::Pending,
            meeting_id: decision.meeting_id.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get(conn: &Connection, id: i64) -> Result<Option<Decision>> {
        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM decisions WHERE id = ?1", COLUMNS))
            .context("Failed to prepare decision query")?;

        let mut rows = stmt
            .query_map(params![id], map_row)
            .context("Failed to query decision")?;

        match rows.next() {
            Some(Ok(record)) => Ok(Some(record)),
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    pub fn set_status(
        conn: &Connection,
        id: i64,
        status: DecisionStatus,
        now: DateTime<Utc>,
    ) -> Result<()> {
        conn.execute(
            "UPDATE decisions SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), timestamp(&now), id],
        )
        .context("Failed to update decision status")?;
        Ok(())
    }

    pub fn query(conn: &Connection, query: &DecisionQuery) -> Result<Vec<Decision>> {
        let mut sql = format!("SELECT {} FROM decisions WHERE 1=1", COLUMNS);
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(topic) = query.topic.as_deref().filter(|t| !t.is_empty()) {
            sql.push_str(" AND instr(LOWER(topic), ?) > 0");
            values.push(Box::new(topic.to_lowercase()));
        }

        if let Some(owner) = query.owner.as_deref().filter(|o| !o.is_empty()) {
            sql.push_str(" AND instr(LOWER(owner), ?) > 0");
            values.push(Box::new(owner.to_lowercase()));
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            values.push(Box::new(status.as_str()));
        }

        sql.push_str(" ORDER BY id DESC");

        // Zero means no limit.
        if let Some(limit) = query.limit.filter(|l| *l > 0) {
            sql.push_str(" LIMIT ?");
            values.push(Box::new(limit as i64));
        }

        let mut stmt = conn.prepare(&sql).context("Failed to prepare decision search")?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|p| p.as_ref()).collect();

        let decisions = stmt
            .query_map(param_refs.as_slice(), map_row)
            .context("Failed to execute decision search")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to map decisions")?;

        Ok(decisions)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Decision> {
    let date: String = row.get(1)?;
    let status: String = row.get(6)?;
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;

    Ok(Decision {
        id: row.get(0)?,
        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|e| conversion_error(1, e))?,
        topic: row.get(2)?,
        text: row.get(3)?,
        rationale: row.get(4)?,
        owner: row.get(5)?,
        status: DecisionStatus::parse(&status).map_err(|e| conversion_error(6, e))?,
        meeting_id: row.get(7)?,
        created_at: parse_timestamp(&created_at).map_err(|e| conversion_error(8, e))?,
        updated_at: parse_timestamp(&updated_at).map_err(|e| conversion_error(9, e))?,
    })
}

fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}
