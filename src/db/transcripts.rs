//! Transcript persistence.
//!
//! A transcript and its exchanges are written together in one transaction
//! and never updated afterwards.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use super::{parse_timestamp, timestamp};
use crate::meeting::transcript::{Exchange, ParticipantRef, Transcript, TranscriptStatus};

/// One row of a transcript listing.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptSummary {
    pub meeting_id: String,
    pub meeting_type: String,
    pub meeting_name: String,
    pub topic: String,
    pub status: TranscriptStatus,
    pub exchange_count: usize,
    pub has_synthesis: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub struct TranscriptRepository;

impl TranscriptRepository {
    pub fn insert(conn: &Connection, transcript: &Transcript) -> Result<()> {
        let participants = serde_json::to_string(&transcript.participants)?;
        let facilitator = transcript
            .facilitator
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        conn.execute(
            "INSERT INTO transcripts (meeting_id, meeting_type, meeting_name, topic, participants, \
             facilitator, status, error, created_at, completed_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                transcript.meeting_id,
                transcript.meeting_type,
                transcript.meeting_name,
                transcript.topic,
                participants,
                facilitator,
                transcript.status.as_str(),
                transcript.error,
                timestamp(&transcript.created_at),
                timestamp(&chrono::Utc::now()),
            ],
        )
        .with_context(|| format!("Failed to insert transcript {}", transcript.meeting_id))?;

        let mut stmt = conn
            .prepare(
                "INSERT INTO exchanges (meeting_id, turn_index, is_synthesis, participant_id, \
                 participant_name, text, timestamp) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .context("Failed to prepare exchange insert")?;

        let turns = transcript
            .exchanges
            .iter()
            .map(|e| (e, false))
            .chain(transcript.synthesis.iter().map(|e| (e, true)));

        for (exchange, is_synthesis) in turns {
            stmt.execute(params![
                transcript.meeting_id,
                exchange.turn_index as i64,
                is_synthesis,
                exchange.participant_id,
                exchange.participant_name,
                exchange.text,
                timestamp(&exchange.timestamp),
            ])
            .with_context(|| {
                format!(
                    "Failed to insert exchange {} of {}",
                    exchange.turn_index, transcript.meeting_id
                )
            })?;
        }

        Ok(())
    }

    pub fn get(conn: &Connection, meeting_id: &str) -> Result<Option<Transcript>> {
        let header = conn
            .query_row(
                "SELECT meeting_id, meeting_type, meeting_name, topic, participants, facilitator, \
                 status, error, created_at FROM transcripts WHERE meeting_id = ?1",
                params![meeting_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, String>(6)?,
                        row.get::<_, Option<String>>(7)?,
                        row.get::<_, String>(8)?,
                    ))
                },
            )
            .optional()
            .context("Failed to query transcript")?;

        let Some((id, meeting_type, meeting_name, topic, participants, facilitator, status, error, created_at)) =
            header
        else {
            return Ok(None);
        };

        let participants: Vec<ParticipantRef> =
            serde_json::from_str(&participants).context("Corrupt participants column")?;
        let facilitator: Option<ParticipantRef> = facilitator
            .map(|f| serde_json::from_str(&f))
            .transpose()
            .context("Corrupt facilitator column")?;
        let status = TranscriptStatus::parse(&status)
            .with_context(|| format!("Unknown transcript status '{}'", status))?;

        let mut stmt = conn
            .prepare(
                "SELECT turn_index, is_synthesis, participant_id, participant_name, text, timestamp \
                 FROM exchanges WHERE meeting_id = ?1 ORDER BY is_synthesis, turn_index",
            )
            .context("Failed to prepare exchange query")?;

        let rows = stmt
            .query_map(params![meeting_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, bool>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })
            .context("Failed to query exchanges")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to map exchanges")?;

        let mut exchanges = Vec::with_capacity(rows.len());
        let mut synthesis = None;
        for (turn_index, is_synthesis, participant_id, participant_name, text, ts) in rows {
            let exchange = Exchange {
                participant_id,
                participant_name,
                turn_index: turn_index as usize,
                text,
                timestamp: parse_timestamp(&ts).context("Corrupt exchange timestamp")?,
            };
            if is_synthesis {
                synthesis = Some(exchange);
            } else {
                exchanges.push(exchange);
            }
        }

        Ok(Some(Transcript {
            meeting_id: id,
            meeting_type,
            meeting_name,
            topic,
            participants,
            facilitator,
            exchanges,
            synthesis,
            status,
            error,
            created_at: parse_timestamp(&created_at).context("Corrupt created_at")?,
        }))
    }

    /// Most recent first, optionally restricted to one meeting type. A zero
    /// `limit` lists everything.
    pub fn list(
        conn: &Connection,
        limit: usize,
        meeting_type: Option<&str>,
    ) -> Result<Vec<TranscriptSummary>> {
        let mut stmt = conn
            .prepare(
                "SELECT t.meeting_id, t.meeting_type, t.meeting_name, t.topic, t.status, t.created_at, \
                 (SELECT COUNT(*) FROM exchanges e WHERE e.meeting_id = t.meeting_id AND e.is_synthesis = 0), \
                 (SELECT COUNT(*) FROM exchanges e WHERE e.meeting_id = t.meeting_id AND e.is_synthesis = 1) \
                 FROM transcripts t WHERE (?1 IS NULL OR t.meeting_type = ?1) \
                 ORDER BY t.created_at DESC, t.rowid DESC LIMIT ?2",
            )
            .context("Failed to prepare transcript listing")?;

        let limit = if limit == 0 { -1 } else { limit as i64 };
        let rows = stmt
            .query_map(params![meeting_type, limit], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, i64>(6)?,
                    row.get::<_, i64>(7)?,
                ))
            })
            .context("Failed to list transcripts")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to map transcripts")?;

        rows.into_iter()
            .map(
                |(meeting_id, meeting_type, meeting_name, topic, status, created_at, count, synth)|
                 -> Result<TranscriptSummary> {
                    Ok(TranscriptSummary {
                        status: TranscriptStatus::parse(&status).with_context(|| {
                            format!("Unknown transcript status '{}'", status)
                        })?,
                        created_at: parse_timestamp(&created_at)
                            .context("Corrupt created_at")?,
                        meeting_id,
                        meeting_type,
                        meeting_name,
                        topic,
                        exchange_count: count as usize,
                        has_synthesis: synth > 0,
                    })
                },
            )
            .collect()
    }

    pub fn count(conn: &Connection) -> Result<i64> {
        conn.query_row("SELECT COUNT(*) FROM transcripts", [], |row| row.get(0))
            .context("Failed to count transcripts")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::open_in_memory;
    use chrono::Utc;

    fn exchange(id: &str, turn_index: usize) -> Exchange {
        Exchange {
            participant_id: id.to_string(),
            participant_name: id.to_uppercase(),
            turn_index,
            text: format!("{} says hi", id),
            timestamp: Utc::now(),
        }
    }

    fn transcript(meeting_type: &str) -> Transcript {
        let mut t = Transcript::begin(
            meeting_type,
            "Strategy Session",
            "roadmap",
            vec![ParticipantRef {
                id: "cito".to_string(),
                name: "CITO".to_string(),
            }],
            Some(ParticipantRef {
                id: "cito".to_string(),
                name: "CITO".to_string(),
            }),
        );
        t.exchanges.push(exchange("cito", 0));
        t.exchanges.push(exchange("pm", 1));
        t.synthesis = Some(exchange("cito", 2));
        t
    }

    #[test]
    fn test_insert_and_get_round_trip() {
        let conn = open_in_memory().unwrap();
        let original = transcript("strategy");
        TranscriptRepository::insert(&conn, &original).unwrap();

        let loaded = TranscriptRepository::get(&conn, &original.meeting_id)
            .unwrap()
            .unwrap();
        assert_eq!(loaded.exchanges.len(), 2);
        assert_eq!(loaded.exchanges[1].participant_id, "pm");
        assert_eq!(loaded.synthesis.as_ref().unwrap().turn_index, 2);
        assert_eq!(loaded.facilitator, original.facilitator);
        assert_eq!(loaded.status, TranscriptStatus::Complete);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let conn = open_in_memory().unwrap();
        assert!(TranscriptRepository::get(&conn, "nope").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_meeting_id_rejected() {
        let conn = open_in_memory().unwrap();
        let t = transcript("strategy");
        TranscriptRepository::insert(&conn, &t).unwrap();
        assert!(TranscriptRepository::insert(&conn, &t).is_err());
    }

    #[test]
    fn test_list_filters_and_counts() {
        let conn = open_in_memory().unwrap();
        TranscriptRepository::insert(&conn, &transcript("strategy")).unwrap();
        TranscriptRepository::insert(&conn, &transcript("retro")).unwrap();
        TranscriptRepository::insert(&conn, &transcript("strategy")).unwrap();

        let all = TranscriptRepository::list(&conn, 10, None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].exchange_count, 2);
        assert!(all[0].has_synthesis);

        let strategy = TranscriptRepository::list(&conn, 10, Some("strategy")).unwrap();
        assert_eq!(strategy.len(), 2);

        assert_eq!(TranscriptRepository::list(&conn, 1, None).unwrap().len(), 1);
        assert_eq!(TranscriptRepository::list(&conn, 0, None).unwrap().len(), 3);
        assert_eq!(TranscriptRepository::count(&conn).unwrap(), 3);
    }
}
