//! Decision Log.
//!
//! Append-only, durably numbered records. Ids come from storage (the largest
//! stored id plus one, computed inside the write transaction), never from an
//! in-memory counter, so they keep increasing across restarts and across the
//! two front ends.

use crate::db::{DecisionRepository, Store};
use crate::error::DecisionError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Pending,
    InProgress,
    Completed,
}

impl DecisionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DecisionError> {
        match value {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(DecisionError::InvalidStatus(other.to_string())),
        }
    }

    /// The only status this one may move to.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::InProgress),
            Self::InProgress => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    /// Strictly forward, one step at a time.
    pub fn can_transition_to(&self, to: Self) -> bool {
        self.next() == Some(to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub id: i64,
    pub date: NaiveDate,
    pub topic: String,
    pub text: String,
    pub rationale: String,
    pub owner: String,
    pub status: DecisionStatus,
    pub meeting_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDecision {
    pub topic: String,
    pub text: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub meeting_id: Option<String>,
}

/// Filters are AND-combined; text filters are case-insensitive substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionQuery {
    pub topic: Option<String>,
    pub status: Option<DecisionStatus>,
    pub owner: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Clone)]
pub struct DecisionLog {
    store: Store,
}

impl DecisionLog {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn append(&self, decision: NewDecision) -> Result<Decision, DecisionError> {
        let record = self
            .store
            .write(|tx| DecisionRepository::insert(tx, &decision, Utc::now()))?;
        info!("Recorded decision {}: {}", record.id, record.text);
        Ok(record)
    }

    pub fn get(&self, id: i64) -> Result<Decision, DecisionError> {
        self.store
            .read(|conn| DecisionRepository::get(conn, id))?
            .ok_or(DecisionError::NotFound(id))
    }

    /// Move a decision one step forward. A rejected update leaves it unchanged.
    pub fn update_status(&self, id: i64, status: DecisionStatus) -> Result<Decision, DecisionError> {
        let outcome = self.store.write(|tx| {
            let Some(current) = DecisionRepository::get(tx, id)? else {
                return Ok(Err(DecisionError::NotFound(id)));
            };
            if !current.status.can_transition_to(status) {
                return Ok(Err(DecisionError::InvalidTransition {
                    id,
                    from: current.status.as_str().to_string(),
                    to: status.as_str().to_string(),
                }));
            }
            DecisionRepository::set_status(tx, id, status, Utc::now())?;
            Ok(DecisionRepository::get(tx, id)?.ok_or(DecisionError::NotFound(id)))
        })?;

        let decision = outcome?;
        info!("Decision {} is now {}", id, status.as_str());
        Ok(decision)
    }

    /// Matches ordered by id, newest first.
    pub fn query(&self, query: &DecisionQuery) -> Result<Vec<Decision>, DecisionError> {
        Ok(self
            .store
            .read(|conn| DecisionRepository::query(conn, query))?)
    }
}
