//! Feature requests raised by participants, with status tracking and votes.

use crate::db::{FeatureRequestRepository, Store};
use crate::error::FeatureRequestError;
use crate::registry::Registry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureRequestStatus {
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    Deferred,
    InProgress,
    Implemented,
}

impl FeatureRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Deferred => "deferred",
            Self::InProgress => "in_progress",
            Self::Implemented => "implemented",
        }
    }

    pub fn parse(value: &str) -> Result<Self, FeatureRequestError> {
        match value {
            "submitted" => Ok(Self::Submitted),
            "under_review" => Ok(Self::UnderReview),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "deferred" => Ok(Self::Deferred),
            "in_progress" => Ok(Self::InProgress),
            "implemented" => Ok(Self::Implemented),
            other => Err(FeatureRequestError::InvalidValue {
                field: "status",
                value: other.to_string(),
            }),
        }
    }

    pub fn can_transition_to(&self, to: Self) -> bool {
        use FeatureRequestStatus::*;
        matches!(
            (self, to),
            (Submitted, UnderReview | Approved | Rejected | Deferred)
                | (UnderReview, Approved | Rejected | Deferred)
                | (Deferred, UnderReview)
                | (Approved, InProgress)
                | (InProgress, Implemented)
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Result<Self, FeatureRequestError> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(FeatureRequestError::InvalidValue {
                field: "priority",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteStance {
    Support,
    Oppose,
}

impl VoteStance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Support => "support",
            Self::Oppose => "oppose",
        }
    }

    pub fn parse(value: &str) -> Result<Self, FeatureRequestError> {
        match value {
            "support" => Ok(Self::Support),
            "oppose" => Ok(Self::Oppose),
            other => Err(FeatureRequestError::InvalidValue {
                field: "vote",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRequest {
    pub id: i64,
    pub submitter_id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: FeatureRequestStatus,
    pub supporters: Vec<String>,
    pub opposers: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFeatureRequest {
    pub submitter_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureRequestFilter {
    pub status: Option<FeatureRequestStatus>,
    pub submitter_id: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Clone)]
pub struct FeatureRequests {
    store: Store,
    registry: Arc<Registry>,
}

impl FeatureRequests {
    pub fn new(store: Store, registry: Arc<Registry>) -> Self {
        Self { store, registry }
    }

    pub fn submit(&self, request: NewFeatureRequest) -> Result<FeatureRequest, FeatureRequestError> {
        self.registry.participant(&request.submitter_id)?;
        if request.title.trim().is_empty() {
            return Err(FeatureRequestError::InvalidValue {
                field: "title",
                value: request.title,
            });
        }

        let record = self
            .store
            .write(|tx| FeatureRequestRepository::insert(tx, &request, Utc::now()))?;
        info!(
            "Feature request {} submitted by {}: {}",
            record.id, record.submitter_id, record.title
        );
        Ok(record)
    }

    pub fn get(&self, id: i64) -> Result<FeatureRequest, FeatureRequestError> {
        self.store
            .read(|conn| FeatureRequestRepository::get(conn, id))?
            .ok_or(FeatureRequestError::NotFound(id))
    }

    pub fn list(&self, filter: &FeatureRequestFilter) -> Result<Vec<FeatureRequest>, FeatureRequestError> {
        Ok(self
            .store
            .read(|conn| FeatureRequestRepository::list(conn, filter))?)
    }

    pub fn update_status(
        &self,
        id: i64,
        status: FeatureRequestStatus,
    ) -> Result<FeatureRequest, FeatureRequestError> {
        let outcome = self.store.write(|tx| {
            let Some(current) = FeatureRequestRepository::get(tx, id)? else {
                return Ok(Err(FeatureRequestError::NotFound(id)));
            };
            if !current.status.can_transition_to(status) {
                return Ok(Err(FeatureRequestError::InvalidTransition {
                    id,
                    from: current.status.as_str().to_string(),
                    to: status.as_str().to_string(),
                }));
            }
            FeatureRequestRepository::set_status(tx, id, status, Utc::now())?;
            Ok(FeatureRequestRepository::get(tx, id)?.ok_or(FeatureRequestError::NotFound(id)))
        })?;

        let request = outcome?;
        info!("Feature request {} is now {}", id, status.as_str());
        Ok(request)
    }

    /// Record a vote. Repeating a vote is a no-op; switching sides replaces
    /// the earlier vote.
    pub fn vote(
        &self,
        id: i64,
        participant_id: &str,
        stance: VoteStance,
    ) -> Result<FeatureRequest, FeatureRequestError> {
        self.registry.participant(participant_id)?;

        self.store.write(|tx| {
            if FeatureRequestRepository::get(tx, id)?.is_none() {
                return Ok(Err(FeatureRequestError::NotFound(id)));
            }
            FeatureRequestRepository::vote(tx, id, participant_id, stance, Utc::now())?;
            Ok(FeatureRequestRepository::get(tx, id)?.ok_or(FeatureRequestError::NotFound(id)))
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::DEFAULT_BUSY_TIMEOUT;

    fn service() -> (tempfile::TempDir, FeatureRequests) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("huddle.db"), DEFAULT_BUSY_TIMEOUT).unwrap();
        (dir, FeatureRequests::new(store, Arc::new(Registry::builtin())))
    }

    fn new_request(submitter: &str) -> NewFeatureRequest {
        NewFeatureRequest {
            submitter_id: submitter.to_string(),
            title: "Dark mode".to_string(),
            description: "Users keep asking".to_string(),
            priority: Priority::High,
        }
    }

    #[test]
    fn test_transition_table() {
        use FeatureRequestStatus::*;
        assert!(Submitted.can_transition_to(Approved));
        assert!(Submitted.can_transition_to(Deferred));
        assert!(Deferred.can_transition_to(UnderReview));
        assert!(Approved.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Implemented));
        assert!(!Submitted.can_transition_to(Implemented));
        assert!(!Rejected.can_transition_to(UnderReview));
        assert!(!Implemented.can_transition_to(Submitted));
    }

    #[test]
    fn test_submit_requires_known_participant() {
        let (_dir, service) = service();
        assert!(matches!(
            service.submit(new_request("intern")),
            Err(FeatureRequestError::Configuration(_))
        ));

        let created = service.submit(new_request("support")).unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.status, FeatureRequestStatus::Submitted);
        assert_eq!(created.priority, Priority::High);
    }

    #[test]
    fn test_blank_title_rejected() {
        let (_dir, service) = service();
        let mut request = new_request("pm");
        request.title = "  ".to_string();
        assert!(matches!(
            service.submit(request),
            Err(FeatureRequestError::InvalidValue { field: "title", .. })
        ));
    }

    #[test]
    fn test_status_update_follows_table() {
        let (_dir, service) = service();
        let created = service.submit(new_request("pm")).unwrap();

        assert!(matches!(
            service.update_status(created.id, FeatureRequestStatus::Implemented),
            Err(FeatureRequestError::InvalidTransition { .. })
        ));
        assert_eq!(
            service.get(created.id).unwrap().status,
            FeatureRequestStatus::Submitted
        );

        let approved = service
            .update_status(created.id, FeatureRequestStatus::Approved)
            .unwrap();
        assert_eq!(approved.status, FeatureRequestStatus::Approved);
    }

    #[test]
    fn test_votes_are_idempotent_and_exclusive() {
        let (_dir, service) = service();
        let created = service.submit(new_request("pm")).unwrap();

        service.vote(created.id, "cfo", VoteStance::Support).unwrap();
        let after_repeat = service.vote(created.id, "cfo", VoteStance::Support).unwrap();
        assert_eq!(after_repeat.supporters, vec!["cfo".to_string()]);

        service.vote(created.id, "ceo", VoteStance::Oppose).unwrap();
        let switched = service.vote(created.id, "cfo", VoteStance::Oppose).unwrap();
        assert!(switched.supporters.is_empty());
        assert_eq!(switched.opposers, vec!["ceo".to_string(), "cfo".to_string()]);
    }

    #[test]
    fn test_vote_on_missing_request() {
        let (_dir, service) = service();
        assert!(matches!(
            service.vote(9, "cfo", VoteStance::Support),
            Err(FeatureRequestError::NotFound(9))
        ));
    }

    #[test]
    fn test_list_filters() {
        let (_dir, service) = service();
        let first = service.submit(new_request("pm")).unwrap();
        service.submit(new_request("support")).unwrap();
        service
            .update_status(first.id, FeatureRequestStatus::UnderReview)
            .unwrap();

        let under_review = service
            .list(&FeatureRequestFilter {
                status: Some(FeatureRequestStatus::UnderReview),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(under_review.len(), 1);
        assert_eq!(under_review[0].id, first.id);

        let by_support = service
            .list(&FeatureRequestFilter {
                submitter_id: Some("support".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_support.len(), 1);
    }
}
