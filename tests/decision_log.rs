//! Decision and feature request records shared by separate store handles,
//! the way the CLI and the server share one database file.

use huddle::db::init::DEFAULT_BUSY_TIMEOUT;
use huddle::db::Store;
use huddle::decisions::{DecisionLog, DecisionQuery, DecisionStatus, NewDecision};
use huddle::error::DecisionError;
use huddle::feature_requests::{
    FeatureRequestFilter, FeatureRequestStatus, FeatureRequests, NewFeatureRequest, Priority,
    VoteStance,
};
use huddle::registry::Registry;
use std::path::Path;
use std::sync::Arc;

fn decision(topic: &str) -> NewDecision {
    NewDecision {
        topic: topic.to_string(),
        text: format!("Go ahead with {topic}"),
        rationale: "Agreed in review".to_string(),
        owner: "CITO".to_string(),
        meeting_id: None,
    }
}

fn log_at(path: &Path) -> DecisionLog {
    DecisionLog::new(Store::open(path, DEFAULT_BUSY_TIMEOUT).unwrap())
}

#[test]
fn test_interleaved_handles_share_one_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huddle.db");
    let cli = log_at(&path);
    let server = log_at(&path);

    let mut ids = Vec::new();
    for i in 0..4 {
        let log = if i % 2 == 0 { &cli } else { &server };
        ids.push(log.append(decision(&format!("topic {i}"))).unwrap().id);
    }
    assert_eq!(ids, vec![1, 2, 3, 4]);

    // Both handles see every record.
    assert_eq!(cli.query(&DecisionQuery::default()).unwrap().len(), 4);
    assert_eq!(server.get(3).unwrap().topic, "topic 2");
}

#[test]
fn test_ids_keep_increasing_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huddle.db");

    let before = {
        let log = log_at(&path);
        log.append(decision("first")).unwrap();
        log.append(decision("second")).unwrap().id
    };

    let after = log_at(&path).append(decision("third")).unwrap().id;
    assert!(after > before);
    assert_eq!(after, 3);
}

#[test]
fn test_concurrent_appends_from_separate_handles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huddle.db");

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let path = path.clone();
            std::thread::spawn(move || {
                let log = log_at(&path);
                (0..5)
                    .map(|i| log.append(decision(&format!("w{worker}-{i}"))).unwrap().id)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids: Vec<i64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=20).collect::<Vec<_>>());
}

#[test]
fn test_status_changes_are_visible_to_other_handles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huddle.db");
    let cli = log_at(&path);
    let server = log_at(&path);

    let id = cli.append(decision("rollout")).unwrap().id;
    server.update_status(id, DecisionStatus::InProgress).unwrap();

    let err = cli.update_status(id, DecisionStatus::InProgress).unwrap_err();
    assert!(matches!(err, DecisionError::InvalidTransition { .. }));
    assert_eq!(cli.get(id).unwrap().status, DecisionStatus::InProgress);
}

#[test]
fn test_feature_requests_across_handles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huddle.db");
    let registry = Arc::new(Registry::builtin());
    let open = || {
        FeatureRequests::new(
            Store::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap(),
            registry.clone(),
        )
    };
    let cli = open();
    let server = open();

    let request = cli
        .submit(NewFeatureRequest {
            submitter_id: "support".to_string(),
            title: "Bulk export".to_string(),
            description: "Customers want CSV".to_string(),
            priority: Priority::High,
        })
        .unwrap();
    assert_eq!(request.status, FeatureRequestStatus::Submitted);

    server.vote(request.id, "sales", VoteStance::Support).unwrap();
    server.vote(request.id, "legal", VoteStance::Oppose).unwrap();
    let voted = cli.vote(request.id, "legal", VoteStance::Support).unwrap();
    assert_eq!(voted.supporters, vec!["legal".to_string(), "sales".to_string()]);
    assert!(voted.opposers.is_empty());

    let pending = server
        .list(&FeatureRequestFilter {
            status: Some(FeatureRequestStatus::Submitted),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, request.id);
}
