use super::init::DEFAULT_BUSY_TIMEOUT;
use super::*;
use crate::decisions::NewDecision;
use crate::meeting::transcript::{Exchange, Transcript};
use chrono::Utc;
use std::sync::Arc;

fn setup_store() -> (tempfile::TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("huddle.db"), DEFAULT_BUSY_TIMEOUT).unwrap();
    (dir, store)
}

fn create_test_transcript(turns: usize) -> Transcript {
    let mut transcript = Transcript::begin("exec", "Executive Meeting", "pricing", vec![], None);
    for turn_index in 0..turns {
        transcript.exchanges.push(Exchange {
            participant_id: format!("p{}", turn_index),
            participant_name: format!("P{}", turn_index),
            turn_index,
            text: "x".repeat(2048),
            timestamp: Utc::now(),
        });
    }
    transcript
}

#[test]
fn test_timestamp_round_trip() {
    let now = Utc::now();
    let parsed = parse_timestamp(&timestamp(&now)).unwrap();
    assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
}

#[test]
fn test_concurrent_transcript_writes_stay_whole() {
    let (_dir, store) = setup_store();
    let store = Arc::new(store);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || {
                let transcript = create_test_transcript(5);
                store
                    .write(|tx| TranscriptRepository::insert(tx, &transcript))
                    .unwrap();
                transcript.meeting_id
            })
        })
        .collect();

    let ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    store
        .read(|conn| {
            assert_eq!(TranscriptRepository::count(conn)?, 8);
            for id in &ids {
                let loaded = TranscriptRepository::get(conn, id)?.unwrap();
                let indices: Vec<_> = loaded.exchanges.iter().map(|e| e.turn_index).collect();
                assert_eq!(indices, vec![0, 1, 2, 3, 4]);
                assert!(loaded.exchanges.iter().all(|e| e.text.len() == 2048));
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_concurrent_decision_ids_are_unique() {
    let (_dir, store) = setup_store();
    let store = Arc::new(store);

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let store = store.clone();
            std::thread::spawn(move || {
                (0..5)
                    .map(|j| {
                        store
                            .write(|tx| {
                                DecisionRepository::insert(
                                    tx,
                                    &NewDecision {
                                        topic: format!("topic {}-{}", i, j),
                                        text: "x".to_string(),
                                        ..Default::default()
                                    },
                                    Utc::now(),
                                )
                            })
                            .unwrap()
                            .id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids: Vec<i64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    ids.sort_unstable();

    assert_eq!(ids, (1..=30).collect::<Vec<_>>());
}

#[test]
fn test_decision_ids_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huddle.db");

    let first = {
        let store = Store::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();
        store
            .write(|tx| {
                DecisionRepository::insert(
                    tx,
                    &NewDecision {
                        topic: "a".to_string(),
                        text: "x".to_string(),
                        ..Default::default()
                    },
                    Utc::now(),
                )
            })
            .unwrap()
    };

    let store = Store::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();
    let second = store
        .write(|tx| {
            DecisionRepository::insert(
                tx,
                &NewDecision {
                    topic: "b".to_string(),
                    text: "y".to_string(),
                    ..Default::default()
                },
                Utc::now(),
            )
        })
        .unwrap();

    assert!(second.id > first.id);
}
