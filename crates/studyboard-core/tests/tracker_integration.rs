//! Integration tests for the subject tracker.

use chrono::Duration;
use studyboard_core::storage::schema::parse_subjects;
use studyboard_core::time::fixed_clock;
use studyboard_core::view::{aggregate, filter_by_bucket};
use studyboard_core::{Bucket, Event, MemoryGateway, SubjectId, TimerState, Tracker, TrackerError};

fn tracker() -> Tracker {
    Tracker::new(fixed_clock())
}

fn add(tracker: &mut Tracker, name: &str) -> SubjectId {
    tracker.create(name).unwrap().id.clone()
}

#[test]
fn test_new_subjects_start_empty() {
    let mut tracker = tracker();
    for name in ["Math", "  Art  ", "Quantum Field Theory"] {
        let subject = tracker.create(name).unwrap();
        assert_eq!(subject.progress, 0);
        assert_eq!(subject.total_time, 0);
        assert_eq!(subject.notes, "");
        assert_eq!(subject.created_at, subject.last_modified);
    }
}

#[test]
fn test_math_and_art_board_scenario() {
    let mut tracker = tracker();
    let math = add(&mut tracker, "Math");
    let art = add(&mut tracker, "Art");
    tracker.set_progress(&math, 40).unwrap();
    tracker.set_progress(&art, 100).unwrap();

    let completed = filter_by_bucket(tracker.subjects(), Bucket::Completed);
    let names: Vec<&str> = completed.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Art"]);

    let dashboard = aggregate(tracker.subjects());
    assert_eq!(dashboard.count, 2);
    assert_eq!(dashboard.completed_count, 1);
    assert_eq!(dashboard.average_progress, 70);
}

#[test]
fn test_starting_second_timer_credits_the_first() {
    let mut tracker = tracker();
    let math = add(&mut tracker, "Math");
    let art = add(&mut tracker, "Art");

    tracker.start(&math).unwrap();
    tracker.clock_mut().advance(Duration::minutes(20) + Duration::seconds(40));
    tracker.start(&art).unwrap();

    assert!(!tracker.is_running(&math));
    assert!(tracker.is_running(&art));
    assert_eq!(tracker.find(&math).unwrap().total_time, 20);
    assert_eq!(tracker.find(&art).unwrap().total_time, 0);

    let events = tracker.drain_events();
    let stopped: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            Event::TimerStopped { id, credited_minutes, .. } => Some((id.clone(), *credited_minutes)),
            _ => None,
        })
        .collect();
    assert_eq!(stopped, vec![(math, 20)]);
}

#[test]
fn test_stop_truncates_to_whole_minutes() {
    let mut tracker = tracker();
    let id = add(&mut tracker, "Math");

    tracker.start(&id).unwrap();
    tracker.clock_mut().advance(Duration::seconds(90));
    let stopped = tracker.stop(&id).unwrap().unwrap();
    assert_eq!(stopped.minutes, 1);
    assert_eq!(tracker.find(&id).unwrap().total_time, 1);

    tracker.start(&id).unwrap();
    tracker.clock_mut().advance(Duration::seconds(59));
    tracker.stop(&id).unwrap();
    assert_eq!(tracker.find(&id).unwrap().total_time, 1);
}

#[test]
fn test_stop_updates_last_modified() {
    let mut tracker = tracker();
    let id = add(&mut tracker, "Math");
    tracker.start(&id).unwrap();
    tracker.clock_mut().advance(Duration::minutes(30));
    let now = tracker.clock().now();
    tracker.stop(&id).unwrap();
    assert_eq!(tracker.find(&id).unwrap().last_modified, now);
}

#[test]
fn test_delete_running_subject_credits_then_removes() {
    let mut tracker = tracker();
    let id = add(&mut tracker, "Math");
    tracker.start(&id).unwrap();
    tracker.clock_mut().advance(Duration::minutes(15));

    let removed = tracker.delete(&id).unwrap();
    assert_eq!(removed.total_time, 15);
    assert!(tracker.find(&id).is_none());
    assert!(tracker.running().is_none());
    assert_eq!(tracker.timer_state(&id), TimerState::Stopped);

    let events = tracker.drain_events();
    let kinds: Vec<&str> = events
        .iter()
        .map(|e| match e {
            Event::SubjectCreated { .. } => "created",
            Event::TimerStarted { .. } => "started",
            Event::TimerStopped { .. } => "stopped",
            Event::SubjectDeleted { .. } => "deleted",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["created", "started", "stopped", "deleted"]);

    assert!(matches!(tracker.delete(&id), Err(TrackerError::NotFound(_))));
}

#[test]
fn test_export_import_round_trip() {
    let mut tracker = tracker();
    let math = add(&mut tracker, "Math");
    let art = add(&mut tracker, "Art");
    tracker.set_progress(&math, 55).unwrap();
    tracker.set_notes(&art, "<i>colour</i> theory & \"value\"").unwrap();
    tracker.start(&math).unwrap();
    tracker.clock_mut().advance(Duration::minutes(42));
    tracker.stop(&math).unwrap();

    let exported = tracker.export().unwrap().to_json_pretty().unwrap();

    let mut restored = Tracker::new(fixed_clock());
    assert_eq!(restored.import_json(&exported).unwrap(), 2);
    for (before, after) in tracker.subjects().iter().zip(restored.subjects()) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.name, after.name);
        assert_eq!(before.progress, after.progress);
        assert_eq!(before.total_time, after.total_time);
        assert_eq!(before.notes, after.notes);
    }
}

#[test]
fn test_import_replaces_non_empty_store() {
    let mut source = tracker();
    add(&mut source, "Biology");
    let exported = source.export().unwrap().to_json_pretty().unwrap();

    let mut target = tracker();
    let old = add(&mut target, "Chemistry");
    let running = old.clone();
    target.start(&running).unwrap();

    assert_eq!(target.import_json(&exported).unwrap(), 1);
    assert!(target.find(&old).is_none());
    assert_eq!(target.subjects()[0].name, "Biology");
    assert!(target.running().is_none());
}

#[test]
fn test_import_accepts_foreign_ids() {
    let raw = r#"{
        "subjects": [{
            "id": "lq3k1x9a7bcd2ef",
            "name": "Spanish",
            "progress": 30,
            "totalTime": 95,
            "notes": "irregular verbs",
            "createdAt": "2024-03-01T10:00:00.000Z",
            "lastModified": "2024-03-04T18:30:00.000Z"
        }],
        "exportedAt": "2024-03-05T09:00:00.000Z",
        "version": "1.0"
    }"#;
    let subjects = parse_subjects(raw).unwrap();
    assert_eq!(subjects[0].id.as_str(), "lq3k1x9a7bcd2ef");

    let mut tracker = tracker();
    tracker.import_json(raw).unwrap();
    let id = SubjectId::from("lq3k1x9a7bcd2ef");
    assert_eq!(tracker.find(&id).unwrap().total_time, 95);
    tracker.increment_progress(&id, 10).unwrap();
    assert_eq!(tracker.find(&id).unwrap().progress, 40);
}

#[test]
fn test_persist_and_reload_through_gateway() {
    let gateway = MemoryGateway::new();
    let mut tracker = tracker();
    let id = add(&mut tracker, "Math");
    tracker.set_notes(&id, "limits").unwrap();
    tracker.start(&id).unwrap();
    tracker.save_to(&gateway).unwrap();

    let stored: serde_json::Value = serde_json::from_str(&gateway.contents().unwrap()).unwrap();
    assert_eq!(stored["version"], "1.0");
    assert!(stored["lastSaved"].is_string());
    assert_eq!(stored["subjects"].as_array().unwrap().len(), 1);

    // The running timer is process-only state.
    let reopened = Tracker::open(&gateway, fixed_clock());
    assert_eq!(reopened.find(&id).unwrap().notes, "limits");
    assert!(reopened.running().is_none());
}

#[test]
fn test_load_without_subjects_field_is_empty() {
    let gateway = MemoryGateway::with_payload(r#"{"version":"1.0","lastSaved":"2024-01-01T00:00:00Z"}"#);
    assert!(Tracker::open(&gateway, fixed_clock()).is_empty());
}
