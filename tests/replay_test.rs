mod test_tracks;

use std::sync::{Arc, Mutex};

use arview::config::ArConfig;
use arview::geo::{GeoCoordinate, parse_places};
use arview::overlay::{OverlaySession, OverlayStatus, SessionState};
use arview::sensor::{Recording, ReplaySource, SensorEvent, SensorKind, SensorStatus};
use arview::simulation::{SimulatedSource, TrackConfig, simulate_track};

use test_tracks::{Recorded, RecordingObserver, fix, origin, place_at, yaw};

fn replay_session(recording: &Recording) -> (OverlaySession, Arc<Mutex<Recorded>>) {
    let (observer, recorded) = RecordingObserver::new();
    let session = OverlaySession::new(
        ArConfig::default(),
        Box::new(recording.merged_source(0.0)),
        Box::new(ReplaySource::new("idle", Vec::new(), 0.0, 0.0)),
        observer,
    )
    .unwrap();
    (session, recorded)
}

#[test]
fn test_replay_runs_to_completion() {
    let from = origin();
    let mut events = vec![fix(from, 0.0)];
    events.extend((0..36).map(|i| yaw(i as f64 * 10.0, i as f64 * 0.1)));
    let recording = Recording::new(events);

    let (mut session, recorded) = replay_session(&recording);
    session.set_points_of_interest(vec![
        place_at("a", &from, 5.0, 500.0),
        place_at("b", &from, 185.0, 500.0),
    ]);
    session.start().unwrap();
    session.wait();
    assert_eq!(session.state(), SessionState::Stopped);

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.frames.len(), 36);
    // "a" from yaw 340 through 30, "b" from 160 through 210
    let a_frames = (0..36)
        .filter(|&i| recorded.visible_ids(i).contains(&"a".to_string()))
        .count();
    let b_frames = (0..36)
        .filter(|&i| recorded.visible_ids(i).contains(&"b".to_string()))
        .count();
    assert_eq!(a_frames, 6);
    assert_eq!(b_frames, 6);
}

#[test]
fn test_replay_from_json_lines() {
    let places = parse_places(
        r#"[
            {"id": "tower", "label": "Tower", "latitude": 0.01, "longitude": 0.0},
            {"id": "bad", "label": "Bad", "latitude": 95.0, "longitude": 0.0}
        ]"#,
    )
    .unwrap();
    assert_eq!(places.places.len(), 1);
    assert_eq!(places.rejected.len(), 1);

    let track = "\
# two fixes, heading north then east
{\"type\":\"location\",\"coordinate\":{\"latitude\":0.0,\"longitude\":0.0},\"accuracy_m\":5.0,\"timestamp_s\":0.0}
{\"type\":\"attitude\",\"yaw_degrees\":0.0,\"timestamp_s\":0.1}
{\"type\":\"attitude\",\"yaw_degrees\":90.0,\"timestamp_s\":0.2}
";
    let recording = Recording::parse(track).unwrap();
    let (mut session, recorded) = replay_session(&recording);
    session.set_points_of_interest(places.places);
    session.start().unwrap();
    session.wait();

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.frames.len(), 2);
    assert_eq!(recorded.visible_ids(0), vec!["tower"]);
    assert!(recorded.visible_ids(1).is_empty());
    assert_eq!(&*recorded.frames[0][0].label, "Tower");
}

#[test]
fn test_replayed_heading_denial() {
    let from = origin();
    let recording = Recording::new(vec![
        fix(from, 0.0),
        yaw(0.0, 0.1),
        SensorEvent::Status {
            sensor: SensorKind::Heading,
            status: SensorStatus::PermissionDenied,
        },
        yaw(0.0, 0.2),
    ]);
    let (mut session, recorded) = replay_session(&recording);
    session.set_points_of_interest(vec![place_at("p", &from, 0.0, 100.0)]);
    session.start().unwrap();
    session.wait();

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.frames.len(), 1);
    assert_eq!(
        recorded.statuses.last(),
        Some(&OverlayStatus::PermissionDenied(SensorKind::Heading))
    );
}

#[test]
fn test_location_denial_keeps_merged_replay_running() {
    let from = origin();
    let mut events = vec![
        fix(from, 0.0),
        SensorEvent::Status {
            sensor: SensorKind::Location,
            status: SensorStatus::PermissionDenied,
        },
    ];
    events.extend((0..500).map(|i| yaw(0.0, 0.1 + i as f64 * 0.02)));
    let recording = Recording::new(events);

    let (mut session, recorded) = replay_session(&recording);
    session.set_points_of_interest(vec![place_at("p", &from, 0.0, 100.0)]);
    session.start().unwrap();
    session.wait();

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.frames.len(), 500);
    assert!(recorded.frames.iter().all(|frame| frame.is_empty()));
    assert_eq!(
        recorded.statuses.last(),
        Some(&OverlayStatus::PermissionDenied(SensorKind::Location))
    );
}

#[test]
fn test_simulated_walk_sees_places() {
    let start = GeoCoordinate::new(37.7749, -122.4194);
    let track = TrackConfig {
        start,
        duration_s: 20.0,
        yaw_sweep_degrees: 180.0,
        ..TrackConfig::default()
    }
    .with_seed(42);

    let (location, motion) = SimulatedSource::pair(&track, 0.0).unwrap();
    let (observer, recorded) = RecordingObserver::new();
    let mut session =
        OverlaySession::new(ArConfig::default(), Box::new(location), Box::new(motion), observer)
            .unwrap();
    session.set_points_of_interest(vec![
        place_at("ahead", &start, 0.0, 2000.0),
        place_at("right", &start, 90.0, 2000.0),
        place_at("left", &start, 270.0, 2000.0),
    ]);
    session.start().unwrap();
    session.wait();

    let recorded = recorded.lock().unwrap();
    assert!(!recorded.frames.is_empty());
    for id in ["ahead", "right", "left"] {
        assert!(
            (0..recorded.frames.len()).any(|i| recorded.visible_ids(i).contains(&id.to_string())),
            "{} never visible",
            id
        );
    }
}

#[test]
fn test_simulated_track_survives_json_lines() {
    let track = TrackConfig {
        duration_s: 2.0,
        ..TrackConfig::default()
    }
    .with_seed(3);
    let recording = simulate_track(&track).unwrap();
    let reloaded = Recording::parse(&recording.to_json_lines().unwrap()).unwrap();
    assert_eq!(reloaded.len(), recording.len());
    assert_eq!(reloaded.start_time(), Some(0.0));
}
