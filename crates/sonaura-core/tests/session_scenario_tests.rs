use rand::rngs::StdRng;
use rand::SeedableRng;
use sonaura_control::{MemoryLink, MotorCommand};
use sonaura_core::{
    AudioMode, FilterSink, PresenceEvent, Session, SessionConfig, SessionEvent, Track,
    VirtualFilters, VirtualTrack,
};
use std::time::Duration;

const DT: Duration = Duration::from_millis(16);

type TestSession = Session<VirtualTrack, VirtualFilters, MemoryLink>;

fn three_track_session(link: MemoryLink) -> TestSession {
    let tracks = ["taloki", "tetakere", "tuki"]
        .into_iter()
        .map(VirtualTrack::new)
        .collect();
    Session::new(
        &SessionConfig::default(),
        tracks,
        VirtualFilters::new(),
        link,
        StdRng::seed_from_u64(42),
    )
    .unwrap()
}

#[test]
fn test_presence_scenario_with_clap() {
    let link = MemoryLink::new();
    let mut session = three_track_session(link.clone());
    let events = session.event_sender();

    let mut presence = Vec::new();
    let mut transitions = Vec::new();

    for (i, count) in [0u32, 0, 1, 1, 0].into_iter().enumerate() {
        if i == 3 {
            // Clap between samples 2 and 3
            let report = session.tick(0.8, DT);
            assert_eq!(report.rotated_to, Some(1));
            assert!(report.presence_events.is_empty());
        }
        events.send(SessionEvent::Presence(count)).unwrap();
        let report = session.tick(0.0, DT);
        presence.extend(report.presence_events);
        transitions.extend(report.transitions);
    }

    assert_eq!(
        presence,
        vec![
            PresenceEvent::None,
            PresenceEvent::None,
            PresenceEvent::Appeared,
            PresenceEvent::None,
            PresenceEvent::Disappeared,
        ]
    );
    assert_eq!(transitions.len(), 2);
    assert_eq!(transitions[0].to, AudioMode::Full);
    assert_eq!(transitions[1].to, AudioMode::BassOnly);
    assert_eq!(session.mode(), AudioMode::BassOnly);

    // The rotated track followed the mode back to the bass sink
    assert_eq!(session.tracks().current_index(), 1);
    assert_eq!(session.tracks().current().route(), Some(FilterSink::Bass));
    assert_eq!(session.tracks().playing_count(), 1);

    assert_eq!(link.written(), b"F".to_vec());
}

#[test]
fn test_startup_sequence_on_link() {
    let link = MemoryLink::new();
    let mut session = three_track_session(link.clone());
    let events = session.event_sender();

    let mut elapsed = Duration::ZERO;
    while elapsed < Duration::from_millis(1100) {
        session.tick(0.0, DT);
        elapsed += DT;
    }
    assert_eq!(link.written(), b"D".to_vec());

    events.send(SessionEvent::Presence(2)).unwrap();
    events
        .send(SessionEvent::Command(MotorCommand::RotateLeft))
        .unwrap();
    events
        .send(SessionEvent::Command(MotorCommand::RotateRight))
        .unwrap();
    let report = session.tick(0.0, DT);

    assert_eq!(
        report.commands_sent,
        vec![
            MotorCommand::FaceDetected,
            MotorCommand::RotateLeft,
            MotorCommand::RotateRight
        ]
    );
    assert_eq!(link.written(), b"DFLR".to_vec());
}

#[test]
fn test_link_lost_mid_session_keeps_running() {
    let link = MemoryLink::new();
    let mut session = three_track_session(link.clone());
    session.tick(0.0, DT);

    link.set_open(false);
    session
        .event_sender()
        .send(SessionEvent::Presence(1))
        .unwrap();
    let report = session.tick(0.0, DT);

    assert_eq!(session.mode(), AudioMode::Full);
    assert_eq!(report.commands_failed, vec![MotorCommand::FaceDetected]);
    assert!(session.tracks().current().is_playing());
    assert!(!session.is_link_open());
}

#[test]
fn test_volume_ramps_toward_full() {
    let mut session = three_track_session(MemoryLink::new());
    let mut last = 0.0;
    for _ in 0..300 {
        let report = session.tick(0.0, DT);
        assert!(report.volume >= last);
        last = report.volume;
    }
    assert!(last > 0.99);
    assert!(session.tracks().iter().all(|t| (t.gain() - last).abs() < 1e-6));
}
