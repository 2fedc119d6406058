use proptest::prelude::*;
use sonaura_control::serial::{LineBuffer, MemoryLink, SerialLineProtocol};
use sonaura_control::{ControlError, DebugTelemetry, LineOutcome, MotorCommand};

#[test]
fn test_documented_frames() {
    let mut protocol = SerialLineProtocol::new(MemoryLink::new());

    protocol.on_line_received("DEBUG,120,45.5,1,30\n");
    let expected = DebugTelemetry {
        total_steps: 120,
        current_angle: 45.5,
        is_rotating: true,
        motor_speed: 30,
    };
    assert_eq!(*protocol.telemetry(), expected);

    protocol.on_line_received("DEBUG,1,2\n");
    assert_eq!(*protocol.telemetry(), expected);

    assert_eq!(protocol.on_line_received("HELLO\n"), LineOutcome::Ignored);
    assert_eq!(*protocol.telemetry(), expected);
}

#[test]
fn test_every_command_is_one_byte() {
    let link = MemoryLink::new();
    let mut protocol = SerialLineProtocol::new(link.clone());

    for command in MotorCommand::ALL {
        protocol.send_command(command).unwrap();
    }

    assert_eq!(link.written(), b"LRDF".to_vec());
    assert_eq!(protocol.stats().commands_sent, 4);
}

#[test]
fn test_link_drop_mid_session() {
    let link = MemoryLink::new();
    let mut protocol = SerialLineProtocol::new(link.clone());

    protocol.send_command(MotorCommand::RotateLeft).unwrap();
    link.set_open(false);
    assert!(matches!(
        protocol.send_command(MotorCommand::RotateRight),
        Err(ControlError::LinkUnavailable(_))
    ));
    link.set_open(true);
    protocol.send_command(MotorCommand::RotateRight).unwrap();

    assert_eq!(link.written(), b"LR".to_vec());
}

#[test]
fn test_chunked_stream_into_protocol() {
    let mut buffer = LineBuffer::new();
    let mut protocol = SerialLineProtocol::new(MemoryLink::new());

    let stream = b"boot ok\r\nDEBUG,10,1.5,0,12\r\nDEBUG,garbage\r\nDEBUG,11,3.0,1,12\r\n";
    for chunk in stream.chunks(7) {
        for line in buffer.push(chunk) {
            protocol.on_line_received(&line);
        }
    }

    let stats = protocol.stats();
    assert_eq!(stats.frames_parsed, 2);
    assert_eq!(stats.frames_discarded, 1);
    assert_eq!(stats.lines_ignored, 1);
    assert_eq!(protocol.telemetry().total_steps, 11);
    assert!(protocol.telemetry().is_rotating);
}

proptest! {
    #[test]
    fn prop_well_formed_frames_parse(
        steps in -100_000i64..100_000,
        angle in -720.0f32..720.0,
        rotating in any::<bool>(),
        speed in 0i64..500,
    ) {
        let mut protocol = SerialLineProtocol::new(MemoryLink::new());
        let line = format!("DEBUG,{},{},{},{}\n", steps, angle, u8::from(rotating), speed);

        prop_assert_eq!(protocol.on_line_received(&line), LineOutcome::TelemetryUpdated);
        let telemetry = *protocol.telemetry();
        prop_assert_eq!(telemetry.total_steps, steps);
        prop_assert_eq!(telemetry.current_angle, angle);
        prop_assert_eq!(telemetry.is_rotating, rotating);
        prop_assert_eq!(telemetry.motor_speed, speed);
    }

    #[test]
    fn prop_garbage_never_changes_telemetry(line in "[A-CE-Za-z0-9,.][ -~]{0,40}") {
        let mut protocol = SerialLineProtocol::new(MemoryLink::new());
        protocol.on_line_received("DEBUG,5,5.0,1,5");
        let before = *protocol.telemetry();

        protocol.on_line_received(&line);
        prop_assert_eq!(*protocol.telemetry(), before);
    }
}
