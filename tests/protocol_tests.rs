use bathsim::protocol::*;
use bathsim::{ControlError, PipeKind, UserProfile};

#[test]
fn test_command_envelope_round_trip() {
    let command = Command {
        id: 42,
        timestamp: 1000,
        command_type: CommandType::PrepareBath {
            weight_kg: Some(70.0),
            temperature_c: None,
        },
    };
    let json = serde_json::to_string(&command).unwrap();
    let parsed = parse_command(&json).unwrap();
    assert_eq!(parsed.id, 42);
    assert!(matches!(
        parsed.command_type,
        CommandType::PrepareBath {
            weight_kg: Some(w),
            temperature_c: None,
        } if w == 70.0
    ));
}

#[test]
fn test_profile_commands_carry_full_profiles() {
    let command = Command {
        id: 7,
        timestamp: 500,
        command_type: CommandType::AddProfile {
            name: "ana".to_string(),
            profile: UserProfile {
                weight_kg: 70.0,
                bath_temperature_c: 38.0,
                shower_temperature_c: 40.0,
            },
        },
    };
    let json = serde_json::to_string(&command).unwrap();
    let parsed = parse_command(&json).unwrap();
    match parsed.command_type {
        CommandType::AddProfile { name, profile } => {
            assert_eq!(name, "ana");
            assert_eq!(profile.weight_kg, 70.0);
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_rejected_response_exposes_error_kind() {
    let err = ControlError::NoSalt;
    let response = CommandResponse::rejected(42, &err);
    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"NoSalt\""));
    assert!(json.contains("\"Rejected\""));

    // Success responses omit the kind field entirely.
    let response = CommandResponse::success(42, None);
    let json = serde_json::to_string(&response).unwrap();
    assert!(!json.contains("\"kind\""));
    assert!(!json.contains("\"message\""));
}

#[test]
fn test_oversized_and_invalid_command_lines() {
    assert_eq!(
        parse_command("not json at all").unwrap_err(),
        FrameError::InvalidJson
    );

    let huge = format!(
        "{{\"id\":1,\"timestamp\":1,\"command_type\":\"Ping\",\"pad\":\"{}\"}}",
        "x".repeat(MAX_COMMAND_SIZE)
    );
    assert_eq!(parse_command(&huge).unwrap_err(), FrameError::LineTooLong);
}

#[test]
fn test_sensor_frame_acceptance_table() {
    assert_eq!(
        SensorFrame::parse("temperature/36.5").unwrap(),
        SensorFrame::DefaultTemperature(36.5)
    );
    assert_eq!(
        SensorFrame::parse("salt/0.75").unwrap(),
        SensorFrame::SaltLevel(0.75)
    );
    assert_eq!(SensorFrame::parse("command/stop").unwrap(), SensorFrame::Stop);
    assert_eq!(
        SensorFrame::parse("display/setPipe/bath/on/0.2/38").unwrap(),
        SensorFrame::SetPipe {
            pipe: PipeKind::Bath,
            on: true,
            debit_lps: Some(0.2),
            temperature_c: Some(38.0),
        }
    );

    // Rejections: wrong field counts, out-of-range salt, unknown topics,
    // trailing arguments on an off frame.
    assert!(SensorFrame::parse("waterQuality/7.0,300").is_err());
    assert!(SensorFrame::parse("salt/1.5").is_err());
    assert!(SensorFrame::parse("display/setPipe/bath/off/0.2").is_err());
    assert!(SensorFrame::parse("display/openValve/bath").is_err());
    assert!(matches!(
        SensorFrame::parse("pressure/3.2"),
        Err(FrameError::UnknownTopic(_))
    ));
    assert_eq!(SensorFrame::parse(""), Err(FrameError::Empty));
}

#[test]
fn test_notification_rendering() {
    assert_eq!(
        Notification::PipeOpened {
            pipe: PipeKind::Shower,
            debit_lps: 0.2,
            temperature_c: 40.0,
        }
        .render()
        .as_str(),
        "pipe/shower/on/0.2/40"
    );
    assert_eq!(
        Notification::PipeClosed {
            pipe: PipeKind::Bath
        }
        .render()
        .as_str(),
        "pipe/bath/off"
    );
    assert_eq!(
        Notification::CurrentVolume(123.45).render().as_str(),
        "currentVolume/123.45"
    );
    assert_eq!(Notification::TargetReached.render().as_str(), "targetReached");
}
