use serde_json::{Value, json};

use crate::{
    core::track::TrackType,
    engine::{
        error::ProtocolError,
        protocol::{CommandFrame, EngineCommand, EngineResponse, Envelope},
    },
};

fn to_json(envelope: &Envelope) -> Value {
    serde_json::from_str(&envelope.encode().unwrap()).unwrap()
}

#[test]
fn test_encode_command_frame() {
    let frame = EngineCommand::SetTempo { tempo: 140. }
        .to_frame("abc")
        .unwrap();
    assert_eq!(
        to_json(&Envelope::Command(frame)),
        json!({
            "kind": "command",
            "id": "abc",
            "command": "transport.setTempo",
            "payload": { "tempo": 140.0 }
        })
    );
}

#[test]
fn test_commands_without_arguments_send_empty_payload() {
    for command in [
        EngineCommand::Play,
        EngineCommand::Stop,
        EngineCommand::ToggleMetronome,
    ] {
        assert_eq!(command.payload().unwrap(), json!({}));
    }
}

#[test]
fn test_loop_payload_omits_missing_bounds() {
    let open = EngineCommand::SetLoop {
        enabled: false,
        start: None,
        end: None,
    };
    assert_eq!(open.payload().unwrap(), json!({ "enabled": false }));

    let bounded = EngineCommand::SetLoop {
        enabled: true,
        start: Some(4.),
        end: Some(12.),
    };
    assert_eq!(
        bounded.payload().unwrap(),
        json!({ "enabled": true, "start": 4.0, "end": 12.0 })
    );
}

#[test]
fn test_track_and_mixer_payloads() {
    let create = EngineCommand::CreateTrack {
        kind: TrackType::Audio,
        name: "Vox".into(),
    };
    assert_eq!(create.name(), "track.create");
    assert_eq!(
        create.payload().unwrap(),
        json!({ "type": "audio", "name": "Vox" })
    );
    assert_eq!(
        EngineCommand::SetVolume {
            track_index: 2,
            volume: 0.5
        }
        .payload()
        .unwrap(),
        json!({ "trackIndex": 2, "volume": 0.5 })
    );
    assert_eq!(
        EngineCommand::ToggleSolo { track_index: 1 }.payload().unwrap(),
        json!({ "trackIndex": 1 })
    );
    assert_eq!(
        EngineCommand::DeleteTrack { index: 3 }.payload().unwrap(),
        json!({ "index": 3 })
    );
}

#[test]
fn test_from_frame_inverts_to_frame() {
    let commands = vec![
        EngineCommand::Play,
        EngineCommand::SetPlayhead { beat: 12.5 },
        EngineCommand::SetLoop {
            enabled: true,
            start: Some(0.),
            end: Some(8.),
        },
        EngineCommand::RenameTrack {
            index: 1,
            name: "Bass".into(),
        },
        EngineCommand::SetPan {
            track_index: 0,
            pan: -0.5,
        },
        EngineCommand::ToggleMute { track_index: 4 },
    ];
    for command in commands {
        let frame = command.to_frame("id").unwrap();
        assert_eq!(EngineCommand::from_frame(&frame).unwrap(), command);
    }
}

#[test]
fn test_from_frame_rejects_unknown_and_invalid() {
    let unknown = CommandFrame {
        id: "1".into(),
        command: "project.explode".into(),
        payload: json!({}),
    };
    assert!(matches!(
        EngineCommand::from_frame(&unknown),
        Err(ProtocolError::UnknownCommand(name)) if name == "project.explode"
    ));

    let invalid = CommandFrame {
        id: "2".into(),
        command: "transport.setTempo".into(),
        payload: json!({ "tempo": "fast" }),
    };
    assert!(matches!(
        EngineCommand::from_frame(&invalid),
        Err(ProtocolError::InvalidPayload { .. })
    ));
}

#[test]
fn test_decode_response() {
    let envelope = Envelope::decode(
        r#"{"kind":"response","id":"x1","success":true,"data":{"tempo":140}}"#,
    )
    .unwrap();
    assert_eq!(
        envelope,
        Envelope::Response(EngineResponse::ok("x1", json!({ "tempo": 140 })))
    );

    let failed = Envelope::decode(
        r#"{"kind":"response","id":"x2","success":false,"error":"Unknown command: nope"}"#,
    )
    .unwrap();
    assert_eq!(
        failed,
        Envelope::Response(EngineResponse::failed("x2", "Unknown command: nope"))
    );
}

#[test]
fn test_decode_state_and_event() {
    let Envelope::State(state) =
        Envelope::decode(r#"{"kind":"state","scope":"transport","data":{"isPlaying":true}}"#)
            .unwrap()
    else {
        panic!("expected a state update");
    };
    assert_eq!(state.scope, "transport");
    assert_eq!(state.data, json!({ "isPlaying": true }));

    let Envelope::Event(event) =
        Envelope::decode(r#"{"kind":"event","event":"error","message":"boom"}"#).unwrap()
    else {
        panic!("expected an event");
    };
    assert_eq!(event.event, "error");
    assert_eq!(event.message, "boom");
    assert_eq!(event.data, Value::Null);
}

#[test]
fn test_decode_malformed() {
    assert!(matches!(
        Envelope::decode("{not json"),
        Err(ProtocolError::Malformed(_))
    ));
    assert!(Envelope::decode(r#"{"kind":"gossip"}"#).is_err());
    assert!(Envelope::decode(r#"{"kind":"response","success":true}"#).is_err());
}
