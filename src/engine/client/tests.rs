use std::{
    cell::RefCell,
    rc::Rc,
    time::{Duration, Instant},
};

use serde_json::json;

use crate::engine::{
    client::{
        ClientSettings, ConnectionState, EngineClient, InboundMessage, PendingPolicy,
    },
    error::ClientError,
    link::{Outbound, memory::MemoryConnector},
    protocol::{EngineCommand, EngineResponse, Envelope, TRANSPORT_SCOPE},
};

fn client_with(settings: ClientSettings) -> (EngineClient, MemoryConnector) {
    let connector = MemoryConnector::new();
    (EngineClient::new(connector.clone(), settings), connector)
}

fn client() -> (EngineClient, MemoryConnector) {
    client_with(ClientSettings::default())
}

/// Client with an open link
fn connected() -> (EngineClient, MemoryConnector) {
    let (mut client, connector) = client();
    client.start();
    connector.last().open();
    client.poll(Instant::now());
    assert!(client.is_connected());
    (client, connector)
}

fn recorder(client: &mut EngineClient) -> Rc<RefCell<Vec<InboundMessage>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    // Subscription is dropped here, the handler stays registered
    let _ = client.on_message(move |message| sink.borrow_mut().push(message.clone()));
    seen
}

#[test]
fn test_default_settings() {
    let settings = ClientSettings::default();
    assert_eq!(settings.url, "ws://localhost:9001");
    assert_eq!(settings.reconnect_interval, Duration::from_millis(2000));
    assert_eq!(settings.command_timeout, Duration::from_millis(10000));
    assert_eq!(settings.pending_policy, PendingPolicy::KeepUntilTimeout);
}

#[test]
fn test_connect_is_idempotent() {
    let (mut client, connector) = client();
    let first = client.connect();
    let second = client.connect();
    assert_eq!(connector.attempts(), 1);
    assert_eq!(connector.urls(), vec!["ws://localhost:9001".to_string()]);
    assert_eq!(client.state(), ConnectionState::Connecting);
    assert!(first.try_take().is_none());

    connector.last().open();
    client.poll(Instant::now());
    assert_eq!(first.try_take(), Some(Ok(())));
    assert_eq!(second.try_take(), Some(Ok(())));
}

#[test]
fn test_connect_when_connected_resolves_immediately() {
    let (mut client, connector) = connected();
    let ticket = client.connect();
    assert_eq!(ticket.try_take(), Some(Ok(())));
    assert_eq!(connector.attempts(), 1);
}

#[test]
fn test_failed_connect_schedules_reconnect() {
    let (mut client, connector) = client();
    let ticket = client.start();
    let now = Instant::now();
    connector.last().fail("connection refused");
    client.poll(now);

    assert_eq!(
        ticket.try_take(),
        Some(Err(ClientError::Connection("connection refused".into())))
    );
    assert_eq!(client.state(), ConnectionState::Disconnected);

    client.poll(now + Duration::from_millis(1999));
    assert_eq!(connector.attempts(), 1);
    client.poll(now + Duration::from_millis(2000));
    assert_eq!(connector.attempts(), 2);
    assert_eq!(client.state(), ConnectionState::Connecting);
}

#[test]
fn test_dropped_connection_reconnects() {
    let (mut client, connector) = connected();
    let now = Instant::now();
    connector.last().close();
    client.poll(now);
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert_eq!(client.reconnect_at(), Some(now + Duration::from_millis(2000)));

    client.poll(now + Duration::from_millis(2000));
    connector.last().open();
    client.poll(now + Duration::from_millis(2001));
    assert!(client.is_connected());
    assert_eq!(connector.attempts(), 2);
}

#[test]
fn test_response_resolves_matching_command() {
    let (mut client, connector) = connected();
    let ticket = client.set_tempo(140.);
    let end = connector.last();
    let sent = end.sent_commands();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].command, "transport.setTempo");
    assert_eq!(sent[0].payload, json!({ "tempo": 140.0 }));
    assert_eq!(sent[0].id, ticket.id());

    // Unrelated id leaves the ticket pending
    end.respond("someone-else", json!({}));
    client.poll(Instant::now());
    assert!(ticket.try_take().is_none());
    assert_eq!(client.pending_count(), 1);

    end.respond(ticket.id(), json!({ "tempo": 140 }));
    client.poll(Instant::now());
    let response = ticket.try_take().unwrap().unwrap();
    assert!(response.success);
    assert_eq!(response.data, Some(json!({ "tempo": 140 })));
    assert_eq!(client.pending_count(), 0);
}

#[test]
fn test_out_of_order_responses() {
    let (mut client, connector) = connected();
    let a = client.play();
    let b = client.set_playhead(8.);
    let end = connector.last();

    end.respond(b.id(), json!({ "playhead": 8 }));
    end.respond(a.id(), json!({ "isPlaying": true }));
    client.poll(Instant::now());

    assert_eq!(
        a.try_take().unwrap().unwrap().data,
        Some(json!({ "isPlaying": true }))
    );
    assert_eq!(
        b.try_take().unwrap().unwrap().data,
        Some(json!({ "playhead": 8 }))
    );
}

#[test]
fn test_rejected_command_resolves_with_response() {
    let (mut client, connector) = connected();
    let ticket = client.send_command(EngineCommand::DeleteTrack { index: 9 });
    connector
        .last()
        .push_envelope(&Envelope::Response(EngineResponse::failed(
            ticket.id(),
            "Invalid track index",
        )));
    client.poll(Instant::now());
    let response = ticket.try_take().unwrap().unwrap();
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("Invalid track index"));
}

#[test]
fn test_command_times_out() {
    let (mut client, connector) = connected();
    let sent_at = Instant::now();
    let ticket = client.stop();

    client.poll(sent_at + Duration::from_millis(9999));
    assert!(ticket.try_take().is_none());

    client.poll(Instant::now() + Duration::from_millis(10001));
    assert_eq!(
        ticket.try_take(),
        Some(Err(ClientError::Timeout {
            command: "transport.stop".into(),
            timeout_ms: 10000
        }))
    );
    assert_eq!(client.pending_count(), 0);

    // A late answer still reaches subscribers
    let seen = recorder(&mut client);
    connector.last().respond(ticket.id(), json!({}));
    client.poll(Instant::now());
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn test_malformed_frames_are_dropped() {
    let (mut client, connector) = connected();
    let seen = recorder(&mut client);
    let ticket = client.play();
    let end = connector.last();

    end.push("{not json");
    end.push(r#"{"kind":"gossip"}"#);
    end.respond(ticket.id(), json!({}));
    client.poll(Instant::now());

    assert!(client.is_connected());
    assert!(ticket.try_take().unwrap().is_ok());
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn test_subscribers_see_every_inbound_message() {
    let (mut client, connector) = connected();
    let seen = recorder(&mut client);
    let end = connector.last();

    end.push_state(TRANSPORT_SCOPE, json!({ "isPlaying": true }));
    end.push(r#"{"kind":"event","event":"error","message":"boom"}"#);
    end.respond("unmatched", json!({}));
    end.push(r#"{"kind":"command","id":"1","command":"transport.play"}"#);
    client.poll(Instant::now());

    let seen = seen.borrow();
    assert_eq!(seen.len(), 3);
    assert!(matches!(&seen[0], InboundMessage::State(update) if update.scope == "transport"));
    assert!(matches!(&seen[1], InboundMessage::Event(event) if event.message == "boom"));
    assert!(matches!(&seen[2], InboundMessage::Response(response) if response.id == "unmatched"));
}

#[test]
fn test_unsubscribe_stops_delivery() {
    let (mut client, connector) = connected();
    let count = Rc::new(RefCell::new(0));
    let counter = count.clone();
    let subscription = client.on_message(move |_| *counter.borrow_mut() += 1);
    let end = connector.last();

    end.push_state(TRANSPORT_SCOPE, json!({}));
    client.poll(Instant::now());
    assert_eq!(*count.borrow(), 1);

    subscription.unsubscribe();
    end.push_state(TRANSPORT_SCOPE, json!({}));
    client.poll(Instant::now());
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn test_commands_queue_until_connected() {
    let (mut client, connector) = client();
    let ticket = client.toggle_metronome();
    assert_eq!(connector.attempts(), 1);
    let end = connector.last();
    assert!(end.sent().is_empty());

    end.open();
    client.poll(Instant::now());
    let sent = end.sent_commands();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].command, "transport.toggleMetronome");

    end.respond(ticket.id(), json!({ "metronome": true }));
    client.poll(Instant::now());
    assert!(ticket.try_take().unwrap().is_ok());
}

#[test]
fn test_queued_commands_fail_with_connection() {
    let (mut client, connector) = client();
    let ticket = client.play();
    connector.last().fail("refused");
    client.poll(Instant::now());
    assert_eq!(
        ticket.try_take(),
        Some(Err(ClientError::Connection("refused".into())))
    );
}

#[test]
fn test_pending_kept_across_disconnect() {
    let (mut client, connector) = connected();
    let ticket = client.play();
    let now = Instant::now();
    connector.last().close();
    client.poll(now);
    assert!(ticket.try_take().is_none());
    assert_eq!(client.pending_count(), 1);

    // Answered on the next connection
    client.poll(now + Duration::from_millis(2000));
    let end = connector.last();
    end.open();
    end.respond(ticket.id(), json!({}));
    client.poll(now + Duration::from_millis(2001));
    assert!(ticket.try_take().unwrap().is_ok());
}

#[test]
fn test_pending_fail_on_disconnect() {
    let (mut client, connector) = client_with(ClientSettings {
        pending_policy: PendingPolicy::FailOnDisconnect,
        ..ClientSettings::default()
    });
    client.start();
    connector.last().open();
    client.poll(Instant::now());
    let ticket = client.play();

    connector.last().close();
    client.poll(Instant::now());
    assert_eq!(ticket.try_take(), Some(Err(ClientError::Disconnected)));
}

#[test]
fn test_shutdown_fails_everything_and_stops_reconnecting() {
    let (mut client, connector) = connected();
    let ticket = client.play();
    let end = connector.last();

    client.shutdown();
    assert_eq!(ticket.try_take(), Some(Err(ClientError::Shutdown)));
    assert!(end.sent().contains(&Outbound::Close));
    assert_eq!(client.state(), ConnectionState::Disconnected);

    client.poll(Instant::now() + Duration::from_secs(60));
    assert_eq!(connector.attempts(), 1);
    assert_eq!(client.play().try_take(), Some(Err(ClientError::Shutdown)));
    assert_eq!(client.connect().try_take(), Some(Err(ClientError::Shutdown)));
}

#[test]
fn test_convenience_payloads() {
    let (mut client, connector) = connected();
    client.set_loop(true, Some(4.), Some(12.));
    client.set_loop(false, None, None);
    client.set_playhead(16.);

    let sent = connector.last().sent_commands();
    let commands: Vec<_> = sent
        .iter()
        .map(|frame| EngineCommand::from_frame(frame).unwrap())
        .collect();
    assert_eq!(
        commands,
        vec![
            EngineCommand::SetLoop {
                enabled: true,
                start: Some(4.),
                end: Some(12.)
            },
            EngineCommand::SetLoop {
                enabled: false,
                start: None,
                end: None
            },
            EngineCommand::SetPlayhead { beat: 16. },
        ]
    );
    assert_eq!(sent[1].payload, json!({ "enabled": false }));
    // Ids are unique
    assert_ne!(sent[0].id, sent[1].id);
}
