//! Fake engine speaking the real WebSocket protocol on a loopback port.
#![allow(dead_code)]

use std::{
    io::ErrorKind,
    net::{TcpListener, TcpStream},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use arranger::{
    core::transport::{TransportPatch, TransportState},
    engine::{
        EngineClient,
        protocol::{CommandFrame, EngineCommand, EngineResponse, Envelope, StateUpdate},
    },
};
use crossbeam::channel::{Receiver, Sender, TryRecvError, unbounded};
use serde_json::Value;
use tungstenite::{Message, WebSocket};

const TICK: Duration = Duration::from_millis(5);

enum Control {
    Push(String),
    DropConnection,
    Shutdown,
}

pub struct FakeEngine {
    pub url: String,
    control: Sender<Control>,
    received: Receiver<CommandFrame>,
    connections: Arc<AtomicUsize>,
    handle: Option<JoinHandle<()>>,
}

impl FakeEngine {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        listener.set_nonblocking(true).expect("nonblocking listener");
        let url = format!("ws://{}", listener.local_addr().expect("local addr"));
        let (control_tx, control_rx) = unbounded();
        let (received_tx, received_rx) = unbounded();
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = connections.clone();
        let handle = thread::spawn(move || serve(listener, control_rx, received_tx, counter));
        Self {
            url,
            control: control_tx,
            received: received_rx,
            connections,
            handle: Some(handle),
        }
    }

    pub fn push_state(&self, scope: &str, data: Value) {
        let envelope = Envelope::State(StateUpdate {
            scope: scope.to_string(),
            data,
        });
        let _ = self
            .control
            .send(Control::Push(envelope.encode().expect("encodable")));
    }

    /// Drop the socket without a closing handshake
    pub fn drop_connection(&self) {
        let _ = self.control.send(Control::DropConnection);
    }

    /// Commands received since the last call
    pub fn received(&self) -> Vec<CommandFrame> {
        self.received.try_iter().collect()
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl Drop for FakeEngine {
    fn drop(&mut self) {
        let _ = self.control.send(Control::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn serve(
    listener: TcpListener,
    control: Receiver<Control>,
    received: Sender<CommandFrame>,
    connections: Arc<AtomicUsize>,
) {
    let mut transport = TransportState::default();
    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                connections.fetch_add(1, Ordering::SeqCst);
                let Some(socket) = handshake(stream) else {
                    continue;
                };
                if !session(socket, &control, &received, &mut transport) {
                    return;
                }
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => {
                if let Ok(Control::Shutdown) | Err(TryRecvError::Disconnected) = control.try_recv()
                {
                    return;
                }
                thread::sleep(TICK);
            }
            Err(_) => return,
        }
    }
}

fn handshake(stream: TcpStream) -> Option<WebSocket<TcpStream>> {
    stream.set_nonblocking(false).ok()?;
    let socket = tungstenite::accept(stream).ok()?;
    socket.get_ref().set_read_timeout(Some(TICK)).ok()?;
    Some(socket)
}

/// Serve one connection. Returns false once the engine must stop.
fn session(
    mut socket: WebSocket<TcpStream>,
    control: &Receiver<Control>,
    received: &Sender<CommandFrame>,
    transport: &mut TransportState,
) -> bool {
    loop {
        match control.try_recv() {
            Ok(Control::Push(text)) => {
                if socket.send(Message::Text(text)).is_err() {
                    return true;
                }
            }
            Ok(Control::DropConnection) => return true,
            Ok(Control::Shutdown) | Err(TryRecvError::Disconnected) => return false,
            Err(TryRecvError::Empty) => {}
        }

        match socket.read() {
            Ok(Message::Text(text)) => {
                let Ok(Envelope::Command(frame)) = Envelope::decode(&text) else {
                    continue;
                };
                let reply = answer(&frame, transport);
                let _ = received.send(frame);
                let encoded = Envelope::Response(reply).encode().expect("encodable");
                if socket.send(Message::Text(encoded)).is_err() {
                    return true;
                }
            }
            Ok(_) => {}
            Err(tungstenite::Error::Io(err))
                if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(_) => return true,
        }
    }
}

/// Apply a command the way the engine would and answer with the transport state
fn answer(frame: &CommandFrame, transport: &mut TransportState) -> EngineResponse {
    let command = match EngineCommand::from_frame(frame) {
        Ok(command) => command,
        Err(err) => return EngineResponse::failed(&frame.id, err.to_string()),
    };
    match command {
        EngineCommand::Play => transport.is_playing = true,
        EngineCommand::Stop => transport.is_playing = false,
        EngineCommand::SetTempo { tempo } => transport.tempo = tempo,
        EngineCommand::SetPlayhead { beat } => transport.playhead_beat = beat,
        EngineCommand::SetLoop {
            enabled,
            start,
            end,
        } => {
            transport.is_looping = enabled;
            transport.loop_start = start.unwrap_or(transport.loop_start);
            transport.loop_end = end.unwrap_or(transport.loop_end);
        }
        EngineCommand::ToggleMetronome => {
            transport.metronome_enabled = !transport.metronome_enabled
        }
        EngineCommand::DeleteTrack { index } if index > 8 => {
            return EngineResponse::failed(&frame.id, "Invalid track index");
        }
        _ => return EngineResponse::ok(&frame.id, Value::Object(Default::default())),
    }
    let data = serde_json::to_value(TransportPatch::from(&*transport)).expect("serializable");
    EngineResponse::ok(&frame.id, data)
}

/// Poll the client until `done` holds or `timeout` elapses
pub fn drive_until(
    client: &mut EngineClient,
    timeout: Duration,
    mut done: impl FnMut(&EngineClient) -> bool,
) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        client.poll(Instant::now());
        if done(client) {
            return true;
        }
        thread::sleep(TICK);
    }
    false
}
